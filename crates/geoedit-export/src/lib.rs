//! Import/export formats for geoedit.
//!
//! GeoJSON goes through the core model functions; CSV is a flat point
//! table with no quoting support (a comma inside a value shifts columns).

mod csv;
mod format;

pub use csv::{csv_to_geojson, geojson_to_csv};
pub use format::{export, write_export, Export, ExportFormat, ImportFormat};
