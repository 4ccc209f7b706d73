//! Read-only projections of the store for the table, property editor and
//! map views. Each takes the document plus the current selection and
//! produces plain data a renderer can draw without touching the store.

mod form;
mod map;
mod table;

pub use form::{add_property, delete_property, update_property, FormError};
pub use map::{map_view, LayerStyle, MapLayer, MapView};
pub use table::{table_view, TableRow, TableView};

use geoedit_core::Feature;

/// Selection highlight is decided by identity token
fn is_selected(feature: &Feature, selection: Option<&Feature>) -> bool {
    selection.is_some_and(|s| s.same_identity(feature))
}
