//! Core document model for geoedit.
//!
//! A [`FeatureCollection`] is THE document every view edits. This crate
//! holds the typed model plus the pure functions that move it in and out
//! of JSON text; state and persistence live in `geoedit-session`.

mod feature;
mod ids;
mod model;
mod sketch;

pub use feature::{Feature, FeatureCollection, FeatureId, Properties, PropertyValue};
pub use ids::next_feature_id;
pub use model::{create_empty, serialize, validate, ValidationError};
pub use sketch::{DrawMode, Sketch};

pub use geoedit_geometry::{Bounds, Geometry, GeometryType, Position};
