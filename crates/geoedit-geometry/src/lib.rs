//! Geometry primitives for geoedit.
//!
//! Positions are WGS84 `[lon, lat]` pairs. No reprojection or topology
//! checks happen here: a ring that is not closed or a line with a single
//! vertex is still a valid value of the model.

mod bounds;
mod geometry;
mod position;

pub use bounds::Bounds;
pub use geometry::{close_ring, Geometry, GeometryType};
pub use position::Position;
