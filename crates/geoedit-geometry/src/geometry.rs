use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Bounds, Position};

/// GeoJSON geometry, serialized as `{"type": ..., "coordinates": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    /// Rings, outer first. Each ring should repeat its first vertex at the end.
    Polygon(Vec<Vec<Position>>),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

/// Geometry discriminant without coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryType {
    pub fn name(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// The position used when the geometry must collapse to a single row
    /// (tabular export). Point uses its coordinate, LineString its first
    /// vertex, Polygon the first vertex of its outer ring. Multi-geometries
    /// have no representative and yield `None`.
    pub fn representative_position(&self) -> Option<Position> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::LineString(line) => line.first().copied(),
            Geometry::Polygon(rings) => rings.first().and_then(|ring| ring.first()).copied(),
            _ => None,
        }
    }

    /// Visit every position in the geometry
    pub fn for_each_position(&self, mut f: impl FnMut(&Position)) {
        match self {
            Geometry::Point(p) => f(p),
            Geometry::LineString(line) | Geometry::MultiPoint(line) => line.iter().for_each(f),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().flatten().for_each(f)
            }
            Geometry::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(f),
        }
    }

    /// Whether every position can be written as JSON numbers
    pub fn is_finite(&self) -> bool {
        let mut finite = true;
        self.for_each_position(|p| finite &= p.is_finite());
        finite
    }

    /// Bounding box of all positions, `None` when there are no positions
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        self.for_each_position(|p| match bounds.as_mut() {
            Some(b) => b.extend(p),
            None => bounds = Some(Bounds::from_position(p)),
        });
        bounds
    }
}

/// Close a ring by repeating its first vertex when the last one differs.
pub fn close_ring(mut ring: Vec<Position>) -> Vec<Position> {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last()) {
        if first != *last {
            ring.push(first);
        }
    }
    ring
}
