//! In-progress drawing on the map.
//!
//! Point mode emits a feature per click. Line and polygon modes collect
//! vertices until [`Sketch::finish`] is called (a double click on the map).

use geoedit_geometry::{close_ring, Geometry, Position};

use crate::{next_feature_id, Feature};

/// Minimum vertices for a line
pub const MIN_LINE_VERTICES: usize = 2;

/// Minimum vertices for a polygon (before closing)
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Active drawing tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawMode {
    #[default]
    None,
    Point,
    Line,
    Polygon,
}

impl DrawMode {
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::None => "none",
            DrawMode::Point => "point",
            DrawMode::Line => "line",
            DrawMode::Polygon => "polygon",
        }
    }
}

/// Vertices collected for the current drawing tool
#[derive(Debug, Clone, Default)]
pub struct Sketch {
    mode: DrawMode,
    vertices: Vec<Position>,
}

impl Sketch {
    pub fn new(mode: DrawMode) -> Self {
        Self {
            mode,
            vertices: Vec::new(),
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Switch tools, discarding any pending vertices
    pub fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    /// Handle a map click. Returns a finished feature in point mode.
    pub fn click(&mut self, pos: Position) -> Option<Feature> {
        match self.mode {
            DrawMode::None => None,
            DrawMode::Point => Some(drawn(Geometry::Point(pos))),
            DrawMode::Line | DrawMode::Polygon => {
                self.vertices.push(pos);
                None
            }
        }
    }

    /// Complete a line or polygon. Too few vertices leaves the sketch as is.
    pub fn finish(&mut self) -> Option<Feature> {
        let geometry = match self.mode {
            DrawMode::Line if self.vertices.len() >= MIN_LINE_VERTICES => {
                Geometry::LineString(std::mem::take(&mut self.vertices))
            }
            DrawMode::Polygon if self.vertices.len() >= MIN_POLYGON_VERTICES => {
                Geometry::Polygon(vec![close_ring(std::mem::take(&mut self.vertices))])
            }
            _ => return None,
        };
        Some(drawn(geometry))
    }

    /// Drop pending vertices without producing a feature
    pub fn cancel(&mut self) {
        self.vertices.clear();
    }
}

fn drawn(geometry: Geometry) -> Feature {
    let mut feature = Feature::new(geometry);
    feature.id = Some(next_feature_id());
    feature
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoedit_geometry::GeometryType;

    #[test]
    fn test_point_mode_emits_immediately() {
        let mut sketch = Sketch::new(DrawMode::Point);
        let feature = sketch.click(Position::new(2.35, 48.85)).unwrap();
        assert_eq!(feature.geometry, Some(Geometry::Point(Position::new(2.35, 48.85))));
        assert!(feature.id.is_some());
        assert!(feature.properties.is_empty());
        assert!(sketch.vertices().is_empty());
    }

    #[test]
    fn test_none_mode_ignores_clicks() {
        let mut sketch = Sketch::default();
        assert!(sketch.click(Position::new(0.0, 0.0)).is_none());
        assert!(sketch.finish().is_none());
    }

    #[test]
    fn test_line_needs_two_vertices() {
        let mut sketch = Sketch::new(DrawMode::Line);
        sketch.click(Position::new(0.0, 0.0));
        assert!(sketch.finish().is_none());
        assert_eq!(sketch.vertices().len(), 1);

        sketch.click(Position::new(1.0, 1.0));
        let feature = sketch.finish().unwrap();
        assert_eq!(feature.geometry.unwrap().geometry_type(), GeometryType::LineString);
        assert!(sketch.vertices().is_empty());
    }

    #[test]
    fn test_polygon_is_closed() {
        let mut sketch = Sketch::new(DrawMode::Polygon);
        for (lon, lat) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)] {
            assert!(sketch.click(Position::new(lon, lat)).is_none());
        }
        let feature = sketch.finish().unwrap();
        match feature.geometry {
            Some(Geometry::Polygon(rings)) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 4);
                assert_eq!(rings[0].first(), rings[0].last());
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_mode_switch_discards_vertices() {
        let mut sketch = Sketch::new(DrawMode::Polygon);
        sketch.click(Position::new(0.0, 0.0));
        sketch.set_mode(DrawMode::Line);
        assert!(sketch.vertices().is_empty());
        assert_eq!(sketch.mode().name(), "line");
    }

    #[test]
    fn test_drawn_features_get_distinct_tokens() {
        let mut sketch = Sketch::new(DrawMode::Point);
        let a = sketch.click(Position::new(0.0, 0.0)).unwrap();
        let b = sketch.click(Position::new(0.0, 0.0)).unwrap();
        assert!(!a.same_identity(&b));
    }
}
