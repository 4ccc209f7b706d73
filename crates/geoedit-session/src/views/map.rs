use geoedit_core::{Bounds, Feature, FeatureCollection, FeatureId, GeometryType};

use super::is_selected;

pub const FEATURE_DEFAULT_COLOR: &str = "#3b82f6";
pub const FEATURE_SELECTED_COLOR: &str = "#ef4444";
pub const POLYGON_FILL_OPACITY: f64 = 0.2;

/// Stroke/fill parameters for one map layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub color: &'static str,
    pub point_radius: u32,
    pub line_weight: u32,
    pub fill_opacity: f64,
}

impl LayerStyle {
    pub fn for_selection(selected: bool, geometry_type: Option<GeometryType>) -> Self {
        let fill_opacity = match geometry_type {
            Some(GeometryType::Polygon | GeometryType::MultiPolygon) => POLYGON_FILL_OPACITY,
            Some(GeometryType::Point | GeometryType::MultiPoint) => 1.0,
            _ => 0.0,
        };
        if selected {
            Self {
                color: FEATURE_SELECTED_COLOR,
                point_radius: 8,
                line_weight: 3,
                fill_opacity,
            }
        } else {
            Self {
                color: FEATURE_DEFAULT_COLOR,
                point_radius: 6,
                line_weight: 2,
                fill_opacity,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub id: Option<FeatureId>,
    pub geometry_type: Option<GeometryType>,
    pub style: LayerStyle,
    pub is_selected: bool,
}

/// Layers in draw order (later layers on top) plus the extent to fit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapView {
    pub layers: Vec<MapLayer>,
    pub bounds: Option<Bounds>,
}

pub fn map_view(doc: &FeatureCollection, selection: Option<&Feature>) -> MapView {
    let layers = doc
        .features
        .iter()
        .map(|feature| {
            let selected = is_selected(feature, selection);
            let geometry_type = feature.geometry.as_ref().map(|g| g.geometry_type());
            MapLayer {
                id: feature.id.clone(),
                geometry_type,
                style: LayerStyle::for_selection(selected, geometry_type),
                is_selected: selected,
            }
        })
        .collect();
    MapView {
        layers,
        bounds: doc.bounds(),
    }
}
