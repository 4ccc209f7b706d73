use std::sync::LazyLock;

use geoedit_core::{create_empty, next_feature_id, Feature, FeatureCollection, Geometry, Position, Properties};
use regex::{Regex, RegexBuilder};

static LAT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new("lat")
        .case_insensitive(true)
        .build()
        .expect("static pattern")
});

static LON_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new("lon|lng")
        .case_insensitive(true)
        .build()
        .expect("static pattern")
});

/// Leading decimal number of a cell, trailing text ignored
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("static pattern")
});

/// Parse a coordinate cell from its leading number, so `40.7N` reads as
/// 40.7. Cells that do not start with a number are rejected.
fn parse_coordinate(cell: Option<&&str>) -> Option<f64> {
    let m = LEADING_NUMBER.find(cell?)?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert CSV text into a collection of Point features.
///
/// The first line is the header. The first header containing `lat` and the
/// first containing `lon`/`lng` (any case) hold the coordinates; without
/// both, the result is empty. Rows whose coordinates do not parse are
/// skipped. Every other column becomes a string property.
pub fn csv_to_geojson(csv: &str) -> FeatureCollection {
    let lines: Vec<&str> = csv.trim().split('\n').collect();
    if lines.len() < 2 {
        return create_empty();
    }

    let headers: Vec<&str> = lines[0].split(',').map(str::trim).collect();
    let lat_index = headers.iter().position(|h| LAT_HEADER.is_match(h));
    let lon_index = headers.iter().position(|h| LON_HEADER.is_match(h));
    let (Some(lat_index), Some(lon_index)) = (lat_index, lon_index) else {
        return create_empty();
    };

    let mut doc = create_empty();
    for line in &lines[1..] {
        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        let (Some(lat), Some(lon)) = (
            parse_coordinate(values.get(lat_index)),
            parse_coordinate(values.get(lon_index)),
        ) else {
            continue;
        };

        let mut properties = Properties::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == lat_index || idx == lon_index {
                continue;
            }
            // Short rows simply lack the trailing properties
            if let Some(value) = values.get(idx) {
                properties.insert(*header, *value);
            }
        }

        let mut feature = Feature::new(Geometry::Point(Position::new(lon, lat))).with_properties(properties);
        feature.id = Some(next_feature_id());
        doc.features.push(feature);
    }
    doc
}

/// Flatten a collection into CSV.
///
/// Columns are `lat,lon` followed by every property key in first-seen
/// order. Each feature contributes its representative position (point,
/// first line vertex, first outer-ring vertex); multi-geometries and
/// unlocated features are written at `0,0`.
pub fn geojson_to_csv(doc: &FeatureCollection) -> String {
    if doc.is_empty() {
        return "lat,lon".to_string();
    }

    let keys = doc.property_keys();
    let mut header = vec!["lat".to_string(), "lon".to_string()];
    header.extend(keys.iter().cloned());

    let mut rows = vec![header.join(",")];
    for feature in &doc.features {
        let pos = feature
            .geometry
            .as_ref()
            .and_then(Geometry::representative_position)
            .unwrap_or(Position::new(0.0, 0.0));

        let mut row = vec![pos.lat.to_string(), pos.lon.to_string()];
        row.extend(
            keys.iter()
                .map(|key| feature.properties.get(key).map(ToString::to_string).unwrap_or_default()),
        );
        rows.push(row.join(","));
    }
    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoedit_core::PropertyValue;

    #[test]
    fn test_csv_import_skips_bad_rows() {
        let doc = csv_to_geojson("name,lat,lon\nNYC,40.7128,-74.006\nBad,notanumber,-74\n");
        assert_eq!(doc.len(), 1);
        let feature = &doc.features[0];
        assert_eq!(feature.geometry, Some(Geometry::Point(Position::new(-74.006, 40.7128))));
        assert_eq!(feature.properties.get("name"), Some(&PropertyValue::from("NYC")));
        assert_eq!(feature.properties.len(), 1);
        assert!(feature.id.is_some());
    }

    #[test]
    fn test_csv_import_header_matching_is_case_insensitive() {
        let doc = csv_to_geojson("Latitude,LNG,label\r\n1.5,2.5,a\r\n");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.features[0].geometry, Some(Geometry::Point(Position::new(2.5, 1.5))));
        assert_eq!(doc.features[0].properties.get("label"), Some(&PropertyValue::from("a")));
    }

    #[test]
    fn test_csv_import_without_coordinate_columns_is_empty() {
        assert!(csv_to_geojson("name,x,y\na,1,2").is_empty());
        assert!(csv_to_geojson("name,lat\na,1").is_empty());
    }

    #[test]
    fn test_csv_import_header_only_is_empty() {
        assert!(csv_to_geojson("lat,lon\n").is_empty());
        assert!(csv_to_geojson("").is_empty());
    }

    #[test]
    fn test_csv_import_rejects_non_finite() {
        let doc = csv_to_geojson("lat,lon\nNaN,1\ninf,2\n3,4");
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_csv_import_reads_leading_number() {
        let doc = csv_to_geojson("name,lat,lon\nA,40.7N,-74.0W\nB,.5,+1.\nC,1e,2e-1x\nD,N40,1");
        let points: Vec<_> = doc.features.iter().map(|f| f.geometry.clone()).collect();
        assert_eq!(
            points,
            vec![
                Some(Geometry::Point(Position::new(-74.0, 40.7))),
                Some(Geometry::Point(Position::new(1.0, 0.5))),
                Some(Geometry::Point(Position::new(0.2, 1.0))),
            ]
        );
    }

    #[test]
    fn test_csv_export_keeps_falsy_values() {
        let feature = Feature::new(Geometry::Point(Position::new(1.0, 2.0))).with_properties(
            [("zero", PropertyValue::from(0i64)), ("flag", PropertyValue::from(false)), ("none", PropertyValue::Null)]
                .into_iter()
                .collect(),
        );
        let csv = geojson_to_csv(&FeatureCollection::new(vec![feature]));
        assert_eq!(csv, "lat,lon,zero,flag,none\n2,1,0,false,");
    }

    #[test]
    fn test_csv_import_short_row_omits_missing_columns() {
        let doc = csv_to_geojson("lat,lon,a,b\n1,2,x");
        let props = &doc.features[0].properties;
        assert_eq!(props.get("a"), Some(&PropertyValue::from("x")));
        assert!(!props.contains_key("b"));
    }

    #[test]
    fn test_csv_export_point() {
        let feature = Feature::new(Geometry::Point(Position::new(-122.4194, 37.7749)))
            .with_properties([("city", "SF")].into_iter().collect());
        let csv = geojson_to_csv(&FeatureCollection::new(vec![feature]));
        assert_eq!(csv, "lat,lon,city\n37.7749,-122.4194,SF");
    }

    #[test]
    fn test_csv_export_empty() {
        assert_eq!(geojson_to_csv(&create_empty()), "lat,lon");
    }

    #[test]
    fn test_csv_export_uses_representative_positions() {
        let line = Feature::new(Geometry::LineString(vec![Position::new(1.0, 2.0), Position::new(3.0, 4.0)]))
            .with_properties([("kind", "road")].into_iter().collect());
        let poly = Feature::new(Geometry::Polygon(vec![vec![
            Position::new(5.0, 6.0),
            Position::new(7.0, 6.0),
            Position::new(5.0, 6.0),
        ]]))
        .with_properties([("area", 12i64)].into_iter().collect());
        let multi = Feature::new(Geometry::MultiPoint(vec![Position::new(9.0, 9.0)]));

        let csv = geojson_to_csv(&FeatureCollection::new(vec![line, poly, multi]));
        assert_eq!(csv, "lat,lon,kind,area\n2,1,road,\n6,5,,12\n0,0,,");
    }

    #[test]
    fn test_csv_round_trip_keeps_string_properties() {
        let doc = csv_to_geojson("name,lat,lon\nA,1.25,2.5\nB,-3,4");
        assert_eq!(geojson_to_csv(&doc), "lat,lon,name\n1.25,2.5,A\n-3,4,B");
    }
}
