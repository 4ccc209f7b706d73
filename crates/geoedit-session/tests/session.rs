//! End-to-end editing sessions against file-backed storage

use geoedit_core::{serialize, DrawMode, Feature, FeatureId, Geometry, Position, Properties, Sketch};
use geoedit_export::ExportFormat;
use geoedit_session::views::{add_property, map_view, table_view, update_property};
use geoedit_session::{commands, DocumentStore, FileStore, KeyValueStore, MemoryStore, PERSISTENCE_KEY};
use proptest::prelude::*;

#[test]
fn test_session_survives_reload() {
    let dir = tempfile::tempdir().unwrap();

    let drawn_id = {
        let mut store = DocumentStore::open(FileStore::new(dir.path()));
        let mut sketch = Sketch::new(DrawMode::Polygon);
        for (lon, lat) in [(0.0, 0.0), (4.0, 0.0), (4.0, 3.0)] {
            sketch.click(Position::new(lon, lat));
        }
        let polygon = sketch.finish().unwrap();
        let id = polygon.id.clone().unwrap();
        store.add_feature(polygon);

        let props = add_property(&Properties::new(), "name", "Lot 7").unwrap();
        store.update_feature_properties(&id, props);
        id
    };

    let store = DocumentStore::open(FileStore::new(dir.path()));
    assert_eq!(store.document().len(), 1);
    let feature = store.document().find(&drawn_id).unwrap();
    assert_eq!(feature.properties.get("name").unwrap().to_string(), "Lot 7");
    assert_eq!(store.mirrored_text(), serialize(store.document()));
}

#[test]
fn test_table_columns_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = DocumentStore::open(FileStore::new(dir.path()));
        let feature = Feature::new(Geometry::Point(Position::new(10.0, 20.0)))
            .with_properties([("zeta", "z"), ("alpha", "a")].into_iter().collect());
        store.add_feature(feature);
        assert_eq!(table_view(store.document(), None).columns, vec!["zeta", "alpha"]);
    }

    let store = DocumentStore::open(FileStore::new(dir.path()));
    assert_eq!(table_view(store.document(), None).columns, vec!["zeta", "alpha"]);
    assert_eq!(serialize(&geoedit_core::validate(store.mirrored_text()).unwrap()), store.mirrored_text());
}

#[test]
fn test_unparseable_storage_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStore::new(dir.path());
    storage.set(PERSISTENCE_KEY, b"definitely not json").unwrap();

    let store = DocumentStore::open(storage);
    assert!(store.document().is_empty());
    assert!(store.text_error().is_none());
}

#[test]
fn test_views_follow_property_edits() {
    let mut store = DocumentStore::open(MemoryStore::new());
    let mut sketch = Sketch::new(DrawMode::Point);
    let point = sketch.click(Position::new(-122.4194, 37.7749)).unwrap();
    store.add_feature(point.clone());
    store.set_selection(Some(&point));

    let id = point.id.clone().unwrap();
    let props = add_property(&store.selection().unwrap().properties, "city", "SF").unwrap();
    store.update_feature_properties(&id, props);

    // The property editor reads the selection directly
    let selected = store.selection().unwrap();
    let props = update_property(&selected.properties, "city", "San Francisco");
    store.update_feature_properties(&id, props);

    let table = table_view(store.document(), store.selection());
    assert_eq!(table.columns, vec!["city"]);
    assert_eq!(table.rows[0].cells, vec!["San Francisco"]);
    assert!(table.rows[0].is_selected);

    let map = map_view(store.document(), store.selection());
    assert!(map.layers[0].is_selected);

    let csv = commands::export(&store, ExportFormat::Csv);
    assert_eq!(csv.content, "lat,lon,city\n37.7749,-122.4194,San Francisco");
}

#[test]
fn test_import_then_typing_then_export() {
    let mut store = DocumentStore::open(MemoryStore::new());
    commands::import(&mut store, "cities.csv", "name,lat,lon\nNYC,40.7128,-74.006\nBad,notanumber,-74\n").unwrap();
    assert_eq!(store.document().len(), 1);

    // Half-typed edit does not disturb the document
    let text = store.mirrored_text().to_string();
    store.set_text_value(&text[..text.len() - 3]);
    assert!(store.text_error().is_some());
    assert_eq!(store.document().len(), 1);

    store.set_text_value(text.clone());
    assert!(store.text_error().is_none());

    let geojson = commands::export(&store, ExportFormat::GeoJson);
    assert_eq!(geojson.file_name, "data.geojson");
    assert_eq!(geojson.content, text);
}

#[test]
fn test_deleting_from_table_clears_property_editor() {
    let mut store = DocumentStore::open(MemoryStore::new());
    let a = Feature::new(Geometry::Point(Position::new(1.0, 1.0))).with_id(FeatureId::from("a"));
    let b = Feature::new(Geometry::Point(Position::new(2.0, 2.0))).with_id(FeatureId::from("b"));
    store.add_feature(a.clone());
    store.add_feature(b);
    store.select_id(&FeatureId::from("a"));

    store.remove_feature(&a);
    assert!(store.selection().is_none());
    assert_eq!(table_view(store.document(), store.selection()).rows.len(), 1);
}

fn arb_feature() -> impl Strategy<Value = Feature> {
    ((-180.0f64..180.0), (-90.0f64..90.0), "[a-z]{0,5}").prop_map(|(lon, lat, name)| {
        Feature::new(Geometry::Point(Position::new(lon, lat)))
            .with_properties([("name", name)].into_iter().collect())
    })
}

proptest! {
    #[test]
    fn add_then_remove_restores_feature_list(
        existing in prop::collection::vec(arb_feature(), 0..5),
        extra in arb_feature(),
    ) {
        let mut store = DocumentStore::open(MemoryStore::new());
        for feature in existing {
            let mut sketch = Sketch::new(DrawMode::Point);
            let mut drawn = sketch.click(Position::new(0.0, 0.0)).unwrap();
            drawn.geometry = feature.geometry;
            drawn.properties = feature.properties;
            store.add_feature(drawn);
        }
        let before = store.document().features.clone();

        let mut sketch = Sketch::new(DrawMode::Point);
        let mut added = sketch.click(Position::new(0.0, 0.0)).unwrap();
        added.geometry = extra.geometry;
        added.properties = extra.properties;

        store.add_feature(added.clone());
        prop_assert_eq!(store.remove_feature(&added), 1);
        prop_assert_eq!(&store.document().features, &before);
    }
}
