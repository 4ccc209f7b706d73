use geoedit_core::{Feature, FeatureCollection, FeatureId};

use super::is_selected;

/// One table row per feature, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based position in the document
    pub index: usize,
    pub id: Option<FeatureId>,
    pub geometry_type: &'static str,
    /// One cell per column; missing properties are empty
    pub cells: Vec<String>,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    /// Property keys across all features, first-seen order
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain-text rendering with `#` and `Type` leading columns
    pub fn to_text(&self) -> String {
        let mut header = vec!["#".to_string(), "Type".to_string(), "Id".to_string()];
        header.extend(self.columns.iter().cloned());

        let mut lines = vec![header.join("\t")];
        for row in &self.rows {
            let marker = if row.is_selected { "*" } else { "" };
            let mut line = vec![
                format!("{}{}", row.index, marker),
                row.geometry_type.to_string(),
                row.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            ];
            line.extend(row.cells.iter().cloned());
            lines.push(line.join("\t"));
        }
        lines.join("\n")
    }
}

pub fn table_view(doc: &FeatureCollection, selection: Option<&Feature>) -> TableView {
    let columns = doc.property_keys();
    let rows = doc
        .features
        .iter()
        .enumerate()
        .map(|(idx, feature)| TableRow {
            index: idx + 1,
            id: feature.id.clone(),
            geometry_type: feature.geometry_type_name(),
            cells: columns
                .iter()
                .map(|col| feature.properties.get(col).map(ToString::to_string).unwrap_or_default())
                .collect(),
            is_selected: is_selected(feature, selection),
        })
        .collect();
    TableView { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoedit_core::{Geometry, Position};

    #[test]
    fn test_rows_follow_document_order() {
        let a = Feature::new(Geometry::Point(Position::new(0.0, 0.0)))
            .with_id(1u64)
            .with_properties([("name", "a")].into_iter().collect());
        let b = Feature::new(Geometry::LineString(vec![]))
            .with_id(2u64)
            .with_properties([("lanes", 2i64)].into_iter().collect());
        let doc = FeatureCollection::new(vec![a, b.clone()]);

        let table = table_view(&doc, Some(&b));
        assert_eq!(table.columns, vec!["name", "lanes"]);
        assert_eq!(table.rows[0].cells, vec!["a", ""]);
        assert_eq!(table.rows[1].cells, vec!["", "2"]);
        assert_eq!(table.rows[1].geometry_type, "LineString");
        assert_eq!(table.rows[1].index, 2);
        assert!(!table.rows[0].is_selected);
        assert!(table.rows[1].is_selected);

        assert_eq!(table.to_text(), "#\tType\tId\tname\tlanes\n1\tPoint\t1\ta\t\n2*\tLineString\t2\t\t2");
    }

    #[test]
    fn test_empty_document() {
        let table = table_view(&FeatureCollection::default(), None);
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }
}
