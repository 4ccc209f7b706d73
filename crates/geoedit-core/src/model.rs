//! Pure conversions between JSON text and the document model.

use serde_json::Value;
use thiserror::Error;

use crate::{Feature, FeatureCollection};

/// Why a piece of text was not accepted as a document.
///
/// The `Display` form is shown to the user next to the code editor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Json(String),

    #[error("features must be an array")]
    FeaturesNotArray,

    #[error("Must be a FeatureCollection or Feature")]
    UnsupportedType,

    #[error("{location}: {message}")]
    InvalidFeature { location: String, message: String },
}

/// An empty FeatureCollection
pub fn create_empty() -> FeatureCollection {
    FeatureCollection::default()
}

/// Parse text into a document.
///
/// A FeatureCollection is taken as-is, a lone Feature is wrapped in a
/// collection. Geometry is only checked as far as the typed model needs
/// to hold it.
pub fn validate(text: &str) -> Result<FeatureCollection, ValidationError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ValidationError::Json(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(ValidationError::UnsupportedType);
    };

    match object.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let Some(Value::Array(items)) = object.remove("features") else {
                return Err(ValidationError::FeaturesNotArray);
            };
            object.remove("type");

            let mut doc = FeatureCollection::new(Vec::with_capacity(items.len()));
            for (index, item) in items.into_iter().enumerate() {
                let feature = parse_feature(item, &format!("features[{}]", index))?;
                doc.features.push(feature);
            }
            doc.foreign = object;
            Ok(doc)
        }
        Some("Feature") => {
            let feature = parse_feature(Value::Object(object), "feature")?;
            Ok(FeatureCollection::new(vec![feature]))
        }
        _ => Err(ValidationError::UnsupportedType),
    }
}

fn parse_feature(value: Value, location: &str) -> Result<Feature, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError::InvalidFeature {
        location: location.to_string(),
        message: e.to_string(),
    })
}

/// Pretty-print with two-space indentation
pub fn serialize(doc: &FeatureCollection) -> String {
    // Every field is a string-keyed map, sequence or finite scalar.
    serde_json::to_string_pretty(doc).expect("feature collections always serialize")
}
