//! Edits made in the property editor. Each helper returns the complete new
//! property set, which goes to `DocumentStore::update_feature_properties`.

use geoedit_core::{Properties, PropertyValue};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Property name must not be blank")]
    BlankKey,
}

/// Add (or overwrite) a property. The key must contain non-whitespace.
pub fn add_property(
    properties: &Properties,
    key: &str,
    value: impl Into<PropertyValue>,
) -> Result<Properties, FormError> {
    if key.trim().is_empty() {
        return Err(FormError::BlankKey);
    }
    let mut next = properties.clone();
    next.insert(key, value);
    Ok(next)
}

/// Change one value, keeping its position
pub fn update_property(properties: &Properties, key: &str, value: impl Into<PropertyValue>) -> Properties {
    let mut next = properties.clone();
    next.insert(key, value);
    next
}

pub fn delete_property(properties: &Properties, key: &str) -> Properties {
    let mut next = properties.clone();
    next.remove(key);
    next
}
