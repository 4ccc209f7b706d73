use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// A WGS84 position. Serialized as `[lon, lat]` or `[lon, lat, alt]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, alt: None }
    }

    pub fn with_alt(lon: f64, lat: f64, alt: f64) -> Self {
        Self {
            lon,
            lat,
            alt: Some(alt),
        }
    }

    /// False when any component is NaN or infinite; JSON cannot hold those
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && self.alt.is_none_or(f64::is_finite)
    }
}

/// Largest magnitude below which every whole f64 is an exact integer
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Whole-valued coordinates are written as JSON integers, `10` not `10.0`
fn serialize_coordinate<S: SerializeSeq>(seq: &mut S, value: f64) -> Result<(), S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        seq.serialize_element(&(value as i64))
    } else {
        seq.serialize_element(&value)
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.alt.is_some() { 3 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        serialize_coordinate(&mut seq, self.lon)?;
        serialize_coordinate(&mut seq, self.lat)?;
        if let Some(alt) = self.alt {
            serialize_coordinate(&mut seq, alt)?;
        }
        seq.end()
    }
}

struct PositionVisitor;

impl<'de> Visitor<'de> for PositionVisitor {
    type Value = Position;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a position array of 2 or 3 numbers")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Position, A::Error> {
        let lon: f64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let lat: f64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let alt: Option<f64> = seq.next_element()?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(4, &self));
        }
        Ok(Position { lon, lat, alt })
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(PositionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_lon_lat_array() {
        let json = serde_json::to_string(&Position::new(-74.006, 40.7128)).unwrap();
        assert_eq!(json, "[-74.006,40.7128]");

        let json = serde_json::to_string(&Position::with_alt(1.5, 2.5, 10.0)).unwrap();
        assert_eq!(json, "[1.5,2.5,10]");
    }

    #[test]
    fn test_integer_coordinates_are_accepted() {
        let pos: Position = serde_json::from_str("[10, -20]").unwrap();
        assert_eq!(pos, Position::new(10.0, -20.0));
    }

    #[test]
    fn test_whole_coordinates_serialize_as_integers() {
        let pos: Position = serde_json::from_str("[10, -20]").unwrap();
        assert_eq!(serde_json::to_string(&pos).unwrap(), "[10,-20]");
        assert_eq!(serde_json::to_string(&Position::new(-0.0, 1e300)).unwrap(), "[0,1e300]");
    }

    #[test]
    fn test_is_finite() {
        assert!(Position::new(1.0, 2.0).is_finite());
        assert!(!Position::new(f64::NAN, 0.0).is_finite());
        assert!(!Position::new(0.0, f64::INFINITY).is_finite());
        assert!(!Position::with_alt(0.0, 0.0, f64::NEG_INFINITY).is_finite());
    }

    #[test]
    fn test_rejects_wrong_arity() {
        assert!(serde_json::from_str::<Position>("[1]").is_err());
        assert!(serde_json::from_str::<Position>("[1, 2, 3, 4]").is_err());
        assert!(serde_json::from_str::<Position>(r#"["a", 2]"#).is_err());
    }
}
