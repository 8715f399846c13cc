//! Feature encoding for price inference
//!
//! Validates raw request attributes and expands them into the sparse
//! column map the aligner consumes. Booleans become 0/1 and the location
//! becomes a single `Location_<value>` indicator column.

use crate::error::PredictError;
use crate::models::{AttributeRecord, EncodedRecord, RawAttributes};
use serde_json::Value;

pub const BEDROOMS: &str = "Bedrooms";
pub const BATHROOMS: &str = "Bathrooms";
pub const SQUARE_FEET: &str = "SquareFeet";
pub const FLOORS: &str = "Floors";
pub const AGE: &str = "Age";
pub const WATERFRONT: &str = "Waterfront";
pub const GARAGE: &str = "Garage";
pub const GARDEN: &str = "Garden";

/// Prefix of the location indicator columns
pub const LOCATION_PREFIX: &str = "Location";

/// Name of the indicator column for one location value
pub fn location_column(location: &str) -> String {
    format!("{}_{}", LOCATION_PREFIX, location)
}

/// Encodes house attributes into model feature columns
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Validate raw attributes into a typed record.
    ///
    /// Errors name the request field (`sqft`), not the column (`SquareFeet`).
    pub fn parse(&self, raw: &RawAttributes) -> Result<AttributeRecord, PredictError> {
        Ok(AttributeRecord {
            bedrooms: parse_int("bedrooms", raw.bedrooms.as_ref())?,
            bathrooms: parse_int("bathrooms", raw.bathrooms.as_ref())?,
            square_feet: parse_int("sqft", raw.sqft.as_ref())?,
            floors: parse_float("floors", raw.floors.as_ref())?,
            age: parse_int("age", raw.age.as_ref())?,
            waterfront: parse_bool("waterfront", raw.waterfront.as_ref())?,
            garage: parse_bool("garage", raw.garage.as_ref())?,
            garden: parse_bool("garden", raw.garden.as_ref())?,
            location: parse_location("location", raw.location.as_ref())?,
        })
    }

    /// Expand a record into its sparse column map. Never consults a schema.
    pub fn encode(&self, record: &AttributeRecord) -> EncodedRecord {
        let mut encoded = EncodedRecord::new();
        encoded.insert(BEDROOMS, record.bedrooms as f64);
        encoded.insert(BATHROOMS, record.bathrooms as f64);
        encoded.insert(SQUARE_FEET, record.square_feet as f64);
        encoded.insert(FLOORS, record.floors);
        encoded.insert(AGE, record.age as f64);
        encoded.insert(WATERFRONT, flag(record.waterfront));
        encoded.insert(GARAGE, flag(record.garage));
        encoded.insert(GARDEN, flag(record.garden));
        encoded.insert(location_column(&record.location), 1.0);
        encoded
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn required<'a>(field: &str, value: Option<&'a Value>) -> Result<&'a Value, PredictError> {
    match value {
        None | Some(Value::Null) => Err(PredictError::validation(field, "missing required attribute")),
        Some(v) => Ok(v),
    }
}

fn parse_int(field: &str, value: Option<&Value>) -> Result<i64, PredictError> {
    let invalid = || PredictError::validation(field, "expected an integer");
    match required(field, value)? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            // Floats truncate toward zero
            match n.as_f64() {
                Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
                _ => Err(invalid()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn parse_float(field: &str, value: Option<&Value>) -> Result<f64, PredictError> {
    let parsed = match required(field, value)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| PredictError::validation(field, "expected a number"))
}

fn parse_bool(field: &str, value: Option<&Value>) -> Result<bool, PredictError> {
    let parsed = match required(field, value)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(true),
            Some(f) if f == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| PredictError::validation(field, "expected a boolean"))
}

fn parse_location(field: &str, value: Option<&Value>) -> Result<String, PredictError> {
    match required(field, value)? {
        // An empty location encodes to a bare `Location_` column no model knows
        Value::String(s) => Ok(s.trim().to_string()),
        _ => Err(PredictError::validation(field, "expected a string")),
    }
}
