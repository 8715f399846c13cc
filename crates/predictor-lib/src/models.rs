//! Core data models for the price predictor

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Raw attributes of one house as received from a caller.
///
/// Every field is optional and loosely typed; [`crate::predictor::FeatureEncoder::parse`]
/// turns it into an [`AttributeRecord`] or reports the first offending field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAttributes {
    #[serde(default)]
    pub bedrooms: Option<Value>,
    #[serde(default)]
    pub bathrooms: Option<Value>,
    #[serde(default)]
    pub sqft: Option<Value>,
    #[serde(default)]
    pub floors: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub waterfront: Option<Value>,
    #[serde(default)]
    pub garage: Option<Value>,
    #[serde(default)]
    pub garden: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    /// Output currency code; a non-string value is treated as unrecognized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Value>,
}

/// Validated attributes of one house
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub square_feet: i64,
    pub floors: f64,
    pub age: i64,
    pub waterfront: bool,
    pub garage: bool,
    pub garden: bool,
    pub location: String,
}

/// Anything that can answer "what is the value of column X".
pub trait ColumnLookup {
    fn value(&self, column: &str) -> Option<f64>;
}

/// Sparse column name to value mapping produced by the encoder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedRecord {
    values: HashMap<String, f64>,
}

impl EncodedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: f64) {
        self.values.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl ColumnLookup for EncodedRecord {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column)
    }
}

/// Errors raised while building a [`ColumnSchema`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("column schema is empty")]
    Empty,
    #[error("duplicate column '{0}' in schema")]
    DuplicateColumn(String),
    #[error("blank column name at position {0}")]
    BlankColumn(usize),
}

/// Ordered, unique list of feature columns a trained model expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl ColumnSchema {
    pub fn new(columns: Vec<String>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if column.trim().is_empty() {
                return Err(SchemaError::BlankColumn(idx));
            }
            if !seen.insert(column.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Indicator columns derived from the categorical attribute `prefix`
    pub fn indicator_columns<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(move |c| c.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('_')))
    }
}

impl TryFrom<Vec<String>> for ColumnSchema {
    type Error = SchemaError;

    fn try_from(columns: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<ColumnSchema> for Vec<String> {
    fn from(schema: ColumnSchema) -> Self {
        schema.columns
    }
}

/// Record reshaped to exactly the schema's columns, in schema order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRecord {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl AlignedRecord {
    pub(crate) fn from_parts(columns: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Positional feature vector in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ColumnLookup for AlignedRecord {
    fn value(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }
}

/// Outcome of one successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Price in the target currency
    pub amount: f64,
    pub currency: String,
    /// Display form, e.g. `$325,480.12`
    pub formatted: String,
    pub model_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let err = ColumnSchema::new(cols(&["Bedrooms", "Age", "Bedrooms"])).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("Bedrooms".to_string()));
    }

    #[test]
    fn test_schema_rejects_empty() {
        assert_eq!(ColumnSchema::new(vec![]).unwrap_err(), SchemaError::Empty);
        assert_eq!(
            ColumnSchema::new(cols(&["Age", " "])).unwrap_err(),
            SchemaError::BlankColumn(1)
        );
    }

    #[test]
    fn test_schema_deserializes_from_list() {
        let schema: ColumnSchema =
            serde_json::from_str(r#"["Bedrooms", "Location_Rural", "Location_Suburb"]"#).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.columns()[1], "Location_Rural");

        let bad: Result<ColumnSchema, _> = serde_json::from_str(r#"["Age", "Age"]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_indicator_columns() {
        let schema = ColumnSchema::new(cols(&[
            "Bedrooms",
            "Location_Rural",
            "LocationScore",
            "Location_Suburb",
        ]))
        .unwrap();
        let indicators: Vec<_> = schema.indicator_columns("Location").collect();
        assert_eq!(indicators, vec!["Location_Rural", "Location_Suburb"]);
    }

    #[test]
    fn test_aligned_record_lookup() {
        let record = AlignedRecord::from_parts(cols(&["Age", "Garage"]), vec![10.0, 1.0]);
        assert_eq!(record.value("Garage"), Some(1.0));
        assert_eq!(record.value("Garden"), None);
    }
}
