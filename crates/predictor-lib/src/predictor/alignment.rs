//! Schema alignment
//!
//! Reshapes a sparse encoded record into the positional feature vector a
//! trained model expects: schema columns in schema order, missing columns
//! filled with 0, columns unknown to the schema dropped.

use crate::models::{AlignedRecord, ColumnLookup, ColumnSchema, EncodedRecord};
use tracing::debug;

/// Value used for schema columns the record does not carry
pub const FILL_VALUE: f64 = 0.0;

/// Aligns encoded records against a training-time column schema
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnAligner;

impl ColumnAligner {
    pub fn new() -> Self {
        Self
    }

    /// Look up every schema column by name. Total; never fails.
    pub fn align<R: ColumnLookup + ?Sized>(&self, record: &R, schema: &ColumnSchema) -> AlignedRecord {
        let mut filled = 0usize;
        let values: Vec<f64> = schema
            .columns()
            .iter()
            .map(|column| {
                record.value(column).unwrap_or_else(|| {
                    filled += 1;
                    FILL_VALUE
                })
            })
            .collect();

        debug!(columns = schema.len(), filled = filled, "Aligned record to schema");
        AlignedRecord::from_parts(schema.columns().to_vec(), values)
    }

    /// Columns of an encoded record the schema does not know about
    pub fn dropped_columns<'a>(&self, encoded: &'a EncodedRecord, schema: &ColumnSchema) -> Vec<&'a str> {
        let mut dropped: Vec<&str> = encoded.columns().filter(|c| !schema.contains(c)).collect();
        dropped.sort_unstable();
        dropped
    }
}
