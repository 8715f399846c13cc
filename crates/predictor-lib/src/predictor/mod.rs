//! Price prediction pipeline: encode, align, infer, convert

mod alignment;
mod features;
mod inference;
mod output;

pub use alignment::{ColumnAligner, FILL_VALUE};
pub use features::{location_column, FeatureEncoder, LOCATION_PREFIX};
pub use inference::{EnsembleModel, LinearModel, TrainedModel, TreeNode};
pub use output::{
    group_thousands, Currency, CurrencyConfig, CurrencyConverter, FormattedAmount,
    DEFAULT_INR_RATE,
};

/// Column names emitted by [`FeatureEncoder`]
pub mod columns {
    pub use super::features::{
        AGE, BATHROOMS, BEDROOMS, FLOORS, GARAGE, GARDEN, SQUARE_FEET, WATERFRONT,
    };
}

use crate::error::PredictError;
use crate::models::AlignedRecord;

/// Trait for regression model implementations
pub trait RegressionModel: Send + Sync {
    /// Predict a USD price from a schema-aligned feature vector
    fn predict(&self, features: &AlignedRecord) -> Result<f64, PredictError>;

    /// Model family name
    fn kind(&self) -> &'static str;
}
