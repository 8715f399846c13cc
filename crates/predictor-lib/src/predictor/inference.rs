//! Trained regressors
//!
//! Two model families are served: a standardized linear model and an
//! ensemble of regression trees. Both are deserialized from the model
//! artifact as a tagged enum, so the variant is fixed once at load time.

use super::RegressionModel;
use crate::error::PredictError;
use crate::models::AlignedRecord;
use serde::{Deserialize, Serialize};

/// Linear regression over standardized features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    /// Per-column training mean
    pub means: Vec<f64>,
    /// Per-column training standard deviation
    pub scales: Vec<f64>,
}

impl LinearModel {
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Check the scaling parameters line up with the coefficients
    pub fn validate(&self) -> Result<(), String> {
        let n = self.coefficients.len();
        if n == 0 {
            return Err("linear model has no coefficients".to_string());
        }
        if self.means.len() != n || self.scales.len() != n {
            return Err(format!(
                "linear model has {} coefficients but {} means and {} scales",
                n,
                self.means.len(),
                self.scales.len()
            ));
        }
        let all_finite = std::iter::once(&self.intercept)
            .chain(&self.coefficients)
            .chain(&self.means)
            .chain(&self.scales)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err("linear model contains non-finite parameters".to_string());
        }
        Ok(())
    }
}

impl RegressionModel for LinearModel {
    fn predict(&self, features: &AlignedRecord) -> Result<f64, PredictError> {
        check_width(features, self.n_features())?;
        let sum: f64 = features
            .values()
            .iter()
            .zip(&self.coefficients)
            .zip(self.means.iter().zip(&self.scales))
            .map(|((x, coef), (mean, scale))| {
                // Constant training columns have zero variance
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                coef * (x - mean) / scale
            })
            .sum();
        finite(self.intercept + sum)
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// Node of a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        value: f64,
    },
}

impl TreeNode {
    /// Walk to a leaf; left when `x <= threshold`
    pub fn evaluate(&self, features: &[f64]) -> Result<f64, PredictError> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features.get(*feature).ok_or_else(|| {
                        PredictError::prediction(format!("split on missing feature {}", feature))
                    })?;
                    node = if *x <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    pub fn max_feature(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature, left, right, ..
            } => [Some(*feature), left.max_feature(), right.max_feature()]
                .into_iter()
                .flatten()
                .max(),
        }
    }
}

/// Average of regression trees operating on unscaled features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleModel {
    pub n_features: usize,
    pub trees: Vec<TreeNode>,
}

impl EnsembleModel {
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        if let Some(max) = self.trees.iter().filter_map(TreeNode::max_feature).max() {
            if max >= self.n_features {
                return Err(format!(
                    "tree splits on feature {} but the model has {} features",
                    max, self.n_features
                ));
            }
        }
        Ok(())
    }
}

impl RegressionModel for EnsembleModel {
    fn predict(&self, features: &AlignedRecord) -> Result<f64, PredictError> {
        check_width(features, self.n_features)?;
        if self.trees.is_empty() {
            return Err(PredictError::prediction("ensemble has no trees"));
        }
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(features.values())?;
        }
        finite(total / self.trees.len() as f64)
    }

    fn kind(&self) -> &'static str {
        "ensemble"
    }
}

/// Model family loaded from an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrainedModel {
    Linear(LinearModel),
    Ensemble(EnsembleModel),
}

impl TrainedModel {
    pub fn n_features(&self) -> usize {
        match self {
            TrainedModel::Linear(m) => m.n_features(),
            TrainedModel::Ensemble(m) => m.n_features(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            TrainedModel::Linear(m) => m.validate(),
            TrainedModel::Ensemble(m) => m.validate(),
        }
    }
}

impl RegressionModel for TrainedModel {
    fn predict(&self, features: &AlignedRecord) -> Result<f64, PredictError> {
        match self {
            TrainedModel::Linear(m) => m.predict(features),
            TrainedModel::Ensemble(m) => m.predict(features),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            TrainedModel::Linear(m) => m.kind(),
            TrainedModel::Ensemble(m) => m.kind(),
        }
    }
}

fn check_width(features: &AlignedRecord, expected: usize) -> Result<(), PredictError> {
    if features.len() != expected {
        return Err(PredictError::prediction(format!(
            "model expects {} features, got {}",
            expected,
            features.len()
        )));
    }
    Ok(())
}

fn finite(value: f64) -> Result<f64, PredictError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PredictError::prediction("model produced a non-finite value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(values: &[f64]) -> AlignedRecord {
        let columns = (0..values.len()).map(|i| format!("f{}", i)).collect();
        AlignedRecord::from_parts(columns, values.to_vec())
    }

    fn linear() -> LinearModel {
        LinearModel {
            intercept: 100.0,
            coefficients: vec![10.0, -5.0],
            means: vec![2.0, 0.0],
            scales: vec![2.0, 0.0],
        }
    }

    fn stump(threshold: f64, low: f64, high: f64) -> TreeNode {
        TreeNode::Split {
            feature: 0,
            threshold,
            left: Box::new(TreeNode::Leaf { value: low }),
            right: Box::new(TreeNode::Leaf { value: high }),
        }
    }

    #[test]
    fn test_linear_standardizes_features() {
        // 100 + 10 * (6 - 2) / 2 + (-5) * (3 - 0) / 1
        let prediction = linear().predict(&features(&[6.0, 3.0])).unwrap();
        assert!((prediction - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_rejects_wrong_width() {
        let err = linear().predict(&features(&[1.0])).unwrap_err();
        assert!(matches!(err, PredictError::Prediction(_)));
    }

    #[test]
    fn test_linear_overflow_is_prediction_error() {
        let model = LinearModel {
            intercept: 0.0,
            coefficients: vec![f64::MAX],
            means: vec![0.0],
            scales: vec![1.0],
        };
        assert!(model.predict(&features(&[10.0])).is_err());
    }

    #[test]
    fn test_linear_validate() {
        assert!(linear().validate().is_ok());
        let mut broken = linear();
        broken.means.pop();
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_ensemble_averages_trees() {
        let model = EnsembleModel {
            n_features: 1,
            trees: vec![stump(5.0, 1.0, 3.0), stump(10.0, 10.0, 20.0)],
        };
        // threshold is inclusive on the left
        assert_eq!(model.predict(&features(&[5.0])).unwrap(), 5.5);
        assert_eq!(model.predict(&features(&[7.0])).unwrap(), 6.5);
        assert_eq!(model.predict(&features(&[11.0])).unwrap(), 11.5);
    }

    #[test]
    fn test_ensemble_validate() {
        let empty = EnsembleModel {
            n_features: 1,
            trees: vec![],
        };
        assert!(empty.validate().is_err());

        let out_of_range = EnsembleModel {
            n_features: 0,
            trees: vec![stump(1.0, 0.0, 1.0)],
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_trained_model_tagged_json() {
        let json = r#"{
            "kind": "ensemble",
            "n_features": 2,
            "trees": [
                {"feature": 1, "threshold": 0.5,
                 "left": {"value": 100.0},
                 "right": {"feature": 0, "threshold": 3.0,
                           "left": {"value": 200.0}, "right": {"value": 300.0}}}
            ]
        }"#;
        let model: TrainedModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.kind(), "ensemble");
        assert_eq!(model.n_features(), 2);
        assert!(model.validate().is_ok());
        assert_eq!(model.predict(&features(&[4.0, 1.0])).unwrap(), 300.0);
        assert_eq!(model.predict(&features(&[2.0, 1.0])).unwrap(), 200.0);
        assert_eq!(model.predict(&features(&[9.0, 0.0])).unwrap(), 100.0);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<TrainedModel, _> = serde_json::from_str(r#"{"kind": "svm"}"#);
        assert!(result.is_err());
    }
}
