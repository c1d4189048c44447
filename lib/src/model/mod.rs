//! Word classifiers.
//!
//! Every classifier comes in two types, mirroring the extractors in
//! [`crate::preprocessing`]:
//! - an unfitted config implementing [`Classifier`], carrying hyperparameters;
//! - a fitted model implementing [`InferenceModel`], carrying only what
//!   prediction needs and serializable through [`InferenceModel::extract_params`].
//!
//! Labels are `0` (Croatian) and `1` (English); training needs both.

use crate::error::{LexiglotError, Result};
use crate::matrix::{FeatureMatrix, Row};
use crate::serialization::SerializableParams;
use crate::Label;

pub mod adaboost;
pub mod classifier;
pub mod knn;
pub mod svm;

pub use adaboost::{AdaBoostClassifier, AdaBoostConfig, AdaBoostModel, AdaBoostParams, Stump};
pub use classifier::{ClassifierParams, ClassifierSpec, FittedClassifier};
pub use knn::{KnnClassifier, KnnConfig, KnnModel, KnnParams, KnnWeights};
pub use svm::{Gamma, Kernel, SvcClassifier, SvcConfig, SvcModel, SvcParams};

/// Unfitted classifier with hyperparameters.
pub trait Classifier: Clone {
    /// Serializable representation of the fitted model.
    type Params: SerializableParams;
    /// Fitted model type.
    type Fitted: InferenceModel<Params = Self::Params>;

    /// Fit on one feature row per label.
    ///
    /// # Errors
    /// Returns [`LexiglotError::Data`] if rows and labels disagree in number,
    /// the input is empty, a label is not 0/1, or only one class is present.
    fn fit(&self, x: &FeatureMatrix, y: &[Label]) -> Result<Self::Fitted>;
}

/// Fitted classifier, ready for inference and serialization.
pub trait InferenceModel: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Predict the label of a single row.
    ///
    /// The row must have [`InferenceModel::n_features_in`] columns.
    fn predict(&self, row: &Row<'_>) -> Label;

    /// Predict one label per row.
    ///
    /// # Errors
    /// Returns [`LexiglotError::FeatureMismatch`] if the width differs from fit.
    fn predict_batch(&self, x: &FeatureMatrix) -> Result<Vec<Label>> {
        check_width(self.n_features_in(), x)?;
        Ok(x.rows().map(|row| self.predict(&row)).collect())
    }

    /// Number of features seen during fit.
    fn n_features_in(&self) -> usize;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted model from parameters.
    fn from_params(params: Self::Params) -> Result<Self>
    where
        Self: Sized;
}

/// Fail with [`LexiglotError::FeatureMismatch`] unless `x` is `expected` wide.
pub fn check_width(expected: usize, x: &FeatureMatrix) -> Result<()> {
    if x.n_cols() != expected {
        return Err(LexiglotError::FeatureMismatch {
            expected,
            got: x.n_cols(),
        });
    }
    Ok(())
}

/// Shared preconditions of every `fit`.
pub(crate) fn validate_training_data(x: &FeatureMatrix, y: &[Label]) -> Result<()> {
    if x.n_rows() != y.len() {
        return Err(LexiglotError::Data(format!(
            "{} feature rows but {} labels",
            x.n_rows(),
            y.len()
        )));
    }
    if y.is_empty() {
        return Err(LexiglotError::Data("cannot fit on zero samples".to_string()));
    }
    if let Some(bad) = y.iter().find(|&&l| l > 1) {
        return Err(LexiglotError::Data(format!("label must be 0 or 1, got {bad}")));
    }
    if !y.contains(&0) || !y.contains(&1) {
        return Err(LexiglotError::Data(
            "training labels must contain both classes".to_string(),
        ));
    }
    Ok(())
}

/// `+1.0` for English, `-1.0` otherwise.
pub(crate) fn signed(label: Label) -> f64 {
    if label == 1 {
        1.0
    } else {
        -1.0
    }
}
