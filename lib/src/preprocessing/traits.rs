//! Core traits for word feature extractors.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: the unfitted extractor; carries hyperparameters and learns from words.
//! - [`FittedTransformer`]: the fitted extractor; frozen statistics, ready for inference
//!   and serialization.

use crate::error::{LexiglotError, Result};
use crate::matrix::FeatureMatrix;
use crate::serialization::SerializableParams;

/// Trait for unfitted extractors with hyperparameters.
///
/// An extractor learns statistics from a training corpus (length moments, an
/// n-gram vocabulary) and can then turn any batch of words into a
/// [`FeatureMatrix`] with one row per word.
///
/// # Example
/// ```rust
/// use lexiglot::preprocessing::{FittedTransformer, LinguisticFeatureExtractor, Transformer};
///
/// let fitted = LinguisticFeatureExtractor::new().fit(&["a", "bb", "ccc"]).unwrap();
/// let features = fitted.transform(&["dddd"]).unwrap();
/// assert_eq!(features.row(0).to_dense_with_width(9)[0], 2.0);
/// ```
pub trait Transformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted extractor type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params>;

    /// Fit the extractor on a corpus of words.
    ///
    /// # Errors
    /// Returns [`LexiglotError::Data`] when the corpus cannot support the
    /// statistics the extractor needs, and [`LexiglotError::InvalidParameter`]
    /// for inconsistent hyperparameters.
    fn fit<S: AsRef<str>>(&self, words: &[S]) -> Result<Self::Fitted>;

    /// Fit the extractor and transform the same words.
    fn fit_transform<S: AsRef<str>>(&self, words: &[S]) -> Result<FeatureMatrix> {
        let fitted = self.fit(words)?;
        fitted.transform(words)
    }
}

/// Trait for fitted extractors ready for inference.
///
/// # Guarantees
/// - `transform` is pure: the same words always give the same rows.
/// - Row `i` of the output belongs to `words[i]`.
/// - `extract_params()` + `from_params()` is a round-trip.
pub trait FittedTransformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Turn words into feature rows using the frozen statistics.
    fn transform<S: AsRef<str>>(&self, words: &[S]) -> Result<FeatureMatrix>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted extractor from parameters.
    fn from_params(params: Self::Params) -> Result<Self>
    where
        Self: Sized;

    /// Number of columns produced by `transform`.
    fn n_features_out(&self) -> usize;

    /// Save the fitted extractor to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let bytes = self
            .extract_params()
            .to_bytes()
            .map_err(|e| LexiglotError::Serialization(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a fitted extractor from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self>
    where
        Self: Sized,
    {
        let bytes = std::fs::read(path)?;
        let params = Self::Params::from_bytes(&bytes)
            .map_err(|e| LexiglotError::Serialization(e.to_string()))?;
        Self::from_params(params)
    }
}
