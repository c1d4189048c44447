//! Error types for lexiglot operations.

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, LexiglotError>;

/// Error type for feature extraction, training, persistence and classification.
#[derive(Error, Debug)]
pub enum LexiglotError {
    /// Malformed or insufficient input data.
    #[error("Data error: {0}")]
    Data(String),

    /// Variant identifier outside the fixed catalogue.
    #[error("Unsupported model variant: {0}")]
    UnsupportedVariant(String),

    /// No persisted model exists under the requested name.
    #[error("Model not found: {0} (run `lexiglot train` first)")]
    ModelNotFound(String),

    /// A stateful component was used before `fit`.
    #[error("{0} used before fit")]
    NotFitted(&'static str),

    /// Feature dimension differs from the one seen during fit.
    #[error("Feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// Invalid hyperparameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The performance report could not be located or patched.
    #[error("Report error: {0}")]
    Report(String),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A catalogue variant failed during the training loop.
    #[error("variant {variant} failed: {source}")]
    VariantFailed {
        variant: String,
        #[source]
        source: Box<LexiglotError>,
    },
}

impl From<bincode::Error> for LexiglotError {
    fn from(err: bincode::Error) -> Self {
        LexiglotError::Serialization(err.to_string())
    }
}

impl LexiglotError {
    /// Attach the name of the variant that was being processed.
    pub fn for_variant(self, variant: impl Into<String>) -> Self {
        LexiglotError::VariantFailed {
            variant: variant.into(),
            source: Box::new(self),
        }
    }
}
