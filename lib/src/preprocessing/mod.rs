//! Word feature extraction.
//!
//! Extractors follow the same unfitted/fitted split as the classifiers in
//! [`crate::model`]: an unfitted [`Transformer`] holds hyperparameters and
//! learns corpus statistics in `fit`, returning a [`FittedTransformer`] that
//! turns words into a [`FeatureMatrix`](crate::matrix::FeatureMatrix) and can
//! be saved and loaded.
//!
//! # Available extractors
//!
//! - [`LinguisticFeatureExtractor`]: nine hand-engineered features per word
//! - [`NgramCounter`]: sparse character n-gram counts over a frozen vocabulary
//! - [`FeatureFusion`]: n-gram counts followed by the linguistic features
//!
//! [`ExtractorSpec`] and [`FittedExtractor`] select among them at runtime.
//!
//! # Example
//!
//! ```rust
//! use lexiglot::preprocessing::{ExtractorSpec, FittedTransformer, Transformer};
//!
//! let fitted = ExtractorSpec::fused(1, 2).fit(&["kuća", "house", "grad"]).unwrap();
//! let features = fitted.transform(&["kuća"]).unwrap();
//! assert_eq!(features.n_cols(), fitted.n_features_out());
//! ```

pub mod extractor;
pub mod fusion;
pub mod linguistic;
pub mod ngram;
pub mod rules;
pub mod traits;

pub use extractor::{ExtractorParams, ExtractorSpec, FittedExtractor};
pub use fusion::{FeatureFusion, FittedFeatureFusion, FusionParams};
pub use linguistic::{
    FittedLinguisticExtractor, LinguisticFeatureExtractor, LinguisticParams,
    N_LINGUISTIC_FEATURES,
};
pub use ngram::{FittedNgramCounter, NgramConfig, NgramCounter, NgramParams};
pub use traits::{FittedTransformer, Transformer};
