//! The fixed catalogue of model variants.
//!
//! | Variant | Extractor | Classifier |
//! |---|---|---|
//! | `NGRAM_SVC` | n-grams (1, 5) | linear SVC, C = 0.142326 |
//! | `HAND_ENGINEERED_SVC` | linguistic | RBF SVC, C = 0.462249 |
//! | `HAND_ENGINEERED_AND_NGRAMS_SVC` | fused (1, 4) | linear SVC, C = 0.1424 |
//! | `NGRAM_ADABOOST` | n-grams (1, 2) | AdaBoost, 379 stumps |
//! | `HAND_ENGINEERED_ADABOOST` | linguistic | AdaBoost, 10 stumps |
//! | `HAND_ENGINEERED_AND_NGRAMS_ADABOOST` | fused (1, 2) | AdaBoost, 311 stumps |
//! | `NGRAM_KNN` | n-grams (1, 2) | k-NN, k = 6, distance weights |
//! | `HAND_ENGINEERED_KNN` | linguistic | k-NN, k = 103, distance weights |
//! | `HAND_ENGINEERED_AND_NGRAMS_KNN` | fused (1, 2) | k-NN, k = 6, distance weights |

use crate::error::{LexiglotError, Result};
use crate::model::{
    AdaBoostClassifier, ClassifierSpec, Gamma, Kernel, KnnClassifier, KnnWeights, SvcClassifier,
};
use crate::pipeline::WordPipeline;
use crate::preprocessing::ExtractorSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of the catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelVariant {
    NgramSvc,
    HandEngineeredSvc,
    HandEngineeredAndNgramsSvc,
    NgramAdaBoost,
    HandEngineeredAdaBoost,
    HandEngineeredAndNgramsAdaBoost,
    NgramKnn,
    HandEngineeredKnn,
    HandEngineeredAndNgramsKnn,
}

impl ModelVariant {
    /// Every variant, in catalogue order.
    pub const ALL: [ModelVariant; 9] = [
        ModelVariant::NgramSvc,
        ModelVariant::HandEngineeredSvc,
        ModelVariant::HandEngineeredAndNgramsSvc,
        ModelVariant::NgramAdaBoost,
        ModelVariant::HandEngineeredAdaBoost,
        ModelVariant::HandEngineeredAndNgramsAdaBoost,
        ModelVariant::NgramKnn,
        ModelVariant::HandEngineeredKnn,
        ModelVariant::HandEngineeredAndNgramsKnn,
    ];

    pub fn all() -> &'static [ModelVariant] {
        &Self::ALL
    }

    /// Canonical name; also the persisted model's key and the report row key.
    pub fn name(self) -> &'static str {
        match self {
            ModelVariant::NgramSvc => "NGRAM_SVC",
            ModelVariant::HandEngineeredSvc => "HAND_ENGINEERED_SVC",
            ModelVariant::HandEngineeredAndNgramsSvc => "HAND_ENGINEERED_AND_NGRAMS_SVC",
            ModelVariant::NgramAdaBoost => "NGRAM_ADABOOST",
            ModelVariant::HandEngineeredAdaBoost => "HAND_ENGINEERED_ADABOOST",
            ModelVariant::HandEngineeredAndNgramsAdaBoost => {
                "HAND_ENGINEERED_AND_NGRAMS_ADABOOST"
            }
            ModelVariant::NgramKnn => "NGRAM_KNN",
            ModelVariant::HandEngineeredKnn => "HAND_ENGINEERED_KNN",
            ModelVariant::HandEngineeredAndNgramsKnn => "HAND_ENGINEERED_AND_NGRAMS_KNN",
        }
    }

    /// Extractor and classifier hyperparameters of this variant.
    pub fn config(self) -> VariantConfig {
        let svc = |c: f64, kernel: Kernel| {
            ClassifierSpec::Svc(SvcClassifier::new().with_c(c).with_kernel(kernel))
        };
        let ada =
            |n: usize| ClassifierSpec::AdaBoost(AdaBoostClassifier::new().with_n_estimators(n));
        let knn = |k: usize| {
            ClassifierSpec::Knn(
                KnnClassifier::new()
                    .with_k(k)
                    .with_weights(KnnWeights::Distance),
            )
        };

        let (extractor, classifier) = match self {
            ModelVariant::NgramSvc => (ExtractorSpec::ngram(1, 5), svc(0.142326, Kernel::Linear)),
            ModelVariant::HandEngineeredSvc => (
                ExtractorSpec::linguistic(),
                svc(0.462249, Kernel::Rbf(Gamma::Scale)),
            ),
            ModelVariant::HandEngineeredAndNgramsSvc => {
                (ExtractorSpec::fused(1, 4), svc(0.1424, Kernel::Linear))
            }
            ModelVariant::NgramAdaBoost => (ExtractorSpec::ngram(1, 2), ada(379)),
            ModelVariant::HandEngineeredAdaBoost => (ExtractorSpec::linguistic(), ada(10)),
            ModelVariant::HandEngineeredAndNgramsAdaBoost => {
                (ExtractorSpec::fused(1, 2), ada(311))
            }
            ModelVariant::NgramKnn => (ExtractorSpec::ngram(1, 2), knn(6)),
            ModelVariant::HandEngineeredKnn => (ExtractorSpec::linguistic(), knn(103)),
            ModelVariant::HandEngineeredAndNgramsKnn => (ExtractorSpec::fused(1, 2), knn(6)),
        };
        VariantConfig {
            variant: self,
            extractor,
            classifier,
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelVariant {
    type Err = LexiglotError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LexiglotError::UnsupportedVariant(s.to_string()))
    }
}

/// Hyperparameters of one variant.
#[derive(Clone, Debug)]
pub struct VariantConfig {
    pub variant: ModelVariant,
    pub extractor: ExtractorSpec,
    pub classifier: ClassifierSpec,
}

/// Builds fresh, unfitted pipelines for catalogue variants.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    seed: u64,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed handed to the stochastic solvers.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn new_pipeline(&self, variant: ModelVariant) -> WordPipeline {
        let config = variant.config();
        WordPipeline::new(config.extractor, config.classifier.with_seed(self.seed))
    }

    /// Like [`ModelRegistry::new_pipeline`], parsing the variant name first.
    ///
    /// # Errors
    /// Returns [`LexiglotError::UnsupportedVariant`] for unknown names.
    pub fn new_pipeline_by_name(&self, name: &str) -> Result<WordPipeline> {
        Ok(self.new_pipeline(name.parse()?))
    }
}
