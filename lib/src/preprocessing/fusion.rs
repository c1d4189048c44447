//! Concatenation of n-gram counts and linguistic features.
//!
//! The fused row is `[n-gram columns | 9 linguistic columns]`. The n-gram
//! block is sparse, so the fused matrix is CSR.

use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::preprocessing::linguistic::{
    FittedLinguisticExtractor, LinguisticFeatureExtractor, LinguisticParams,
    N_LINGUISTIC_FEATURES,
};
use crate::preprocessing::ngram::{FittedNgramCounter, NgramCounter, NgramParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

/// Serializable parameters for a fitted fusion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusionParams {
    pub ngrams: NgramParams,
    pub linguistic: LinguisticParams,
}

/// N-gram counter and linguistic extractor fitted on the same words.
#[derive(Clone, Debug, Default)]
pub struct FeatureFusion {
    ngrams: NgramCounter,
    linguistic: LinguisticFeatureExtractor,
}

impl FeatureFusion {
    pub fn new(ngrams: NgramCounter) -> Self {
        Self {
            ngrams,
            linguistic: LinguisticFeatureExtractor::new(),
        }
    }

    pub fn ngrams(&self) -> &NgramCounter {
        &self.ngrams
    }
}

impl Transformer for FeatureFusion {
    type Params = FusionParams;
    type Fitted = FittedFeatureFusion;

    fn fit<S: AsRef<str>>(&self, words: &[S]) -> Result<Self::Fitted> {
        Ok(FittedFeatureFusion {
            ngrams: self.ngrams.fit(words)?,
            linguistic: self.linguistic.fit(words)?,
        })
    }
}

/// Fitted fusion.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedFeatureFusion {
    ngrams: FittedNgramCounter,
    linguistic: FittedLinguisticExtractor,
}

impl FittedFeatureFusion {
    pub fn ngrams(&self) -> &FittedNgramCounter {
        &self.ngrams
    }

    pub fn linguistic(&self) -> &FittedLinguisticExtractor {
        &self.linguistic
    }
}

impl FittedTransformer for FittedFeatureFusion {
    type Params = FusionParams;

    fn transform<S: AsRef<str>>(&self, words: &[S]) -> Result<FeatureMatrix> {
        let counts = self.ngrams.transform(words)?;
        let features = self.linguistic.transform(words)?;
        FeatureMatrix::hstack(&[counts, features])
    }

    fn extract_params(&self) -> Self::Params {
        FusionParams {
            ngrams: self.ngrams.extract_params(),
            linguistic: self.linguistic.extract_params(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(Self {
            ngrams: FittedNgramCounter::from_params(params.ngrams)?,
            linguistic: FittedLinguisticExtractor::from_params(params.linguistic)?,
        })
    }

    fn n_features_out(&self) -> usize {
        self.ngrams.n_features_out() + N_LINGUISTIC_FEATURES
    }
}
