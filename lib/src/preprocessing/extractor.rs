//! Runtime choice of extractor.
//!
//! The registry picks one of three extractors per variant; these enums carry
//! that choice through fit, transform and serialization.

use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::preprocessing::fusion::{FeatureFusion, FittedFeatureFusion, FusionParams};
use crate::preprocessing::linguistic::{
    FittedLinguisticExtractor, LinguisticFeatureExtractor, LinguisticParams,
};
use crate::preprocessing::ngram::{FittedNgramCounter, NgramCounter, NgramParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

/// Unfitted extractor of any kind.
#[derive(Clone, Debug)]
pub enum ExtractorSpec {
    Ngram(NgramCounter),
    Linguistic(LinguisticFeatureExtractor),
    Fused(FeatureFusion),
}

impl ExtractorSpec {
    /// Character n-grams over `[min_n, max_n]`.
    pub fn ngram(min_n: usize, max_n: usize) -> Self {
        ExtractorSpec::Ngram(NgramCounter::new().with_ngram_range(min_n, max_n))
    }

    pub fn linguistic() -> Self {
        ExtractorSpec::Linguistic(LinguisticFeatureExtractor::new())
    }

    /// N-grams over `[min_n, max_n]` followed by the linguistic features.
    pub fn fused(min_n: usize, max_n: usize) -> Self {
        ExtractorSpec::Fused(FeatureFusion::new(
            NgramCounter::new().with_ngram_range(min_n, max_n),
        ))
    }

    /// Short human-readable description, used in logs.
    pub fn describe(&self) -> String {
        match self {
            ExtractorSpec::Ngram(c) => {
                format!("ngram({},{})", c.config().min_n, c.config().max_n)
            }
            ExtractorSpec::Linguistic(_) => "linguistic".to_string(),
            ExtractorSpec::Fused(f) => {
                let c = f.ngrams().config();
                format!("ngram({},{})+linguistic", c.min_n, c.max_n)
            }
        }
    }
}

impl Transformer for ExtractorSpec {
    type Params = ExtractorParams;
    type Fitted = FittedExtractor;

    fn fit<S: AsRef<str>>(&self, words: &[S]) -> Result<Self::Fitted> {
        Ok(match self {
            ExtractorSpec::Ngram(c) => FittedExtractor::Ngram(c.fit(words)?),
            ExtractorSpec::Linguistic(e) => FittedExtractor::Linguistic(e.fit(words)?),
            ExtractorSpec::Fused(f) => FittedExtractor::Fused(f.fit(words)?),
        })
    }
}

/// Serializable parameters of a fitted extractor of any kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExtractorParams {
    Ngram(NgramParams),
    Linguistic(LinguisticParams),
    Fused(FusionParams),
}

/// Fitted extractor of any kind.
#[derive(Clone, Debug, PartialEq)]
pub enum FittedExtractor {
    Ngram(FittedNgramCounter),
    Linguistic(FittedLinguisticExtractor),
    Fused(FittedFeatureFusion),
}

impl FittedTransformer for FittedExtractor {
    type Params = ExtractorParams;

    fn transform<S: AsRef<str>>(&self, words: &[S]) -> Result<FeatureMatrix> {
        match self {
            FittedExtractor::Ngram(c) => c.transform(words),
            FittedExtractor::Linguistic(e) => e.transform(words),
            FittedExtractor::Fused(f) => f.transform(words),
        }
    }

    fn extract_params(&self) -> Self::Params {
        match self {
            FittedExtractor::Ngram(c) => ExtractorParams::Ngram(c.extract_params()),
            FittedExtractor::Linguistic(e) => ExtractorParams::Linguistic(e.extract_params()),
            FittedExtractor::Fused(f) => ExtractorParams::Fused(f.extract_params()),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(match params {
            ExtractorParams::Ngram(p) => FittedExtractor::Ngram(FittedNgramCounter::from_params(p)?),
            ExtractorParams::Linguistic(p) => {
                FittedExtractor::Linguistic(FittedLinguisticExtractor::from_params(p)?)
            }
            ExtractorParams::Fused(p) => {
                FittedExtractor::Fused(FittedFeatureFusion::from_params(p)?)
            }
        })
    }

    fn n_features_out(&self) -> usize {
        match self {
            FittedExtractor::Ngram(c) => c.n_features_out(),
            FittedExtractor::Linguistic(e) => e.n_features_out(),
            FittedExtractor::Fused(f) => f.n_features_out(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: [&str; 4] = ["running", "kuća", "pre-war", "the"];

    #[test]
    fn test_each_kind_has_expected_width() {
        let ngram = ExtractorSpec::ngram(1, 2).fit(&WORDS).unwrap();
        let linguistic = ExtractorSpec::linguistic().fit(&WORDS).unwrap();
        let fused = ExtractorSpec::fused(1, 2).fit(&WORDS).unwrap();

        assert_eq!(linguistic.n_features_out(), 9);
        assert_eq!(
            fused.n_features_out(),
            ngram.n_features_out() + linguistic.n_features_out()
        );
        for f in [&ngram, &linguistic, &fused] {
            let m = f.transform(&WORDS).unwrap();
            assert_eq!(m.shape(), (WORDS.len(), f.n_features_out()));
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(ExtractorSpec::ngram(1, 5).describe(), "ngram(1,5)");
        assert_eq!(ExtractorSpec::linguistic().describe(), "linguistic");
    }

    #[test]
    fn test_params_roundtrip_preserves_kind() {
        let fused = ExtractorSpec::fused(1, 3).fit(&WORDS).unwrap();
        let restored = FittedExtractor::from_params(fused.extract_params()).unwrap();
        assert_eq!(restored, fused);
    }
}
