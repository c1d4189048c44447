//! Hand-engineered linguistic features.
//!
//! Each word becomes a vector of nine values:
//!
//! | column | feature |
//! |---|---|
//! | 0 | normalized length `(len - mean) / std` |
//! | 1 | doubled letter |
//! | 2 | hyphen |
//! | 3 | English-only letter (`q w x y`) |
//! | 4 | Croatian-only letter (`č ć đ š ž`) |
//! | 5 | English prefix |
//! | 6 | Croatian prefix |
//! | 7 | English suffix |
//! | 8 | Croatian suffix |
//!
//! Columns 1..=8 are `0.0` or `1.0`. Length is counted in characters.

use crate::error::{LexiglotError, Result};
use crate::matrix::{DenseMatrix, FeatureMatrix};
use crate::preprocessing::rules::{rules, RuleSet};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Width of the linguistic feature vector.
pub const N_LINGUISTIC_FEATURES: usize = 9;

/// Serializable parameters for a fitted linguistic extractor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinguisticParams {
    /// Mean word length of the training corpus.
    pub mean: f64,
    /// Sample standard deviation of word lengths.
    pub std: f64,
}

/// Linguistic extractor (unfitted).
#[derive(Clone, Debug, Default)]
pub struct LinguisticFeatureExtractor;

impl LinguisticFeatureExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for LinguisticFeatureExtractor {
    type Params = LinguisticParams;
    type Fitted = FittedLinguisticExtractor;

    fn fit<S: AsRef<str>>(&self, words: &[S]) -> Result<Self::Fitted> {
        if words.len() < 2 {
            return Err(LexiglotError::Data(format!(
                "need at least 2 words to estimate length spread, got {}",
                words.len()
            )));
        }

        let lengths: Vec<f64> = words
            .iter()
            .map(|w| w.as_ref().chars().count() as f64)
            .collect();
        let n = lengths.len() as f64;
        let mean = lengths.iter().sum::<f64>() / n;
        let var = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std = var.sqrt();

        if std == 0.0 {
            return Err(LexiglotError::Data(
                "all training words have the same length; normalized length is undefined"
                    .to_string(),
            ));
        }

        debug!(words = words.len(), mean, std, "fitted linguistic extractor");
        Ok(FittedLinguisticExtractor { mean, std })
    }
}

/// Fitted linguistic extractor with frozen length statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedLinguisticExtractor {
    mean: f64,
    std: f64,
}

impl FittedLinguisticExtractor {
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    /// Feature vector of a single word.
    pub fn features(&self, word: &str) -> [f64; N_LINGUISTIC_FEATURES] {
        let r: &RuleSet = rules();
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let len = word.chars().count() as f64;
        [
            (len - self.mean) / self.std,
            flag(r.has_doubled_letter(word)),
            flag(r.has_hyphen(word)),
            flag(r.has_english_letter(word)),
            flag(r.has_croatian_letter(word)),
            flag(r.has_english_prefix(word)),
            flag(r.has_croatian_prefix(word)),
            flag(r.has_english_suffix(word)),
            flag(r.has_croatian_suffix(word)),
        ]
    }
}

impl FittedTransformer for FittedLinguisticExtractor {
    type Params = LinguisticParams;

    fn transform<S: AsRef<str>>(&self, words: &[S]) -> Result<FeatureMatrix> {
        let mut data = Vec::with_capacity(words.len() * N_LINGUISTIC_FEATURES);
        for word in words {
            data.extend_from_slice(&self.features(word.as_ref()));
        }
        Ok(DenseMatrix::new(data, words.len(), N_LINGUISTIC_FEATURES)?.into())
    }

    fn extract_params(&self) -> Self::Params {
        LinguisticParams {
            mean: self.mean,
            std: self.std,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if !params.std.is_finite() || params.std <= 0.0 || !params.mean.is_finite() {
            return Err(LexiglotError::InvalidParameter(format!(
                "linguistic params need finite mean and positive std, got mean={} std={}",
                params.mean, params.std
            )));
        }
        Ok(Self {
            mean: params.mean,
            std: params.std,
        })
    }

    fn n_features_out(&self) -> usize {
        N_LINGUISTIC_FEATURES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fitted() -> FittedLinguisticExtractor {
        LinguisticFeatureExtractor::new()
            .fit(&["running", "trčanje", "pre-war", "kuća", "the"])
            .unwrap()
    }

    #[test]
    fn test_length_normalization() {
        let f = LinguisticFeatureExtractor::new()
            .fit(&["a", "bb", "ccc"])
            .unwrap();
        assert_eq!(f.mean(), 2.0);
        assert_eq!(f.std(), 1.0);
        assert_eq!(f.features("dddd")[0], 2.0);
    }

    #[test]
    fn test_single_word_fit_fails() {
        let err = LinguisticFeatureExtractor::new().fit(&["a"]).unwrap_err();
        assert!(matches!(err, LexiglotError::Data(_)));
    }

    #[test]
    fn test_constant_length_fit_fails() {
        let err = LinguisticFeatureExtractor::new()
            .fit(&["ab", "cd", "ef"])
            .unwrap_err();
        assert!(matches!(err, LexiglotError::Data(_)));
    }

    #[test]
    fn test_running() {
        let v = fitted().features("running");
        assert_eq!(v[1], 1.0);
        assert_eq!(v[7], 1.0);
    }

    #[test]
    fn test_kuca() {
        let v = fitted().features("kuća");
        assert_eq!(v[4], 1.0);
        assert_eq!(v[8], 1.0);
        assert_eq!(v[3], 0.0);
    }

    #[test]
    fn test_trcanje() {
        let v = fitted().features("trčanje");
        assert_eq!(v[4], 1.0);
        assert_eq!(v[8], 1.0);
    }

    #[test]
    fn test_pre_war() {
        let v = fitted().features("pre-war");
        assert_eq!(v[2], 1.0);
        assert_eq!(v[3], 1.0);
        assert_eq!(v[5], 1.0);
        assert_eq!(v[6], 1.0);
    }

    #[test]
    fn test_empty_word() {
        let f = fitted();
        let v = f.features("");
        assert_eq!(v[0], -f.mean() / f.std());
        assert!(v[1..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let v = fitted().features("QUEEN");
        assert_eq!(v[3], 0.0);
    }

    #[test]
    fn test_transform_shape() {
        let m = fitted().transform(&["a", "kuća"]).unwrap();
        assert_eq!(m.shape(), (2, N_LINGUISTIC_FEATURES));
        assert!(!m.is_sparse());
    }

    #[test]
    fn test_params_roundtrip() {
        let f = fitted();
        let restored = FittedLinguisticExtractor::from_params(f.extract_params()).unwrap();
        assert_eq!(restored, f);
    }

    #[test]
    fn test_from_params_rejects_zero_std() {
        let err = FittedLinguisticExtractor::from_params(LinguisticParams {
            mean: 1.0,
            std: 0.0,
        })
        .unwrap_err();
        assert!(matches!(err, LexiglotError::InvalidParameter(_)));
    }

    #[test]
    fn test_save_and_load() {
        let f = fitted();
        let path = std::env::temp_dir().join("lexiglot_linguistic_extractor.bin");
        f.save_to_file(&path).unwrap();
        let loaded = FittedLinguisticExtractor::load_from_file(&path).unwrap();
        assert_eq!(loaded, f);
        std::fs::remove_file(&path).ok();
    }

    proptest! {
        #[test]
        fn prop_booleans_are_binary(word in "\\PC{0,12}") {
            let v = fitted().features(&word);
            prop_assert_eq!(v.len(), N_LINGUISTIC_FEATURES);
            for x in &v[1..] {
                prop_assert!(*x == 0.0 || *x == 1.0);
            }
        }

        #[test]
        fn prop_transform_is_idempotent(words in prop::collection::vec("[a-zčćđšž-]{0,10}", 0..8)) {
            let f = fitted();
            let first = f.transform(&words).unwrap();
            let second = f.transform(&words).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_rows_follow_input_order(words in prop::collection::vec("[a-z]{0,10}", 1..8)) {
            let f = fitted();
            let m = f.transform(&words).unwrap();
            for (i, w) in words.iter().enumerate() {
                prop_assert_eq!(m.row(i).to_dense_with_width(N_LINGUISTIC_FEATURES), f.features(w).to_vec());
            }
        }
    }
}
