//! Character n-gram counts.
//!
//! Words are lower-cased and runs of whitespace collapse to one space before
//! n-grams are taken, so `"Ab  C"` and `"ab c"` count the same. The
//! vocabulary is every n-gram seen during fit, sorted, and column `j` counts
//! the `j`-th entry.
//!
//! # Example
//! ```rust
//! use lexiglot::preprocessing::{FittedTransformer, NgramCounter, Transformer};
//!
//! let counter = NgramCounter::new().with_ngram_range(1, 2);
//! let fitted = counter.fit(&["ab", "ba"]).unwrap();
//! assert_eq!(fitted.vocabulary(), &["a", "ab", "b", "ba"]);
//!
//! let counts = fitted.transform(&["abz"]).unwrap();
//! assert_eq!(counts.row(0).to_dense_with_width(4), vec![1.0, 1.0, 1.0, 0.0]);
//! ```

use crate::error::{LexiglotError, Result};
use crate::matrix::{CsrMatrix, FeatureMatrix};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;
use tracing::debug;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\s+").expect("whitespace regex"));

/// Configuration for [`NgramCounter`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramConfig {
    /// Shortest n-gram, in characters.
    pub min_n: usize,
    /// Longest n-gram, in characters.
    pub max_n: usize,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self { min_n: 1, max_n: 1 }
    }
}

impl NgramConfig {
    fn validate(&self) -> Result<()> {
        if self.min_n == 0 || self.min_n > self.max_n {
            return Err(LexiglotError::InvalidParameter(format!(
                "n-gram range must satisfy 1 <= min_n <= max_n, got ({}, {})",
                self.min_n, self.max_n
            )));
        }
        Ok(())
    }
}

/// Serializable parameters for a fitted n-gram counter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NgramParams {
    pub config: NgramConfig,
    /// Sorted, de-duplicated vocabulary.
    pub vocabulary: Vec<String>,
}

/// Character n-gram counter (unfitted).
#[derive(Clone, Debug, Default)]
pub struct NgramCounter {
    config: NgramConfig,
}

impl NgramCounter {
    /// Unigram counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive n-gram length range.
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.config.min_n = min_n;
        self.config.max_n = max_n;
        self
    }

    pub fn config(&self) -> &NgramConfig {
        &self.config
    }
}

/// Lower-case and collapse whitespace runs.
fn normalize(word: &str) -> String {
    let lower = word.to_lowercase();
    WHITESPACE_RUN.replace_all(&lower, " ").into_owned()
}

/// All n-grams of `word` with `n` in `[min_n, max_n]`, shortest first.
fn char_ngrams(word: &str, config: &NgramConfig) -> Vec<String> {
    let chars: Vec<char> = normalize(word).chars().collect();
    let mut grams = Vec::new();
    for n in config.min_n..=config.max_n.min(chars.len()) {
        grams.extend(chars.windows(n).map(|w| w.iter().collect::<String>()));
    }
    grams
}

impl Transformer for NgramCounter {
    type Params = NgramParams;
    type Fitted = FittedNgramCounter;

    fn fit<S: AsRef<str>>(&self, words: &[S]) -> Result<Self::Fitted> {
        self.config.validate()?;
        if words.is_empty() {
            return Err(LexiglotError::Data(
                "cannot learn an n-gram vocabulary from an empty corpus".to_string(),
            ));
        }

        let vocabulary: BTreeSet<String> = words
            .iter()
            .flat_map(|w| char_ngrams(w.as_ref(), &self.config))
            .collect();
        if vocabulary.is_empty() {
            return Err(LexiglotError::Data(
                "empty vocabulary; corpus has no n-grams in range".to_string(),
            ));
        }

        debug!(
            words = words.len(),
            vocabulary = vocabulary.len(),
            min_n = self.config.min_n,
            max_n = self.config.max_n,
            "fitted n-gram counter"
        );
        Ok(FittedNgramCounter::build(
            self.config.clone(),
            vocabulary.into_iter().collect(),
        ))
    }
}

/// Fitted n-gram counter with a frozen vocabulary.
#[derive(Clone, Debug)]
pub struct FittedNgramCounter {
    config: NgramConfig,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
}

impl PartialEq for FittedNgramCounter {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config && self.vocabulary == other.vocabulary
    }
}

impl FittedNgramCounter {
    fn build(config: NgramConfig, vocabulary: Vec<String>) -> Self {
        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(j, g)| (g.clone(), j))
            .collect();
        Self {
            config,
            vocabulary,
            index,
        }
    }

    /// The sorted vocabulary; entry `j` is the n-gram counted in column `j`.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Column of an n-gram, if it was seen during fit.
    pub fn column_of(&self, gram: &str) -> Option<usize> {
        self.index.get(gram).copied()
    }
}

impl FittedTransformer for FittedNgramCounter {
    type Params = NgramParams;

    fn transform<S: AsRef<str>>(&self, words: &[S]) -> Result<FeatureMatrix> {
        let mut out = CsrMatrix::empty(self.vocabulary.len());
        for word in words {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for gram in char_ngrams(word.as_ref(), &self.config) {
                if let Some(&j) = self.index.get(&gram) {
                    *counts.entry(j).or_insert(0.0) += 1.0;
                }
            }
            out.push_row(counts.into_iter().collect())?;
        }
        Ok(out.into())
    }

    fn extract_params(&self) -> Self::Params {
        NgramParams {
            config: self.config.clone(),
            vocabulary: self.vocabulary.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        params.config.validate()?;
        if params.vocabulary.is_empty() {
            return Err(LexiglotError::InvalidParameter(
                "n-gram vocabulary is empty".to_string(),
            ));
        }
        if params.vocabulary.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LexiglotError::InvalidParameter(
                "n-gram vocabulary must be sorted and unique".to_string(),
            ));
        }
        Ok(Self::build(params.config, params.vocabulary))
    }

    fn n_features_out(&self) -> usize {
        self.vocabulary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_sorted() {
        let f = NgramCounter::new()
            .with_ngram_range(1, 2)
            .fit(&["cab", "ba"])
            .unwrap();
        assert_eq!(f.vocabulary(), &["a", "ab", "b", "ba", "c", "ca"]);
        assert_eq!(f.column_of("ba"), Some(3));
        assert_eq!(f.n_features_out(), 6);
    }

    #[test]
    fn test_counts_and_unseen_grams() {
        let f = NgramCounter::new().fit(&["aab"]).unwrap();
        let m = f.transform(&["abba", "zzz", ""]).unwrap();
        assert!(m.is_sparse());
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.row(0).to_dense_with_width(2), vec![2.0, 2.0]);
        assert_eq!(m.row(1).to_dense_with_width(2), vec![0.0, 0.0]);
        assert_eq!(m.row(2).iter().count(), 0);
    }

    #[test]
    fn test_lowercase_and_whitespace() {
        let f = NgramCounter::new()
            .with_ngram_range(2, 2)
            .fit(&["A  B"])
            .unwrap();
        assert_eq!(f.vocabulary(), &[" b", "a "]);
    }

    #[test]
    fn test_range_skips_unigrams() {
        let f = NgramCounter::new()
            .with_ngram_range(2, 3)
            .fit(&["abc"])
            .unwrap();
        assert_eq!(f.vocabulary(), &["ab", "abc", "bc"]);
    }

    #[test]
    fn test_multibyte_characters() {
        let f = NgramCounter::new()
            .with_ngram_range(1, 2)
            .fit(&["kuća"])
            .unwrap();
        assert!(f.column_of("ća").is_some());
        assert!(f.column_of("ć").is_some());
    }

    #[test]
    fn test_invalid_range() {
        let err = NgramCounter::new()
            .with_ngram_range(0, 2)
            .fit(&["ab"])
            .unwrap_err();
        assert!(matches!(err, LexiglotError::InvalidParameter(_)));
        let err = NgramCounter::new()
            .with_ngram_range(3, 2)
            .fit(&["ab"])
            .unwrap_err();
        assert!(matches!(err, LexiglotError::InvalidParameter(_)));
    }

    #[test]
    fn test_empty_corpus_and_vocabulary() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            NgramCounter::new().fit(&empty),
            Err(LexiglotError::Data(_))
        ));
        assert!(matches!(
            NgramCounter::new()
                .with_ngram_range(3, 3)
                .fit(&["a", "b"]),
            Err(LexiglotError::Data(_))
        ));
    }

    #[test]
    fn test_params_roundtrip() {
        let f = NgramCounter::new()
            .with_ngram_range(1, 3)
            .fit(&["running", "kuća"])
            .unwrap();
        let restored = FittedNgramCounter::from_params(f.extract_params()).unwrap();
        assert_eq!(restored, f);
        assert_eq!(
            restored.transform(&["run"]).unwrap(),
            f.transform(&["run"]).unwrap()
        );
    }

    #[test]
    fn test_from_params_rejects_unsorted_vocabulary() {
        let err = FittedNgramCounter::from_params(NgramParams {
            config: NgramConfig::default(),
            vocabulary: vec!["b".to_string(), "a".to_string()],
        })
        .unwrap_err();
        assert!(matches!(err, LexiglotError::InvalidParameter(_)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_seen_words_count_every_gram(words in prop::collection::vec("[a-z]{1,8}", 1..6)) {
                let f = NgramCounter::new().with_ngram_range(1, 2).fit(&words).unwrap();
                let counts = f.transform(&words).unwrap();
                prop_assert_eq!(counts.n_rows(), words.len());
                for (i, w) in words.iter().enumerate() {
                    let total: f64 = counts.row(i).iter().map(|(_, v)| v).sum();
                    let expected = w.len() + w.len().saturating_sub(1);
                    prop_assert_eq!(total, expected as f64);
                }
            }
        }
    }
}
