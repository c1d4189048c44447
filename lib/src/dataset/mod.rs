//! Labeled word datasets.
//!
//! The on-disk format is CSV with a header row followed by `word,label`
//! records, where `label` is `1` for English and `0` for Croatian.
//!
//! # Example
//!
//! ```rust
//! use lexiglot::dataset::LabeledWords;
//!
//! let csv = "word,label\nhouse,1\nkuća,0\ntree,1\ngrad,0\n";
//! let data = LabeledWords::from_reader(csv.as_bytes()).unwrap();
//! assert_eq!(data.len(), 4);
//!
//! let (train, test) = data.split(0.5, 42).unwrap();
//! assert_eq!(train.len() + test.len(), 4);
//! ```

use crate::error::{LexiglotError, Result};
use crate::Label;
use csv::ReaderBuilder;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Default fraction of samples held out for evaluation.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Default seed for the train/test split.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Words with one label each.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabeledWords {
    pub words: Vec<String>,
    pub labels: Vec<Label>,
}

impl LabeledWords {
    /// Pair up words and labels.
    ///
    /// # Errors
    /// Returns [`LexiglotError::Data`] if the lengths differ.
    pub fn new(words: Vec<String>, labels: Vec<Label>) -> Result<Self> {
        if words.len() != labels.len() {
            return Err(LexiglotError::Data(format!(
                "{} words but {} labels",
                words.len(),
                labels.len()
            )));
        }
        Ok(Self { words, labels })
    }

    /// Load from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let data = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.as_ref().display(),
            samples = data.len(),
            "loaded dataset"
        );
        Ok(data)
    }

    /// Load from any CSV source; the first row is a header.
    ///
    /// # Errors
    /// Returns [`LexiglotError::Data`] naming the line for a record the CSV
    /// reader rejects (e.g. invalid UTF-8), a record without exactly two
    /// fields, or a label other than `0`/`1`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut words = Vec::new();
        let mut labels = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                if e.is_io_error() {
                    return LexiglotError::Csv(e);
                }
                let line = e.position().map_or(0, |p| p.line());
                LexiglotError::Data(format!("line {line}: malformed record: {e}"))
            })?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() != 2 {
                return Err(LexiglotError::Data(format!(
                    "line {line}: expected 2 fields (word,label), got {}",
                    record.len()
                )));
            }
            let raw = record[1].trim();
            let label: i64 = raw.parse().map_err(|_| {
                LexiglotError::Data(format!("line {line}: label {raw:?} is not an integer"))
            })?;
            if !(label == 0 || label == 1) {
                return Err(LexiglotError::Data(format!(
                    "line {line}: label must be 0 or 1, got {label}"
                )));
            }
            words.push(record[0].to_string());
            labels.push(label as Label);
        }
        Ok(Self { words, labels })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of samples per label.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for &l in &self.labels {
            counts[usize::from(l.min(1))] += 1;
        }
        counts
    }

    /// Keep only the given samples, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            words: indices.iter().map(|&i| self.words[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Append another dataset after this one.
    pub fn concat(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.words.extend_from_slice(&other.words);
        out.labels.extend_from_slice(&other.labels);
        out
    }

    /// Stratified, seeded split into `(train, test)`.
    ///
    /// Each class contributes `round(count * test_size)` samples to the test
    /// side; both sides are shuffled.
    ///
    /// # Errors
    /// Returns [`LexiglotError::InvalidParameter`] unless `0 < test_size < 1`,
    /// and [`LexiglotError::Data`] if either side would be empty.
    pub fn split(&self, test_size: f64, seed: u64) -> Result<(Self, Self)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(LexiglotError::InvalidParameter(format!(
                "test_size must be in (0, 1), got {test_size}"
            )));
        }

        let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (i, &l) in self.labels.iter().enumerate() {
            by_class[usize::from(l.min(1))].push(i);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut train = Vec::with_capacity(self.len());
        let mut test = Vec::new();
        for class in &mut by_class {
            class.shuffle(&mut rng);
            let n_test = (class.len() as f64 * test_size).round() as usize;
            test.extend_from_slice(&class[..n_test]);
            train.extend_from_slice(&class[n_test..]);
        }
        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        if train.is_empty() || test.is_empty() {
            return Err(LexiglotError::Data(format!(
                "split of {} samples at test_size={test_size} leaves an empty side",
                self.len()
            )));
        }
        debug!(train = train.len(), test = test.len(), seed, "split dataset");
        Ok((self.subset(&train), self.subset(&test)))
    }
}
