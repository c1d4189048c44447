//! Evaluation metrics for binary word classification.
//!
//! - **Confusion matrix**: counts of `(actual, predicted)` pairs, English positive.
//! - **Macro averages**: precision, recall and F1 computed per class and averaged,
//!   so both languages weigh the same regardless of support.
//! - **Normalized rates**: each confusion cell divided by its actual-class total.

use crate::error::{LexiglotError, Result};
use crate::Label;
use serde::{Deserialize, Serialize};

/// Confusion matrix for binary classification; label `1` is positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// English words classified as English.
    pub tp: usize,
    /// Croatian words classified as Croatian.
    pub tn: usize,
    /// Croatian words classified as English.
    pub fp: usize,
    /// English words classified as Croatian.
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally paired labels.
    ///
    /// # Errors
    /// Returns [`LexiglotError::Data`] if the slices differ in length.
    pub fn from_labels(actual: &[Label], predicted: &[Label]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(LexiglotError::Data(format!(
                "{} true labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        let mut cm = Self::new();
        for (&a, &p) in actual.iter().zip(predicted) {
            cm.record(a == 1, p == 1);
        }
        Ok(cm)
    }

    /// Record a prediction.
    pub fn record(&mut self, actual_english: bool, predicted_english: bool) {
        match (actual_english, predicted_english) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn actual_positive(&self) -> usize {
        self.tp + self.fn_
    }

    pub fn actual_negative(&self) -> usize {
        self.tn + self.fp
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Per-class `(precision, recall, f1)`, Croatian first.
    fn per_class(&self) -> [(f64, f64, f64); 2] {
        let score = |tp: usize, fp: usize, fn_: usize| {
            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            (precision, recall, f1)
        };
        [
            score(self.tn, self.fn_, self.fp),
            score(self.tp, self.fp, self.fn_),
        ]
    }

    /// Whether each class occurs among the actual or predicted labels,
    /// Croatian first.
    fn present(&self) -> [bool; 2] {
        [
            self.tn + self.fp + self.fn_ > 0,
            self.tp + self.fn_ + self.fp > 0,
        ]
    }

    /// Mean of one per-class score over the classes that occur.
    fn macro_average(&self, pick: impl Fn((f64, f64, f64)) -> f64) -> f64 {
        let (sum, n) = self
            .per_class()
            .into_iter()
            .zip(self.present())
            .filter(|(_, present)| *present)
            .fold((0.0, 0), |(sum, n), (scores, _)| (sum + pick(scores), n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    pub fn macro_precision(&self) -> f64 {
        self.macro_average(|s| s.0)
    }

    pub fn macro_recall(&self) -> f64 {
        self.macro_average(|s| s.1)
    }

    pub fn macro_f1(&self) -> f64 {
        self.macro_average(|s| s.2)
    }
}

/// `num / den`, or `0.0` for an empty denominator.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// One row of the performance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    /// Variant name, the row key.
    pub name: String,
    pub f1: f64,
    pub recall: f64,
    pub precision: f64,
    pub accuracy: f64,
    /// Share of Croatian words classified as English.
    pub false_positive: f64,
    /// Share of English words classified as Croatian.
    pub false_negative: f64,
    /// Share of English words classified as English.
    pub true_positive: f64,
    /// Share of Croatian words classified as Croatian.
    pub true_negative: f64,
}

impl ReportMetrics {
    pub fn from_confusion(name: impl Into<String>, cm: &ConfusionMatrix) -> Self {
        let neg = cm.actual_negative();
        let pos = cm.actual_positive();
        Self {
            name: name.into(),
            f1: cm.macro_f1(),
            recall: cm.macro_recall(),
            precision: cm.macro_precision(),
            accuracy: cm.accuracy(),
            false_positive: ratio(cm.fp, neg),
            false_negative: ratio(cm.fn_, pos),
            true_positive: ratio(cm.tp, pos),
            true_negative: ratio(cm.tn, neg),
        }
    }

    pub fn from_labels(
        name: impl Into<String>,
        actual: &[Label],
        predicted: &[Label],
    ) -> Result<Self> {
        let cm = ConfusionMatrix::from_labels(actual, predicted)?;
        Ok(Self::from_confusion(name, &cm))
    }

    /// Markdown table row, numbers to three decimals, newline-terminated.
    pub fn row(&self) -> String {
        format!(
            "|{}|{:.3}|{:.3}|{:.3}|{:.3}|{:.3}|{:.3}|{:.3}|{:.3}|\n",
            self.name,
            self.f1,
            self.recall,
            self.precision,
            self.accuracy,
            self.false_positive,
            self.false_negative,
            self.true_positive,
            self.true_negative
        )
    }
}
