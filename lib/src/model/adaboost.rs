//! AdaBoost (SAMME) over depth-one decision stumps.
//!
//! Each round fits the stump with the lowest weighted error, weighs it by
//! `ln((1 - err) / err)` and up-weights the samples it got wrong. Boosting
//! stops early on a perfect stump (kept with weight 1) or on a stump no
//! better than chance (discarded).

use crate::error::{LexiglotError, Result};
use crate::matrix::{FeatureMatrix, Row};
use crate::model::{signed, validate_training_data, Classifier, InferenceModel};
use crate::Label;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for [`AdaBoostClassifier`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaBoostConfig {
    /// Maximum number of boosting rounds.
    pub n_estimators: usize,
}

impl Default for AdaBoostConfig {
    fn default() -> Self {
        Self { n_estimators: 50 }
    }
}

/// AdaBoost classifier (unfitted).
#[derive(Clone, Debug, Default)]
pub struct AdaBoostClassifier {
    config: AdaBoostConfig,
}

impl AdaBoostClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.config.n_estimators = n_estimators;
        self
    }

    pub fn config(&self) -> &AdaBoostConfig {
        &self.config
    }
}

/// Depth-one tree: `x[feature] <= threshold` goes left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    pub feature: usize,
    pub threshold: f64,
    pub left: Label,
    pub right: Label,
}

impl Stump {
    /// A stump that always answers `label`.
    fn constant(label: Label) -> Self {
        Self {
            feature: 0,
            threshold: f64::INFINITY,
            left: label,
            right: label,
        }
    }

    pub fn predict(&self, row: &Row<'_>) -> Label {
        if row.get(self.feature) <= self.threshold {
            self.left
        } else {
            self.right
        }
    }
}

/// Columns of the training matrix, non-zeros sorted by value.
struct SortedColumns {
    n_rows: usize,
    columns: Vec<Vec<(usize, f64)>>,
}

impl SortedColumns {
    fn new(x: &FeatureMatrix) -> Self {
        let mut columns = x.column_nonzeros();
        for col in &mut columns {
            col.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        }
        Self {
            n_rows: x.n_rows(),
            columns,
        }
    }

    /// Distinct values of column `j` in increasing order with the class
    /// weights at each value; implicit zeros form their own group.
    fn groups(
        &self,
        j: usize,
        weights: &[f64],
        y: &[Label],
        totals: [f64; 2],
    ) -> Vec<(f64, [f64; 2])> {
        let col = &self.columns[j];
        let mut nonzero = [0.0; 2];
        for &(i, _) in col {
            nonzero[y[i] as usize] += weights[i];
        }
        let zeros = [
            (totals[0] - nonzero[0]).max(0.0),
            (totals[1] - nonzero[1]).max(0.0),
        ];
        let has_zeros = col.len() < self.n_rows;

        let mut groups: Vec<(f64, [f64; 2])> = Vec::new();
        let mut push = |value: f64, w: [f64; 2]| match groups.last_mut() {
            Some((v, acc)) if *v == value => {
                acc[0] += w[0];
                acc[1] += w[1];
            }
            _ => groups.push((value, w)),
        };
        let mut zeros_pending = has_zeros;
        for &(i, v) in col {
            if zeros_pending && v > 0.0 {
                push(0.0, zeros);
                zeros_pending = false;
            }
            let mut w = [0.0; 2];
            w[y[i] as usize] = weights[i];
            push(v, w);
        }
        if zeros_pending {
            push(0.0, zeros);
        }
        groups
    }

    /// Stump with the lowest weighted error; ties keep the earliest column
    /// and threshold.
    fn best_stump(&self, weights: &[f64], y: &[Label]) -> Stump {
        let mut totals = [0.0; 2];
        for (w, &l) in weights.iter().zip(y) {
            totals[l as usize] += w;
        }
        let majority = if totals[1] > totals[0] { 1 } else { 0 };
        let mut best = Stump::constant(majority);
        let mut best_err = totals[0].min(totals[1]);

        for j in 0..self.columns.len() {
            let groups = self.groups(j, weights, y, totals);
            let mut left = [0.0; 2];
            for pair in groups.windows(2) {
                let (value, w) = pair[0];
                left[0] += w[0];
                left[1] += w[1];
                let right = [totals[0] - left[0], totals[1] - left[1]];
                let err = left[0].min(left[1]) + right[0].min(right[1]);
                if err < best_err - 1e-12 {
                    best_err = err;
                    best = Stump {
                        feature: j,
                        threshold: (value + pair[1].0) / 2.0,
                        left: if left[1] > left[0] { 1 } else { 0 },
                        right: if right[1] > right[0] { 1 } else { 0 },
                    };
                }
            }
        }
        best
    }
}

impl Classifier for AdaBoostClassifier {
    type Params = AdaBoostParams;
    type Fitted = AdaBoostModel;

    fn fit(&self, x: &FeatureMatrix, y: &[Label]) -> Result<Self::Fitted> {
        if self.config.n_estimators == 0 {
            return Err(LexiglotError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        validate_training_data(x, y)?;

        let n = x.n_rows();
        let sorted = SortedColumns::new(x);
        let mut weights = vec![1.0 / n as f64; n];
        let mut stumps = Vec::new();
        let mut alphas = Vec::new();

        for _ in 0..self.config.n_estimators {
            let stump = sorted.best_stump(&weights, y);
            let wrong: Vec<bool> = (0..n).map(|i| stump.predict(&x.row(i)) != y[i]).collect();
            let total: f64 = weights.iter().sum();
            let err = wrong
                .iter()
                .zip(&weights)
                .filter(|(w, _)| **w)
                .map(|(_, &w)| w)
                .sum::<f64>()
                / total;

            if err <= 0.0 {
                stumps.push(stump);
                alphas.push(1.0);
                break;
            }
            if err >= 0.5 {
                if stumps.is_empty() {
                    return Err(LexiglotError::Data(
                        "first boosting round is no better than chance".to_string(),
                    ));
                }
                break;
            }

            let alpha = ((1.0 - err) / err).ln();
            let boost = alpha.exp();
            for (w, &miss) in weights.iter_mut().zip(&wrong) {
                if miss {
                    *w *= boost;
                }
            }
            let total: f64 = weights.iter().sum();
            for w in &mut weights {
                *w /= total;
            }
            stumps.push(stump);
            alphas.push(alpha);
        }

        debug!(rounds = stumps.len(), "fitted AdaBoost");
        Ok(AdaBoostModel {
            stumps,
            alphas,
            n_features: x.n_cols(),
        })
    }
}

/// Serializable parameters for a fitted AdaBoost ensemble.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaBoostParams {
    pub stumps: Vec<Stump>,
    pub alphas: Vec<f64>,
    pub n_features: usize,
}

/// Fitted AdaBoost ensemble.
#[derive(Clone, Debug, PartialEq)]
pub struct AdaBoostModel {
    stumps: Vec<Stump>,
    alphas: Vec<f64>,
    n_features: usize,
}

impl AdaBoostModel {
    pub fn stumps(&self) -> &[Stump] {
        &self.stumps
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    /// Weighted vote; positive means English.
    pub fn decision_function(&self, row: &Row<'_>) -> f64 {
        self.stumps
            .iter()
            .zip(&self.alphas)
            .map(|(s, a)| a * signed(s.predict(row)))
            .sum()
    }
}

impl InferenceModel for AdaBoostModel {
    type Params = AdaBoostParams;

    fn predict(&self, row: &Row<'_>) -> Label {
        if self.decision_function(row) > 0.0 {
            1
        } else {
            0
        }
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }

    fn extract_params(&self) -> Self::Params {
        AdaBoostParams {
            stumps: self.stumps.clone(),
            alphas: self.alphas.clone(),
            n_features: self.n_features,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.stumps.is_empty() || params.stumps.len() != params.alphas.len() {
            return Err(LexiglotError::InvalidParameter(format!(
                "{} stumps with {} weights",
                params.stumps.len(),
                params.alphas.len()
            )));
        }
        Ok(Self {
            stumps: params.stumps,
            alphas: params.alphas,
            n_features: params.n_features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{CsrMatrix, DenseMatrix};
    use crate::model::test_support::{separable_dense, separable_sparse};

    #[test]
    fn test_perfect_stump_stops_early() {
        let (x, y) = separable_dense();
        let model = AdaBoostClassifier::new()
            .with_n_estimators(10)
            .fit(&x, &y)
            .unwrap();
        assert_eq!(model.stumps().len(), 1);
        assert_eq!(model.alphas(), &[1.0]);
        assert_eq!(model.predict_batch(&x).unwrap(), y);
    }

    #[test]
    fn test_threshold_is_midpoint() {
        let x: FeatureMatrix = DenseMatrix::new(vec![1.0, 2.0, 4.0, 6.0], 4, 1)
            .unwrap()
            .into();
        let model = AdaBoostClassifier::new().fit(&x, &[0, 0, 1, 1]).unwrap();
        let stump = model.stumps()[0];
        assert_eq!(stump.threshold, 3.0);
        assert_eq!((stump.left, stump.right), (0, 1));
    }

    #[test]
    fn test_sparse_split_uses_implicit_zeros() {
        let (x, y) = separable_sparse();
        let model = AdaBoostClassifier::new().fit(&x, &y).unwrap();
        assert_eq!(model.predict_batch(&x).unwrap(), y);
        let stump = model.stumps()[0];
        assert!(stump.feature < 2);
        assert!(stump.threshold > 0.0 && stump.threshold < 1.0);
    }

    #[test]
    fn test_negative_values_sort_before_zeros() {
        let x: FeatureMatrix = CsrMatrix::from_rows(
            vec![vec![(0, -2.0)], vec![(0, -1.0)], vec![], vec![(0, 3.0)]],
            1,
        )
        .unwrap()
        .into();
        let model = AdaBoostClassifier::new().fit(&x, &[1, 1, 0, 0]).unwrap();
        let stump = model.stumps()[0];
        assert_eq!(stump.threshold, -0.5);
        assert_eq!((stump.left, stump.right), (1, 0));
    }

    #[test]
    fn test_boosting_combines_stumps() {
        // label is 1 exactly when both features are positive
        let x: FeatureMatrix = DenseMatrix::new(
            vec![
                1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0, -1.0, 2.0, 2.0, 2.0, -2.0, -2.0,
                2.0,
            ],
            8,
            2,
        )
        .unwrap()
        .into();
        let y = vec![1, 1, 0, 0, 0, 1, 0, 0];
        let model = AdaBoostClassifier::new()
            .with_n_estimators(3)
            .fit(&x, &y)
            .unwrap();
        assert_eq!(model.stumps().len(), 3);
        assert_eq!(model.predict_batch(&x).unwrap(), y);
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = separable_dense();
        let err = AdaBoostClassifier::new()
            .with_n_estimators(0)
            .fit(&x, &y)
            .unwrap_err();
        assert!(matches!(err, LexiglotError::InvalidParameter(_)));
    }

    #[test]
    fn test_uninformative_features_fail() {
        let x: FeatureMatrix = DenseMatrix::zeros(4, 2).into();
        let err = AdaBoostClassifier::new().fit(&x, &[0, 1, 0, 1]).unwrap_err();
        assert!(matches!(err, LexiglotError::Data(_)));
    }

    #[test]
    fn test_params_roundtrip() {
        let (x, y) = separable_sparse();
        let model = AdaBoostClassifier::new().fit(&x, &y).unwrap();
        let restored = AdaBoostModel::from_params(model.extract_params()).unwrap();
        assert_eq!(restored, model);
    }
}
