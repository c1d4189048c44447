//! k-nearest-neighbours over euclidean distance.

use crate::error::{LexiglotError, Result};
use crate::matrix::{FeatureMatrix, Row};
use crate::model::{validate_training_data, Classifier, InferenceModel};
use crate::Label;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Neighbour vote weighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnnWeights {
    /// Every neighbour counts once.
    Uniform,
    /// Neighbours count `1 / distance`; exact matches, if any, outvote everything.
    Distance,
}

/// Configuration for [`KnnClassifier`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnnConfig {
    pub k: usize,
    pub weights: KnnWeights,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            k: 5,
            weights: KnnWeights::Uniform,
        }
    }
}

/// k-NN classifier (unfitted).
#[derive(Clone, Debug, Default)]
pub struct KnnClassifier {
    config: KnnConfig,
}

impl KnnClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.config.k = k;
        self
    }

    pub fn with_weights(mut self, weights: KnnWeights) -> Self {
        self.config.weights = weights;
        self
    }

    pub fn config(&self) -> &KnnConfig {
        &self.config
    }
}

impl Classifier for KnnClassifier {
    type Params = KnnParams;
    type Fitted = KnnModel;

    fn fit(&self, x: &FeatureMatrix, y: &[Label]) -> Result<Self::Fitted> {
        if self.config.k == 0 {
            return Err(LexiglotError::InvalidParameter(
                "k must be at least 1".to_string(),
            ));
        }
        validate_training_data(x, y)?;
        if x.n_rows() < self.config.k {
            return Err(LexiglotError::Data(format!(
                "k={} neighbours requested but only {} training samples",
                self.config.k,
                x.n_rows()
            )));
        }
        debug!(samples = x.n_rows(), k = self.config.k, "fitted k-NN");
        Ok(KnnModel {
            config: self.config.clone(),
            train: x.clone(),
            labels: y.to_vec(),
        })
    }
}

/// Serializable parameters: the training set itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnnParams {
    pub config: KnnConfig,
    pub train: FeatureMatrix,
    pub labels: Vec<Label>,
}

/// Fitted k-NN model.
#[derive(Clone, Debug, PartialEq)]
pub struct KnnModel {
    config: KnnConfig,
    train: FeatureMatrix,
    labels: Vec<Label>,
}

impl KnnModel {
    /// The `k` nearest training rows as `(distance, index)`, nearest first;
    /// equal distances keep training order.
    pub fn neighbours(&self, row: &Row<'_>) -> Vec<(f64, usize)> {
        let mut dist: Vec<(f64, usize)> = self
            .train
            .rows()
            .enumerate()
            .map(|(i, t)| (t.squared_distance(row).sqrt(), i))
            .collect();
        let k = self.config.k.min(dist.len());
        if k < dist.len() {
            dist.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            dist.truncate(k);
        }
        dist.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        dist
    }

    /// Vote mass per class.
    fn votes(&self, row: &Row<'_>) -> [f64; 2] {
        let neighbours = self.neighbours(row);
        let mut votes = [0.0; 2];
        match self.config.weights {
            KnnWeights::Uniform => {
                for &(_, i) in &neighbours {
                    votes[self.labels[i] as usize] += 1.0;
                }
            }
            KnnWeights::Distance => {
                let exact: Vec<usize> = neighbours
                    .iter()
                    .filter(|(d, _)| *d == 0.0)
                    .map(|&(_, i)| i)
                    .collect();
                if exact.is_empty() {
                    for &(d, i) in &neighbours {
                        votes[self.labels[i] as usize] += 1.0 / d;
                    }
                } else {
                    for i in exact {
                        votes[self.labels[i] as usize] += 1.0;
                    }
                }
            }
        }
        votes
    }
}

impl InferenceModel for KnnModel {
    type Params = KnnParams;

    /// Ties go to label 0.
    fn predict(&self, row: &Row<'_>) -> Label {
        let votes = self.votes(row);
        if votes[1] > votes[0] {
            1
        } else {
            0
        }
    }

    fn n_features_in(&self) -> usize {
        self.train.n_cols()
    }

    fn extract_params(&self) -> Self::Params {
        KnnParams {
            config: self.config.clone(),
            train: self.train.clone(),
            labels: self.labels.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if params.train.n_rows() != params.labels.len() {
            return Err(LexiglotError::InvalidParameter(format!(
                "{} training rows but {} labels",
                params.train.n_rows(),
                params.labels.len()
            )));
        }
        if params.config.k == 0 || params.config.k > params.labels.len() {
            return Err(LexiglotError::InvalidParameter(format!(
                "k={} invalid for {} training samples",
                params.config.k,
                params.labels.len()
            )));
        }
        Ok(Self {
            config: params.config,
            train: params.train,
            labels: params.labels,
        })
    }
}
