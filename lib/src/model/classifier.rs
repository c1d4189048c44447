//! Runtime choice of classifier.

use crate::error::Result;
use crate::matrix::{FeatureMatrix, Row};
use crate::model::adaboost::{AdaBoostClassifier, AdaBoostModel, AdaBoostParams};
use crate::model::knn::{KnnClassifier, KnnModel, KnnParams};
use crate::model::svm::{SvcClassifier, SvcModel, SvcParams};
use crate::model::{Classifier, InferenceModel};
use crate::Label;
use serde::{Deserialize, Serialize};

/// Unfitted classifier of any family.
#[derive(Clone, Debug)]
pub enum ClassifierSpec {
    Svc(SvcClassifier),
    AdaBoost(AdaBoostClassifier),
    Knn(KnnClassifier),
}

impl ClassifierSpec {
    /// Short human-readable description, used in logs.
    pub fn describe(&self) -> String {
        match self {
            ClassifierSpec::Svc(s) => format!("svc(C={}, {:?})", s.config().c, s.config().kernel),
            ClassifierSpec::AdaBoost(a) => format!("adaboost({})", a.config().n_estimators),
            ClassifierSpec::Knn(k) => format!("knn(k={}, {:?})", k.config().k, k.config().weights),
        }
    }

    /// Reseed the stochastic parts, if any.
    pub fn with_seed(self, seed: u64) -> Self {
        match self {
            ClassifierSpec::Svc(s) => ClassifierSpec::Svc(s.with_seed(seed)),
            other => other,
        }
    }
}

impl Classifier for ClassifierSpec {
    type Params = ClassifierParams;
    type Fitted = FittedClassifier;

    fn fit(&self, x: &FeatureMatrix, y: &[Label]) -> Result<Self::Fitted> {
        Ok(match self {
            ClassifierSpec::Svc(c) => FittedClassifier::Svc(c.fit(x, y)?),
            ClassifierSpec::AdaBoost(c) => FittedClassifier::AdaBoost(c.fit(x, y)?),
            ClassifierSpec::Knn(c) => FittedClassifier::Knn(c.fit(x, y)?),
        })
    }
}

/// Serializable parameters of a fitted classifier of any family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClassifierParams {
    Svc(SvcParams),
    AdaBoost(AdaBoostParams),
    Knn(KnnParams),
}

/// Fitted classifier of any family.
#[derive(Clone, Debug, PartialEq)]
pub enum FittedClassifier {
    Svc(SvcModel),
    AdaBoost(AdaBoostModel),
    Knn(KnnModel),
}

impl InferenceModel for FittedClassifier {
    type Params = ClassifierParams;

    fn predict(&self, row: &Row<'_>) -> Label {
        match self {
            FittedClassifier::Svc(m) => m.predict(row),
            FittedClassifier::AdaBoost(m) => m.predict(row),
            FittedClassifier::Knn(m) => m.predict(row),
        }
    }

    fn n_features_in(&self) -> usize {
        match self {
            FittedClassifier::Svc(m) => m.n_features_in(),
            FittedClassifier::AdaBoost(m) => m.n_features_in(),
            FittedClassifier::Knn(m) => m.n_features_in(),
        }
    }

    fn extract_params(&self) -> Self::Params {
        match self {
            FittedClassifier::Svc(m) => ClassifierParams::Svc(m.extract_params()),
            FittedClassifier::AdaBoost(m) => ClassifierParams::AdaBoost(m.extract_params()),
            FittedClassifier::Knn(m) => ClassifierParams::Knn(m.extract_params()),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(match params {
            ClassifierParams::Svc(p) => FittedClassifier::Svc(SvcModel::from_params(p)?),
            ClassifierParams::AdaBoost(p) => {
                FittedClassifier::AdaBoost(AdaBoostModel::from_params(p)?)
            }
            ClassifierParams::Knn(p) => FittedClassifier::Knn(KnnModel::from_params(p)?),
        })
    }
}
