//! Extractor + classifier pairs.
//!
//! [`WordPipeline`] owns an unfitted extractor and classifier and tracks its
//! phase at runtime, so asking an unfitted pipeline for predictions is an
//! error rather than a panic. Fitting produces a [`TrainedModel`], the
//! frozen pair that is persisted and served.

use crate::error::{LexiglotError, Result};
use crate::model::{
    Classifier, ClassifierParams, ClassifierSpec, FittedClassifier, InferenceModel,
};
use crate::preprocessing::{
    ExtractorParams, ExtractorSpec, FittedExtractor, FittedTransformer, Transformer,
};
use crate::serialization::SerializableParams;
use crate::Label;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Serializable parameters of a trained model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainedModelParams {
    pub extractor: ExtractorParams,
    pub classifier: ClassifierParams,
}

/// Fitted extractor and the classifier trained on its output.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainedModel {
    extractor: FittedExtractor,
    classifier: FittedClassifier,
}

impl TrainedModel {
    /// Pair a fitted extractor with a classifier of matching width.
    ///
    /// # Errors
    /// Returns [`LexiglotError::FeatureMismatch`] if the extractor's output
    /// width differs from the classifier's input width.
    pub fn new(extractor: FittedExtractor, classifier: FittedClassifier) -> Result<Self> {
        let produced = extractor.n_features_out();
        let expected = classifier.n_features_in();
        if produced != expected {
            return Err(LexiglotError::FeatureMismatch {
                expected,
                got: produced,
            });
        }
        Ok(Self {
            extractor,
            classifier,
        })
    }

    /// One label per word, in input order.
    pub fn predict<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<Label>> {
        let x = self.extractor.transform(words)?;
        self.classifier.predict_batch(&x)
    }

    pub fn extractor(&self) -> &FittedExtractor {
        &self.extractor
    }

    pub fn classifier(&self) -> &FittedClassifier {
        &self.classifier
    }

    pub fn extract_params(&self) -> TrainedModelParams {
        TrainedModelParams {
            extractor: self.extractor.extract_params(),
            classifier: self.classifier.extract_params(),
        }
    }

    pub fn from_params(params: TrainedModelParams) -> Result<Self> {
        Self::new(
            FittedExtractor::from_params(params.extractor)?,
            FittedClassifier::from_params(params.classifier)?,
        )
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.extract_params().to_bytes()?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_params(TrainedModelParams::from_bytes(bytes)?)
    }
}

/// Runtime fit state of a [`WordPipeline`].
#[derive(Clone, Debug, Default)]
pub enum Phase {
    #[default]
    Unfitted,
    Fitted(TrainedModel),
}

/// Unfitted extractor and classifier, fitted together on labeled words.
///
/// # Example
/// ```rust
/// use lexiglot::model::{ClassifierSpec, KnnClassifier};
/// use lexiglot::pipeline::WordPipeline;
/// use lexiglot::preprocessing::ExtractorSpec;
///
/// let mut pipeline = WordPipeline::new(
///     ExtractorSpec::ngram(1, 2),
///     ClassifierSpec::Knn(KnnClassifier::new().with_k(1)),
/// );
/// assert!(pipeline.predict(&["kuća"]).is_err());
///
/// pipeline.fit(&["house", "kuća", "tree", "grad"], &[1, 0, 1, 0]).unwrap();
/// assert_eq!(pipeline.predict(&["house"]).unwrap(), vec![1]);
/// ```
#[derive(Clone, Debug)]
pub struct WordPipeline {
    extractor: ExtractorSpec,
    classifier: ClassifierSpec,
    phase: Phase,
}

impl WordPipeline {
    pub fn new(extractor: ExtractorSpec, classifier: ClassifierSpec) -> Self {
        Self {
            extractor,
            classifier,
            phase: Phase::Unfitted,
        }
    }

    pub fn extractor(&self) -> &ExtractorSpec {
        &self.extractor
    }

    pub fn classifier(&self) -> &ClassifierSpec {
        &self.classifier
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.phase, Phase::Fitted(_))
    }

    /// Fit the extractor on `words`, then the classifier on its output.
    ///
    /// Refitting discards the previous fit.
    pub fn fit<S: AsRef<str>>(&mut self, words: &[S], labels: &[Label]) -> Result<&TrainedModel> {
        if words.len() != labels.len() {
            return Err(LexiglotError::Data(format!(
                "{} words but {} labels",
                words.len(),
                labels.len()
            )));
        }
        self.phase = Phase::Unfitted;
        let extractor = self.extractor.fit(words)?;
        let x = extractor.transform(words)?;
        debug!(
            rows = x.n_rows(),
            cols = x.n_cols(),
            sparse = x.is_sparse(),
            "extracted training features"
        );
        let classifier = self.classifier.fit(&x, labels)?;
        self.phase = Phase::Fitted(TrainedModel::new(extractor, classifier)?);
        self.trained()
    }

    /// The trained model, if fitted.
    pub fn trained(&self) -> Result<&TrainedModel> {
        match &self.phase {
            Phase::Fitted(model) => Ok(model),
            Phase::Unfitted => Err(LexiglotError::NotFitted("WordPipeline")),
        }
    }

    /// One label per word, in input order.
    ///
    /// # Errors
    /// Returns [`LexiglotError::NotFitted`] before a successful `fit`.
    pub fn predict<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<Label>> {
        self.trained()?.predict(words)
    }

    /// Consume the pipeline, keeping only the trained model.
    pub fn into_trained(self) -> Result<TrainedModel> {
        match self.phase {
            Phase::Fitted(model) => Ok(model),
            Phase::Unfitted => Err(LexiglotError::NotFitted("WordPipeline")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdaBoostClassifier, Kernel, SvcClassifier};

    const WORDS: [&str; 8] = [
        "house", "kuća", "window", "prozor", "yellow", "žuto", "quick", "brzo",
    ];
    const LABELS: [Label; 8] = [1, 0, 1, 0, 1, 0, 1, 0];

    fn svc_pipeline() -> WordPipeline {
        WordPipeline::new(
            ExtractorSpec::ngram(1, 2),
            ClassifierSpec::Svc(SvcClassifier::new().with_kernel(Kernel::Linear)),
        )
    }

    #[test]
    fn test_unfitted_predict_fails() {
        let p = svc_pipeline();
        assert!(!p.is_fitted());
        assert!(matches!(
            p.predict(&["house"]),
            Err(LexiglotError::NotFitted("WordPipeline"))
        ));
        assert!(p.into_trained().is_err());
    }

    #[test]
    fn test_fit_then_predict_training_words() {
        let mut p = svc_pipeline();
        p.fit(&WORDS, &LABELS).unwrap();
        assert!(p.is_fitted());
        assert_eq!(p.predict(&WORDS).unwrap(), LABELS.to_vec());
    }

    #[test]
    fn test_predict_empty_batch() {
        let mut p = svc_pipeline();
        p.fit(&WORDS, &LABELS).unwrap();
        let empty: [&str; 0] = [];
        assert!(p.predict(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_failed_refit_leaves_pipeline_unfitted() {
        let mut p = svc_pipeline();
        p.fit(&WORDS, &LABELS).unwrap();
        assert!(p.fit(&["a", "b"], &[1, 1]).is_err());
        assert!(!p.is_fitted());
    }

    #[test]
    fn test_bytes_roundtrip_preserves_predictions() {
        let mut p = WordPipeline::new(
            ExtractorSpec::fused(1, 2),
            ClassifierSpec::AdaBoost(AdaBoostClassifier::new().with_n_estimators(5)),
        );
        p.fit(&WORDS, &LABELS).unwrap();
        let model = p.into_trained().unwrap();
        let restored = TrainedModel::from_bytes(&model.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, model);
        let queries = ["kuća", "yellow", "zzz", ""];
        assert_eq!(restored.predict(&queries).unwrap(), model.predict(&queries).unwrap());
    }

    #[test]
    fn test_mismatched_pair_rejected() {
        let mut a = svc_pipeline();
        a.fit(&WORDS, &LABELS).unwrap();
        let mut b = WordPipeline::new(
            ExtractorSpec::linguistic(),
            ClassifierSpec::Svc(SvcClassifier::new()),
        );
        b.fit(&WORDS, &LABELS).unwrap();
        let err = TrainedModel::new(
            a.trained().unwrap().extractor().clone(),
            b.trained().unwrap().classifier().clone(),
        )
        .unwrap_err();
        assert!(matches!(err, LexiglotError::FeatureMismatch { expected: 9, .. }));
    }
}
