//! Train / evaluate / report / persist loop over the model catalogue.
//!
//! For each variant, in catalogue order:
//! 1. a fresh pipeline is fitted on the train split and scored on the test split;
//! 2. the report row for the variant is computed;
//! 3. a second fresh pipeline is fitted on train and test together;
//! 4. the model and the updated report are written.
//!
//! The updated report is staged on disk before the model is saved, and the
//! stage is renamed into place last. A failure in fitting, scoring or
//! staging the report leaves both the report and the model store untouched.

use crate::dataset::{LabeledWords, DEFAULT_SPLIT_SEED, DEFAULT_TEST_SIZE};
use crate::error::Result;
use crate::metrics::ReportMetrics;
use crate::persistence::{FileModelStore, ModelStore};
use crate::registry::{ModelRegistry, ModelVariant};
use crate::report::PerformanceReport;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span};

/// Settings for a full training run.
///
/// Defaults:
/// - `data_path`: `data/data.csv`
/// - `model_dir`: `models`
/// - `report_path`: `README.md`
/// - `test_size`: 0.2
/// - `seed`: 42
/// - `variants`: the whole catalogue
#[derive(Clone, Debug, PartialEq)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub model_dir: PathBuf,
    pub report_path: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    pub variants: Vec<ModelVariant>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/data.csv"),
            model_dir: PathBuf::from("models"),
            report_path: PathBuf::from("README.md"),
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SPLIT_SEED,
            variants: ModelVariant::all().to_vec(),
        }
    }
}

impl TrainConfig {
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Restrict the run to `variants`; they still run in catalogue order.
    pub fn with_variants(mut self, variants: Vec<ModelVariant>) -> Self {
        self.variants = variants;
        self
    }
}

/// What one variant achieved.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantOutcome {
    pub variant: ModelVariant,
    pub metrics: ReportMetrics,
    pub elapsed: Duration,
}

/// Drives variants through evaluation, reporting and persistence.
pub struct TrainEvaluateLoop<S: ModelStore> {
    registry: ModelRegistry,
    store: S,
    report: PerformanceReport,
}

impl<S: ModelStore> TrainEvaluateLoop<S> {
    pub fn new(registry: ModelRegistry, store: S, report: PerformanceReport) -> Self {
        Self {
            registry,
            store,
            report,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `variants` (catalogue order, duplicates ignored).
    ///
    /// # Errors
    /// Stops at the first failing variant with
    /// [`LexiglotError::VariantFailed`](crate::error::LexiglotError::VariantFailed);
    /// variants before it stay committed.
    pub fn run(
        &self,
        train: &LabeledWords,
        test: &LabeledWords,
        variants: &[ModelVariant],
    ) -> Result<Vec<VariantOutcome>> {
        let selected: Vec<ModelVariant> = ModelVariant::all()
            .iter()
            .copied()
            .filter(|v| variants.contains(v))
            .collect();
        info!(
            variants = selected.len(),
            train = train.len(),
            test = test.len(),
            "starting training run"
        );

        let mut outcomes = Vec::with_capacity(selected.len());
        for variant in selected {
            let outcome = self
                .run_variant(variant, train, test)
                .map_err(|e| e.for_variant(variant.name()))?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Evaluate, refit on all data, then persist one variant.
    pub fn run_variant(
        &self,
        variant: ModelVariant,
        train: &LabeledWords,
        test: &LabeledWords,
    ) -> Result<VariantOutcome> {
        let span = info_span!("variant", name = variant.name());
        let _guard = span.enter();
        let started = Instant::now();

        let metrics = self.evaluate(variant, train, test)?;
        info!(
            f1 = metrics.f1,
            accuracy = metrics.accuracy,
            "evaluated on held-out split"
        );

        let all = train.concat(test);
        let mut pipeline = self.registry.new_pipeline(variant);
        pipeline.fit(&all.words, &all.labels)?;
        let model = pipeline.into_trained()?;
        debug!(samples = all.len(), "refitted on all data");

        let staged_report = self.report.prepare(&metrics)?;
        self.store.save(&model, variant.name())?;
        staged_report.commit()?;

        let elapsed = started.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "variant committed");
        Ok(VariantOutcome {
            variant,
            metrics,
            elapsed,
        })
    }

    /// Fit a fresh pipeline on `train` and score it on `test`.
    pub fn evaluate(
        &self,
        variant: ModelVariant,
        train: &LabeledWords,
        test: &LabeledWords,
    ) -> Result<ReportMetrics> {
        let mut pipeline = self.registry.new_pipeline(variant);
        pipeline.fit(&train.words, &train.labels)?;
        let predicted = pipeline.predict(&test.words)?;
        ReportMetrics::from_labels(variant.name(), &test.labels, &predicted)
    }
}

/// Load the dataset, split it and run the configured variants against files
/// on disk.
pub fn train_all(config: &TrainConfig) -> Result<Vec<VariantOutcome>> {
    let data = LabeledWords::from_csv_path(&config.data_path)?;
    let (train, test) = data.split(config.test_size, config.seed)?;
    let training = TrainEvaluateLoop::new(
        ModelRegistry::new().with_seed(config.seed),
        FileModelStore::new(&config.model_dir),
        PerformanceReport::new(&config.report_path),
    );
    training.run(&train, &test, &config.variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexiglotError;
    use crate::persistence::MemoryModelStore;

    fn words() -> LabeledWords {
        let english = [
            "house", "window", "yellow", "quick", "running", "water", "bottle", "swimming",
            "weekly", "happy", "sixty", "wax",
        ];
        let croatian = [
            "kuća", "prozor", "žuto", "brzo", "trčanje", "voda", "boca", "plivanje", "tjedno",
            "sretan", "šezdeset", "vosak",
        ];
        let mut w = Vec::new();
        let mut l = Vec::new();
        for (e, c) in english.iter().zip(croatian.iter()) {
            w.push(e.to_string());
            l.push(1);
            w.push(c.to_string());
            l.push(0);
        }
        LabeledWords::new(w, l).unwrap()
    }

    fn temp_report(name: &str) -> PerformanceReport {
        let path = std::env::temp_dir().join(name);
        std::fs::remove_file(&path).ok();
        PerformanceReport::new(path)
    }

    #[test]
    fn test_run_commits_model_and_report_row() {
        let report = temp_report("lexiglot_trainer_commit.md");
        let training =
            TrainEvaluateLoop::new(ModelRegistry::new(), MemoryModelStore::new(), report.clone());
        let (train, test) = words().split(0.25, 42).unwrap();

        let outcomes = training
            .run(&train, &test, &[ModelVariant::NgramAdaBoost, ModelVariant::NgramSvc])
            .unwrap();
        let order: Vec<ModelVariant> = outcomes.iter().map(|o| o.variant).collect();
        assert_eq!(order, vec![ModelVariant::NgramSvc, ModelVariant::NgramAdaBoost]);

        assert_eq!(training.store().names(), vec!["NGRAM_ADABOOST", "NGRAM_SVC"]);
        let text = std::fs::read_to_string(report.path()).unwrap();
        assert_eq!(text.matches("|NGRAM_SVC|").count(), 1);
        assert_eq!(text.matches("|NGRAM_ADABOOST|").count(), 1);

        for o in &outcomes {
            assert!((0.0..=1.0).contains(&o.metrics.accuracy));
            assert!((o.metrics.true_positive + o.metrics.false_negative - 1.0).abs() < 1e-9);
        }
        std::fs::remove_file(report.path()).ok();
    }

    #[test]
    fn test_rerun_keeps_one_row_per_variant() {
        let report = temp_report("lexiglot_trainer_rerun.md");
        let training =
            TrainEvaluateLoop::new(ModelRegistry::new(), MemoryModelStore::new(), report.clone());
        let (train, test) = words().split(0.25, 42).unwrap();
        let variants = [ModelVariant::NgramKnn];
        training.run(&train, &test, &variants).unwrap();
        let first = std::fs::read_to_string(report.path()).unwrap();
        training.run(&train, &test, &variants).unwrap();
        let second = std::fs::read_to_string(report.path()).unwrap();
        assert_eq!(first, second);
        std::fs::remove_file(report.path()).ok();
    }

    #[test]
    fn test_failure_names_variant_and_writes_nothing() {
        let report = temp_report("lexiglot_trainer_failure.md");
        let training =
            TrainEvaluateLoop::new(ModelRegistry::new(), MemoryModelStore::new(), report.clone());
        // 18 training words cannot host 103 neighbours
        let (train, test) = words().split(0.25, 42).unwrap();
        let err = training
            .run(&train, &test, &[ModelVariant::HandEngineeredKnn])
            .unwrap_err();
        match err {
            LexiglotError::VariantFailed { variant, source } => {
                assert_eq!(variant, "HAND_ENGINEERED_KNN");
                assert!(matches!(*source, LexiglotError::Data(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(training.store().names().is_empty());
        assert!(!report.path().exists());
    }

    #[test]
    fn test_unwritable_report_keeps_model_unsaved() {
        let root = std::env::temp_dir().join("lexiglot_trainer_unwritable");
        std::fs::remove_dir_all(&root).ok();
        let store = FileModelStore::new(root.join("models"));
        let training = TrainEvaluateLoop::new(
            ModelRegistry::new(),
            store.clone(),
            PerformanceReport::new(root.join("missing_dir").join("README.md")),
        );
        let (train, test) = words().split(0.25, 42).unwrap();

        let err = training
            .run(&train, &test, &[ModelVariant::NgramSvc])
            .unwrap_err();
        assert!(matches!(err, LexiglotError::VariantFailed { .. }));
        assert!(!store.path_for("NGRAM_SVC").exists());
        assert!(!root.join("missing_dir").exists());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_train_config_builders() {
        let config = TrainConfig::default()
            .with_test_size(0.3)
            .with_seed(1)
            .with_variants(vec![ModelVariant::NgramKnn]);
        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.seed, 1);
        assert_eq!(config.variants, vec![ModelVariant::NgramKnn]);
        assert_eq!(TrainConfig::default().variants.len(), 9);
    }

    #[test]
    fn test_train_all_missing_dataset() {
        let config = TrainConfig::default()
            .with_data_path(std::env::temp_dir().join("lexiglot_missing_data.csv"));
        assert!(matches!(train_all(&config), Err(LexiglotError::Io(_))));
    }
}
