//! # lexiglot
//!
//! Word-level language identification: is a word English or Croatian?
//!
//! Nine classifier variants are trained on character n-gram counts,
//! hand-engineered linguistic features, or both, evaluated on a held-out
//! split, recorded in a markdown report and persisted for later use.
//!
//! ## Core Design Principles
//!
//! - **Fit/Inference Separation**: unfitted extractors and classifiers carry
//!   hyperparameters; `fit` returns a separate fitted type that carries only
//!   what inference needs and can be serialized.
//! - **Frozen Feature Layout**: a fitted extractor always produces the same
//!   columns in the same order, and the classifier checks the width.
//! - **Reproducibility**: every random choice flows from an explicit seed.
//!
//! ## Quick Start
//!
//! ```rust
//! use lexiglot::persistence::{MemoryModelStore, ModelStore};
//! use lexiglot::registry::{ModelRegistry, ModelVariant};
//! use lexiglot::ClassifyService;
//!
//! let words = ["house", "kuća", "window", "prozor", "yellow", "žuto", "swimming", "plivanje"];
//! let labels = [1, 0, 1, 0, 1, 0, 1, 0];
//!
//! let mut pipeline = ModelRegistry::new().new_pipeline(ModelVariant::NgramKnn);
//! pipeline.fit(&words, &labels).unwrap();
//!
//! let store = MemoryModelStore::new();
//! store.save(&pipeline.into_trained().unwrap(), "NGRAM_KNN").unwrap();
//!
//! let mut service = ClassifyService::new(store);
//! let predicted = service.classify(&["house", "kuća"], ModelVariant::NgramKnn).unwrap();
//! assert_eq!(predicted, vec![1, 0]);
//! ```
//!
//! ## Module Structure
//!
//! - `matrix`: dense and sparse feature matrices with column concatenation
//! - `preprocessing`: linguistic features, n-gram counts and their fusion
//! - `model`: SVC, AdaBoost and k-NN classifiers
//! - `pipeline`: extractor + classifier pairs and trained models
//! - `registry`: the nine model variants
//! - `dataset`: CSV loading and stratified splitting
//! - `metrics`: confusion matrix and report metrics
//! - `report`: in-place update of the markdown performance table
//! - `persistence`: model stores
//! - `trainer`: the train / evaluate / report / persist loop
//! - `classify`: batch classification with persisted models

/// Batch classification with persisted models.
pub mod classify;

/// Data loading utilities and dataset splitting.
pub mod dataset;

pub mod error;

/// Feature matrices with dense and sparse backing.
pub mod matrix;

/// Evaluation metrics.
pub mod metrics;

/// Word classifiers with fit/inference separation.
pub mod model;

pub mod persistence;

pub mod pipeline;

/// Word feature extractors.
pub mod preprocessing;

pub mod registry;

pub mod report;

/// Parameter serialization.
pub mod serialization;

/// High-level training loop orchestration.
pub mod trainer;

/// Class label: `1` for English, `0` for Croatian.
pub type Label = u8;

pub use classify::ClassifyService;
pub use error::{LexiglotError, Result};
pub use pipeline::{TrainedModel, WordPipeline};
pub use registry::{ModelRegistry, ModelVariant};
pub use trainer::{train_all, TrainConfig, TrainEvaluateLoop, VariantOutcome};
