//! Full train → report → persist → classify cycle on a synthetic corpus.

use lexiglot::persistence::{FileModelStore, ModelStore};
use lexiglot::report::REPORT_HEADING;
use lexiglot::{train_all, ClassifyService, LexiglotError, ModelVariant, TrainConfig};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

const ENGLISH: [&str; 8] = ["wa", "the", "ly", "ing", "ow", "ry", "ter", "wy"];
const CROATIAN: [&str; 8] = ["ča", "že", "šu", "ni", "ko", "vić", "ja", "ri"];

/// `n` distinct words built from `syllables`, two or three syllables long.
fn synthesize(syllables: &[&str; 8], n: usize) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut words = Vec::new();
    for i in 0..512 {
        let mut w = String::new();
        w.push_str(syllables[i % 8]);
        w.push_str(syllables[(i / 8) % 8]);
        if i % 3 != 0 {
            w.push_str(syllables[(i / 64) % 8]);
        }
        if seen.insert(w.clone()) {
            words.push(w);
        }
        if words.len() == n {
            break;
        }
    }
    words
}

struct Workspace {
    root: PathBuf,
}

impl Workspace {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(name);
        fs::remove_dir_all(&root).ok();
        fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    fn config(&self) -> TrainConfig {
        TrainConfig::default()
            .with_data_path(self.root.join("data.csv"))
            .with_model_dir(self.root.join("models"))
            .with_report_path(self.root.join("README.md"))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

fn write_dataset(path: &PathBuf) -> (Vec<String>, Vec<String>) {
    let english = synthesize(&ENGLISH, 120);
    let croatian = synthesize(&CROATIAN, 120);
    assert_eq!(english.len(), 120);
    assert_eq!(croatian.len(), 120);

    let mut csv = String::from("word,label\n");
    for (e, c) in english.iter().zip(&croatian) {
        csv.push_str(&format!("{e},1\n{c},0\n"));
    }
    fs::write(path, csv).unwrap();
    (english, croatian)
}

#[test]
fn train_every_variant_then_classify() {
    let ws = Workspace::new("lexiglot_e2e_all_variants");
    let config = ws.config();
    let (english, croatian) = write_dataset(&config.data_path);
    fs::write(
        &config.report_path,
        "# Words\n\n## Model performance\n\n|name|f1|recall|precision|accuracy|fp|fn|tp|tn|\n|---|---|---|---|---|---|---|---|---|\n\n## Usage\n",
    )
    .unwrap();

    let outcomes = train_all(&config).unwrap();
    let trained: Vec<ModelVariant> = outcomes.iter().map(|o| o.variant).collect();
    assert_eq!(trained, ModelVariant::all().to_vec());

    let report = fs::read_to_string(&config.report_path).unwrap();
    assert!(report.contains(REPORT_HEADING));
    assert!(report.ends_with("\n\n## Usage\n"));
    for v in ModelVariant::all() {
        assert_eq!(report.matches(&format!("|{}|", v.name())).count(), 1);
    }

    let store = FileModelStore::new(&config.model_dir);
    let mut service = ClassifyService::new(store.clone());
    let queries: Vec<&str> = english
        .iter()
        .take(10)
        .chain(croatian.iter().take(10))
        .map(String::as_str)
        .collect();
    for v in ModelVariant::all() {
        assert!(store.path_for(v.name()).exists());
        let labels = service.classify(&queries, *v).unwrap();
        assert_eq!(labels.len(), queries.len());

        let reloaded = store.load(v.name()).unwrap();
        assert_eq!(reloaded.predict(&queries).unwrap(), labels);
    }

    // exact matches decide distance-weighted k-NN on words seen in training
    let knn = service.classify(&queries, ModelVariant::NgramKnn).unwrap();
    let expected: Vec<u8> = (0..20).map(|i| if i < 10 { 1 } else { 0 }).collect();
    assert_eq!(knn, expected);
}

#[test]
fn retraining_updates_rows_in_place() {
    let ws = Workspace::new("lexiglot_e2e_retrain");
    let config = ws
        .config()
        .with_variants(vec![ModelVariant::HandEngineeredAdaBoost]);
    write_dataset(&config.data_path);

    train_all(&config).unwrap();
    let first = fs::read_to_string(&config.report_path).unwrap();
    train_all(&config).unwrap();
    let second = fs::read_to_string(&config.report_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.matches("|HAND_ENGINEERED_ADABOOST|").count(), 1);
}

#[test]
fn classify_without_training_fails() {
    let ws = Workspace::new("lexiglot_e2e_untrained");
    let mut service = ClassifyService::new(FileModelStore::new(ws.root.join("models")));
    let err = service
        .classify(&["house"], ModelVariant::NgramSvc)
        .unwrap_err();
    assert!(matches!(err, LexiglotError::ModelNotFound(_)));
}

#[test]
fn malformed_dataset_reports_line() {
    let ws = Workspace::new("lexiglot_e2e_malformed");
    let config = ws.config();
    fs::write(&config.data_path, "word,label\nhouse,1\nkuća,maybe\n").unwrap();
    match train_all(&config) {
        Err(LexiglotError::Data(msg)) => assert!(msg.contains("line 3"), "{msg}"),
        other => panic!("expected a data error, got {other:?}"),
    }
}
