//! Fit one catalogue variant on a handful of words, persist it, and classify.
//!
//! Run with `cargo run --example word_pipeline`.

use lexiglot::metrics::ReportMetrics;
use lexiglot::persistence::{MemoryModelStore, ModelStore};
use lexiglot::{ClassifyService, ModelRegistry, ModelVariant};
use std::error::Error;

fn corpus() -> (Vec<&'static str>, Vec<u8>) {
    let english = [
        "house", "window", "yellow", "quick", "running", "water", "bottle", "swimming", "weekly",
        "happy", "sixty", "wax", "through", "thought", "mixed",
    ];
    let croatian = [
        "kuća", "prozor", "žuto", "brzo", "trčanje", "voda", "boca", "plivanje", "tjedno",
        "sretan", "šezdeset", "vosak", "đak", "nježno", "ljeto",
    ];
    let mut words = Vec::new();
    let mut labels = Vec::new();
    for (e, c) in english.iter().zip(croatian.iter()) {
        words.push(*e);
        labels.push(1);
        words.push(*c);
        labels.push(0);
    }
    (words, labels)
}

fn main() -> Result<(), Box<dyn Error>> {
    let (words, labels) = corpus();
    let variant = ModelVariant::HandEngineeredAndNgramsSvc;

    let mut pipeline = ModelRegistry::new().new_pipeline(variant);
    let model = pipeline.fit(&words, &labels)?;
    let fitted = model.predict(&words)?;
    let metrics = ReportMetrics::from_labels(variant.name(), &labels, &fitted)?;
    println!("training fit:");
    print!("{}", metrics.row());

    let store = MemoryModelStore::new();
    store.save(model, variant.name())?;

    let mut service = ClassifyService::new(&store);
    let queries = ["weather", "večer", "xylophone", "šuma"];
    for (word, label) in queries.iter().zip(service.classify(&queries, variant)?) {
        println!("{word},{label}");
    }
    Ok(())
}
