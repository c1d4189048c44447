//! Batch classification with persisted models.

use crate::error::Result;
use crate::persistence::ModelStore;
use crate::pipeline::TrainedModel;
use crate::registry::ModelVariant;
use crate::Label;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Classifies words with models loaded from a [`ModelStore`].
///
/// Each variant is loaded on first use and kept for the life of the service.
pub struct ClassifyService<S: ModelStore> {
    store: S,
    cache: HashMap<ModelVariant, TrainedModel>,
}

impl<S: ModelStore> ClassifyService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// One label per word, in input order; `1` means English.
    ///
    /// # Errors
    /// Returns [`LexiglotError::ModelNotFound`](crate::error::LexiglotError::ModelNotFound)
    /// if `variant` was never trained.
    pub fn classify<W: AsRef<str>>(
        &mut self,
        words: &[W],
        variant: ModelVariant,
    ) -> Result<Vec<Label>> {
        let model = self.model(variant)?;
        let labels = model.predict(words)?;
        debug!(variant = variant.name(), words = words.len(), "classified");
        Ok(labels)
    }

    /// Like [`ClassifyService::classify`], parsing the variant name first.
    pub fn classify_by_name<W: AsRef<str>>(
        &mut self,
        words: &[W],
        variant: &str,
    ) -> Result<Vec<Label>> {
        self.classify(words, variant.parse()?)
    }

    fn model(&mut self, variant: ModelVariant) -> Result<&TrainedModel> {
        match self.cache.entry(variant) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let model = self.store.load(variant.name())?;
                debug!(variant = variant.name(), "loaded model into cache");
                Ok(entry.insert(model))
            }
        }
    }
}
