//! Storage of trained models, keyed by variant name.

use crate::error::{LexiglotError, Result};
use crate::pipeline::TrainedModel;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where trained models live between `train` and `classify`.
pub trait ModelStore {
    /// Persist `model` under `name`, replacing any previous one.
    fn save(&self, model: &TrainedModel, name: &str) -> Result<()>;

    /// Load the model saved under `name`.
    ///
    /// # Errors
    /// Returns [`LexiglotError::ModelNotFound`] if nothing was saved under `name`.
    fn load(&self, name: &str) -> Result<TrainedModel>;
}

/// Bytes written to a sibling temp file, waiting to replace their target.
///
/// [`StagedFile::commit`] renames the temp file over the target. Dropping an
/// uncommitted stage removes the temp file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    tmp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Write `bytes` next to `path` without touching `path` itself.
    ///
    /// # Errors
    /// Fails if the temp file cannot be created or written, e.g. when the
    /// parent directory does not exist.
    pub fn stage(path: &Path, bytes: &[u8]) -> Result<Self> {
        let file_name = path
            .file_name()
            .ok_or_else(|| {
                LexiglotError::InvalidParameter(format!("{} has no file name", path.display()))
            })?
            .to_string_lossy();
        let staged = Self {
            tmp: path.with_file_name(format!(".{file_name}.tmp")),
            target: path.to_path_buf(),
            committed: false,
        };
        let mut file = fs::File::create(&staged.tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(staged)
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Replace the target with the staged bytes.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            fs::remove_file(&self.tmp).ok();
        }
    }
}

/// Write `bytes` to `path` through a sibling temp file and a rename, so
/// readers see either the old contents or the new ones.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    StagedFile::stage(path, bytes)?.commit()
}

/// One bincode file per model: `<dir>/<name>.bin`.
#[derive(Clone, Debug)]
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the model saved under `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.bin"))
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, model: &TrainedModel, name: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let bytes = model.to_bytes()?;
        let path = self.path_for(name);
        write_atomic(&path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "saved model");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<TrainedModel> {
        let path = self.path_for(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LexiglotError::ModelNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), bytes = bytes.len(), "loaded model");
        TrainedModel::from_bytes(&bytes)
    }
}

/// In-memory store holding serialized models; used in tests and benches.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    models: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the stored models, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop the model saved under `name`; `false` if there was none.
    pub fn remove(&self, name: &str) -> bool {
        self.models.borrow_mut().remove(name).is_some()
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&self, model: &TrainedModel, name: &str) -> Result<()> {
        let bytes = model.to_bytes()?;
        self.models.borrow_mut().insert(name.to_string(), bytes);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<TrainedModel> {
        let models = self.models.borrow();
        let bytes = models
            .get(name)
            .ok_or_else(|| LexiglotError::ModelNotFound(name.to_string()))?;
        TrainedModel::from_bytes(bytes)
    }
}

impl<S: ModelStore + ?Sized> ModelStore for &S {
    fn save(&self, model: &TrainedModel, name: &str) -> Result<()> {
        (**self).save(model, name)
    }

    fn load(&self, name: &str) -> Result<TrainedModel> {
        (**self).load(name)
    }
}
