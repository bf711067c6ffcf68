//! JSON-file registry store.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::RegistryStore;
use crate::registry::ModelDataRegistry;

/// Errors from the file-backed registry store.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// Filesystem operation failed.
    #[error("registry file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Registry file is not valid JSON of the expected shape.
    #[error("registry file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Registry store backed by a shared JSON file.
///
/// Persists by writing a sibling temp file and renaming it over the
/// target, so readers never observe a half-written registry.
#[derive(Debug, Clone)]
pub struct FileRegistryStore {
    path: PathBuf,
}

impl FileRegistryStore {
    /// Create a store for the given registry file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for FileRegistryStore {
    type Error = FileStoreError;

    fn load(&self) -> Result<ModelDataRegistry, Self::Error> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ModelDataRegistry::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, registry: &ModelDataRegistry) -> Result<(), Self::Error> {
        let mut bytes = serde_json::to_vec_pretty(registry)?;
        bytes.push(b'\n');

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
