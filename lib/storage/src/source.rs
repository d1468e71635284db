use std::path::{Path, PathBuf};

use clausematch_core::{Error, Result};
use parking_lot::Mutex;

/// Where catalog documents come from
pub trait CatalogSource: Send + Sync {
    /// Read the whole catalog document
    fn read(&self) -> Result<String>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Catalog stored as a UTF-8 JSON file
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalogSource {
    fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            Error::CatalogUnavailable(format!("cannot read {}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Catalog held in memory; the document can be swapped to simulate edits
#[derive(Debug, Default)]
pub struct InMemoryCatalogSource {
    document: Mutex<Option<String>>,
}

impl InMemoryCatalogSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }

    /// Source whose reads always fail
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set(&self, document: impl Into<String>) {
        *self.document.lock() = Some(document.into());
    }

    pub fn clear(&self) {
        *self.document.lock() = None;
    }
}

impl CatalogSource for InMemoryCatalogSource {
    fn read(&self) -> Result<String> {
        self.document
            .lock()
            .clone()
            .ok_or_else(|| Error::CatalogUnavailable("in-memory catalog is empty".to_string()))
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
