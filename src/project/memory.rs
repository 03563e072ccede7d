use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::hir::{FilePattern, SourceError, SourceProvider};

/// Source collaborator backed by in-memory buffers.
///
/// Suits editors that own unsaved document text, and tests. Enumeration is
/// sorted by path.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<BTreeMap<PathBuf, Arc<str>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a buffer.
    pub fn set(&self, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) {
        self.files.write().insert(path.into(), text.into());
    }

    pub fn remove(&self, path: &Path) -> Option<Arc<str>> {
        self.files.write().remove(path)
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl SourceProvider for MemorySource {
    fn find_files(&self, pattern: &FilePattern) -> Result<Vec<PathBuf>, SourceError> {
        let matcher = pattern.compile()?;
        Ok(self
            .files
            .read()
            .keys()
            .filter(|path| matcher.is_match(path))
            .cloned()
            .collect())
    }

    fn read_text(&self, path: &Path) -> Result<Arc<str>, SourceError> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_owned()))
    }
}
