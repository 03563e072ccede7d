//! Stable `FileId`s for workspace paths.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::FileId;

/// Interns paths into [`FileId`]s.
///
/// Ids are assigned on first sight and never reused, so a tree's owner stays
/// meaningful after its cache entry is dropped.
#[derive(Debug, Default)]
pub struct FileSet {
    inner: RwLock<FileSetInner>,
}

#[derive(Debug, Default)]
struct FileSetInner {
    /// Path → FileId; the insertion index doubles as the id.
    paths: IndexMap<PathBuf, FileId>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the id for a path.
    pub fn file_id(&self, path: &Path) -> FileId {
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.paths.get(path) {
                return id;
            }
        }

        let mut inner = self.inner.write();
        let next = FileId::from_slot(inner.paths.len());
        *inner.paths.entry(path.to_owned()).or_insert(next)
    }

    /// Id for a path that has already been seen.
    pub fn lookup(&self, path: &Path) -> Option<FileId> {
        self.inner.read().paths.get(path).copied()
    }

    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.inner
            .read()
            .paths
            .get_index(file.index())
            .map(|(path, _)| path.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_set_id_assignment() {
        let files = FileSet::new();

        let a = files.file_id(Path::new("src/ORDERS.rtm"));
        let b = files.file_id(Path::new("src/STOCK.rtm"));
        let again = files.file_id(Path::new("src/ORDERS.rtm"));

        assert_ne!(a, b);
        assert_eq!(a, again);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_file_set_path_lookup() {
        let files = FileSet::new();
        let path = Path::new("lib/STOCK.rtm");
        let id = files.file_id(path);

        assert_eq!(files.path(id).as_deref(), Some(path));
        assert_eq!(files.lookup(path), Some(id));
        assert_eq!(files.lookup(Path::new("lib/OTHER.rtm")), None);
        assert_eq!(files.path(FileId::new(42)), None);
    }
}
