use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::hir::{FilePattern, SourceError, SourceProvider};

/// Source collaborator reading files under a workspace root on disk.
///
/// Patterns are matched against paths relative to the root; returned paths
/// are absolute (root-joined) and sorted.
#[derive(Clone, Debug)]
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self, SourceError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SourceError::NotFound(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceProvider for DiskSource {
    fn find_files(&self, pattern: &FilePattern) -> Result<Vec<PathBuf>, SourceError> {
        let matcher = pattern.compile()?;
        let mut found = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // An unreadable subdirectory hides its files, nothing more.
                    warn!(error = %err, "skipping unreadable workspace entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            if matcher.is_match(relative) {
                found.push(entry.into_path());
            }
        }

        found.sort();
        debug!(pattern = pattern.as_str(), count = found.len(), "enumerated files");
        Ok(found)
    }

    fn read_text(&self, path: &Path) -> Result<Arc<str>, SourceError> {
        let path = self.normalize(path);
        fs::read_to_string(&path)
            .map(Arc::from)
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => SourceError::NotFound(path),
                _ => SourceError::Io { path, source },
            })
    }

    /// Relative paths are taken relative to the root.
    fn normalize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.root.join(path)
        }
    }
}
