//! The collaborator seam: how the index finds and reads source files.
//!
//! The index never touches the file system itself. It asks a
//! [`SourceProvider`] to enumerate paths matching a [`FilePattern`] and to
//! read a path's text; editors plug in their own buffers, the crate ships
//! [`DiskSource`](crate::project::DiskSource) and
//! [`MemorySource`](crate::project::MemorySource).

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};
use thiserror::Error;

use crate::base::FileId;

/// Errors surfaced by source collaborators.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("unknown file id {0}")]
    UnknownFile(FileId),
}

/// A glob over workspace-relative paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePattern {
    glob: String,
    case_insensitive: bool,
}

impl FilePattern {
    pub fn new(glob: impl Into<String>) -> Self {
        Self {
            glob: glob.into(),
            case_insensitive: false,
        }
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }

    /// Compile into a matcher; `*` may cross directory separators.
    pub fn compile(&self) -> Result<GlobMatcher, SourceError> {
        GlobBuilder::new(&self.glob)
            .case_insensitive(self.case_insensitive)
            .literal_separator(false)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|source| SourceError::Pattern {
                pattern: self.glob.clone(),
                source,
            })
    }
}

/// File enumeration and reading, supplied by the embedding layer.
///
/// Implementations must be shareable across threads: the index parses
/// cache misses in parallel.
pub trait SourceProvider: Send + Sync {
    /// Paths matching `pattern`, in a stable order.
    fn find_files(&self, pattern: &FilePattern) -> Result<Vec<PathBuf>, SourceError>;

    /// Current text of `path`.
    fn read_text(&self, path: &Path) -> Result<Arc<str>, SourceError>;

    /// The spelling of `path` that `find_files` would report.
    ///
    /// Every path is normalized before it is interned, so one file never ends
    /// up with two ids.
    fn normalize(&self, path: &Path) -> PathBuf {
        path.to_owned()
    }
}

impl<P: SourceProvider + ?Sized> SourceProvider for Arc<P> {
    fn find_files(&self, pattern: &FilePattern) -> Result<Vec<PathBuf>, SourceError> {
        (**self).find_files(pattern)
    }

    fn read_text(&self, path: &Path) -> Result<Arc<str>, SourceError> {
        (**self).read_text(path)
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        (**self).normalize(path)
    }
}
