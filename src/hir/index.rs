//! Symbol index — per-file cache of parsed symbol trees.
//!
//! The index owns the source collaborator and memoizes [`parse`] output per
//! [`FileId`]. Any change notification drops the whole cached tree for that
//! file; the next access re-parses from scratch.
//!
//! The cache lock is never held across a parse. A miss records the file's
//! generation before reading; the parsed tree is only stored if no
//! invalidation bumped that generation in the meantime, so a stale parse can
//! never outlive the change notification that raced it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use super::input::{SourceError, SourceProvider};
use super::source::FileSet;
use crate::base::FileId;
use crate::project::WorkspaceConfig;
use crate::syntax::{SymbolTree, parse};

/// Logical name that refers to the requesting file itself.
pub const CURRENT_FILE: &str = "*";

pub struct WorkspaceIndex<P> {
    provider: P,
    config: WorkspaceConfig,
    files: FileSet,
    cache: RwLock<TreeCache>,
}

#[derive(Default)]
struct TreeCache {
    trees: FxHashMap<FileId, Arc<SymbolTree>>,
    generations: FxHashMap<FileId, u64>,
    /// Bumped by `invalidate_all`.
    epoch: u64,
}

/// Cache state observed when a parse started.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Stamp {
    epoch: u64,
    generation: u64,
}

impl TreeCache {
    fn stamp(&self, file: FileId) -> Stamp {
        Stamp {
            epoch: self.epoch,
            generation: self.generations.get(&file).copied().unwrap_or(0),
        }
    }
}

impl<P: SourceProvider> WorkspaceIndex<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, WorkspaceConfig::default())
    }

    pub fn with_config(provider: P, config: WorkspaceConfig) -> Self {
        Self {
            provider,
            config,
            files: FileSet::new(),
            cache: RwLock::new(TreeCache::default()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Id for a path, in the collaborator's normalized spelling.
    pub fn file_id(&self, path: &Path) -> FileId {
        self.files.file_id(&self.provider.normalize(path))
    }

    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.files.path(file)
    }

    /// Current text of a file, straight from the collaborator.
    pub fn text(&self, file: FileId) -> Result<Arc<str>, SourceError> {
        let path = self.files.path(file).ok_or(SourceError::UnknownFile(file))?;
        self.provider.read_text(&path)
    }

    /// The file's symbol tree, parsing on a cache miss.
    ///
    /// Unknown or unreadable files yield an empty tree, which is not cached.
    pub fn tree(&self, file: FileId) -> Arc<SymbolTree> {
        let stamp = {
            let cache = self.cache.read();
            if let Some(tree) = cache.trees.get(&file) {
                trace!(%file, "tree cache hit");
                return Arc::clone(tree);
            }
            cache.stamp(file)
        };

        debug!(%file, path = ?self.files.path(file), "tree cache miss");
        let text = match self.text(file) {
            Ok(text) => text,
            Err(err) => {
                warn!(%file, error = %err, "cannot read source, treating as empty");
                return Arc::new(SymbolTree::empty(file));
            }
        };

        let tree = Arc::new(parse(file, &text));
        self.store(file, stamp, &tree);
        tree
    }

    /// Cache `tree` unless the file was invalidated since `stamp` was taken.
    fn store(&self, file: FileId, stamp: Stamp, tree: &Arc<SymbolTree>) {
        let mut cache = self.cache.write();
        if cache.stamp(file) != stamp {
            debug!(%file, "file changed during parse, not caching");
            return;
        }
        cache.trees.insert(file, Arc::clone(tree));
    }

    /// Tree for a path, interning the path if it is new.
    pub fn tree_for_path(&self, path: &Path) -> Arc<SymbolTree> {
        self.tree(self.file_id(path))
    }

    /// Resolve a logical block-owner name to trees.
    ///
    /// `*` means `origin` itself. Any other name is looked up through the
    /// collaborator as a file stem; exactly one matching file wins, zero or
    /// several matches resolve to nothing.
    pub fn trees_by_logical_name(&self, name: &str, origin: FileId) -> Vec<Arc<SymbolTree>> {
        if name == CURRENT_FILE {
            return vec![self.tree(origin)];
        }

        let Some(pattern) = self.config.logical_name_pattern(name) else {
            debug!(name, "not a valid logical file name");
            return Vec::new();
        };
        let paths = match self.provider.find_files(&pattern) {
            Ok(paths) => paths,
            Err(err) => {
                warn!(name, error = %err, "file search failed");
                return Vec::new();
            }
        };

        match paths.as_slice() {
            [path] => vec![self.tree_for_path(path)],
            [] => {
                debug!(name, "no file for logical name");
                Vec::new()
            }
            many => {
                warn!(name, candidates = many.len(), "ambiguous logical name");
                Vec::new()
            }
        }
    }

    /// Trees of every source file in the workspace, in the collaborator's
    /// enumeration order. Misses are parsed in parallel.
    pub fn all_trees(&self) -> Vec<Arc<SymbolTree>> {
        let pattern = self.config.source_pattern();
        let paths = match self.provider.find_files(&pattern) {
            Ok(paths) => paths,
            Err(err) => {
                warn!(error = %err, "workspace enumeration failed");
                return Vec::new();
            }
        };

        let ids: Vec<FileId> = paths.iter().map(|path| self.file_id(path)).collect();
        ids.par_iter().map(|&file| self.tree(file)).collect()
    }

    /// Drop the cached tree for a file.
    pub fn invalidate(&self, file: FileId) {
        let mut cache = self.cache.write();
        *cache.generations.entry(file).or_default() += 1;
        if cache.trees.remove(&file).is_some() {
            debug!(%file, "invalidated tree");
        }
    }

    /// Drop the cached tree for a path, if the path has ever been seen.
    pub fn invalidate_path(&self, path: &Path) {
        if let Some(file) = self.files.lookup(&self.provider.normalize(path)) {
            self.invalidate(file);
        }
    }

    pub fn invalidate_all(&self) {
        let mut cache = self.cache.write();
        cache.epoch += 1;
        cache.trees.clear();
    }

    /// Number of trees currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.read().trees.len()
    }

    pub fn is_cached(&self, file: FileId) -> bool {
        self.cache.read().trees.contains_key(&file)
    }
}
