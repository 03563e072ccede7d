//! `AnalysisHost` — the entry point editors talk to.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::document_links::{DocumentLink, document_links};
use super::folding::{FoldingRange, folding_ranges};
use super::goto::{NavigationTarget, find_references, goto_definition};
use super::selection::selection_ranges;
use super::symbols::{DocumentSymbol, SymbolInfo, document_symbols, workspace_symbols};
use crate::base::{Extent, FileId, LineCol};
use crate::hir::{Location, SourceProvider, WorkspaceIndex};
use crate::project::{MemorySource, WorkspaceConfig};

/// Owns the workspace index and answers editor requests against it.
pub struct AnalysisHost<P> {
    index: WorkspaceIndex<P>,
}

impl<P: SourceProvider> AnalysisHost<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, WorkspaceConfig::default())
    }

    pub fn with_config(provider: P, config: WorkspaceConfig) -> Self {
        Self {
            index: WorkspaceIndex::with_config(provider, config),
        }
    }

    pub fn index(&self) -> &WorkspaceIndex<P> {
        &self.index
    }

    pub fn file_id(&self, path: &Path) -> FileId {
        self.index.file_id(path)
    }

    /// A file changed on the collaborator's side; forget its tree.
    pub fn did_change(&self, path: &Path) {
        debug!(path = %path.display(), "file changed");
        self.index.invalidate_path(path);
    }

    pub fn document_symbols(&self, file: FileId) -> Vec<DocumentSymbol> {
        document_symbols(&self.index, file)
    }

    pub fn workspace_symbols(&self, query: &str) -> Vec<SymbolInfo> {
        workspace_symbols(&self.index, query)
    }

    pub fn goto_definition(&self, file: FileId, pos: LineCol) -> Option<NavigationTarget> {
        goto_definition(&self.index, file, pos)
    }

    pub fn find_references(&self, file: FileId, pos: LineCol) -> Vec<Location> {
        find_references(&self.index, file, pos)
    }

    pub fn folding_ranges(&self, file: FileId) -> Vec<FoldingRange> {
        folding_ranges(&self.index, file)
    }

    pub fn selection_ranges(&self, file: FileId, pos: LineCol) -> Vec<Extent> {
        selection_ranges(&self.index, file, pos)
    }

    pub fn document_links(&self, file: FileId) -> Vec<DocumentLink> {
        document_links(&self.index, file)
    }
}

impl Default for AnalysisHost<MemorySource> {
    fn default() -> Self {
        Self::new(MemorySource::new())
    }
}

impl AnalysisHost<MemorySource> {
    /// Replace a buffer's text and drop its cached tree.
    pub fn set_file_content(&self, path: impl AsRef<Path>, text: impl Into<Arc<str>>) -> FileId {
        let path = path.as_ref();
        self.index.provider().set(path, text);
        self.did_change(path);
        self.file_id(path)
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.index.provider().remove(path);
        self.did_change(path);
    }
}
