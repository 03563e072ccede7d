//! # rtm-base
//!
//! Symbol indexing for RTM overlay sources: structural parsing, a workspace
//! symbol index, definition lookup and reference search.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → Editor features (outline, goto-def, references, folding)
//!   ↓
//! hir     → Workspace index, symbol locator, reference finder
//!   ↓
//! syntax  → Grammar table + stack parser → symbol tree
//!   ↓
//! base    → Primitives (FileId, LineCol, Extent, LineIndex)
//! ```
//!
//! `project` supplies configuration and the disk/in-memory source
//! collaborators the index reads through.

/// Foundation types: FileId, positions, line index
pub mod base;

/// Workspace index and cross-file resolution
pub mod hir;

/// IDE features: outline, goto-definition, find-references
pub mod ide;

pub mod project;
pub mod syntax;

// Re-export foundation types
pub use base::{Extent, FileId, LineCol, LineIndex, TextRange, TextSize};
pub use hir::{
    Declaration, Location, SourceError, SourceProvider, SymbolLocator, WorkspaceIndex,
    find_references,
};
pub use project::{DiskSource, MemorySource, WorkspaceConfig};
pub use syntax::{Symbol, SymbolId, SymbolKind, SymbolTree, parse};
