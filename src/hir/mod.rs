//! Workspace-level semantics over per-file symbol trees.
//!
//! - [`WorkspaceIndex`] - memoized trees, logical-name lookup, invalidation
//! - [`SymbolLocator`] - token under cursor → declaring symbol
//! - [`find_references`] - occurrences of a Variable within its Entry
//! - [`SourceProvider`] - the collaborator that enumerates and reads files

mod ids;
mod index;
mod input;
mod references;
mod resolve;
mod source;

pub use ids::SymbolRef;
pub use index::{CURRENT_FILE, WorkspaceIndex};
pub use input::{FilePattern, SourceError, SourceProvider};
pub use references::{Location, find_references};
pub use resolve::{Declaration, IncludeTarget, ResolveResult, SymbolLocator};
pub use source::FileSet;
