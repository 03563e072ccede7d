//! Document and workspace symbols.

use smol_str::SmolStr;

use crate::base::{Extent, FileId};
use crate::hir::{SourceProvider, WorkspaceIndex};
use crate::syntax::{SymbolId, SymbolKind, SymbolTree};

/// A symbol in a document outline, with its nested children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSymbol {
    pub name: SmolStr,
    pub detail: SmolStr,
    pub kind: SymbolKind,
    pub range: Extent,
    pub selection: Extent,
    pub children: Vec<DocumentSymbol>,
}

/// A flattened symbol for workspace-wide search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub file: FileId,
    pub range: Extent,
    pub selection: Extent,
    /// Name of the enclosing symbol, if any.
    pub container: Option<SmolStr>,
}

/// Outline of a file, mirroring its symbol tree.
pub fn document_symbols<P: SourceProvider>(
    index: &WorkspaceIndex<P>,
    file: FileId,
) -> Vec<DocumentSymbol> {
    let tree = index.tree(file);
    tree.roots()
        .iter()
        .map(|&root| outline(&tree, root))
        .collect()
}

fn outline(tree: &SymbolTree, id: SymbolId) -> DocumentSymbol {
    let sym = tree.get(id);
    DocumentSymbol {
        name: sym.name.clone(),
        detail: sym.detail.clone(),
        kind: sym.kind,
        range: sym.extent,
        selection: sym.selection,
        children: sym.children.iter().map(|&c| outline(tree, c)).collect(),
    }
}

/// Every symbol in the workspace whose name contains `query`, ignoring case.
///
/// An empty query matches everything.
pub fn workspace_symbols<P: SourceProvider>(
    index: &WorkspaceIndex<P>,
    query: &str,
) -> Vec<SymbolInfo> {
    let query = query.to_lowercase();
    index
        .all_trees()
        .iter()
        .flat_map(|tree| {
            let query = &query;
            tree.iter()
                .filter(move |(_, sym)| query.is_empty() || sym.name.to_lowercase().contains(query))
                .map(move |(_, sym)| SymbolInfo {
                    name: sym.name.clone(),
                    kind: sym.kind,
                    file: tree.file(),
                    range: sym.extent,
                    selection: sym.selection,
                    container: sym.parent.map(|p| tree.get(p).name.clone()),
                })
        })
        .collect()
}
