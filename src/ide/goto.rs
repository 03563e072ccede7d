//! Goto definition and find references at a cursor position.

use smol_str::SmolStr;

use crate::base::{Extent, FileId, LineCol};
use crate::hir::{Declaration, Location, SourceProvider, SymbolLocator, SymbolRef, WorkspaceIndex};
use crate::syntax::SymbolKind;

/// Where a navigation request should take the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationTarget {
    pub symbol: SymbolRef,
    pub file: FileId,
    pub kind: SymbolKind,
    pub name: SmolStr,
    /// Whole extent of the declaration.
    pub full_range: Extent,
    /// The declaring name within `full_range`.
    pub focus_range: Extent,
}

impl From<&Declaration> for NavigationTarget {
    fn from(decl: &Declaration) -> Self {
        let sym = decl.symbol();
        Self {
            symbol: decl.symbol_ref(),
            file: decl.file(),
            kind: sym.kind,
            name: sym.name.clone(),
            full_range: sym.extent,
            focus_range: sym.selection,
        }
    }
}

pub fn goto_definition<P: SourceProvider>(
    index: &WorkspaceIndex<P>,
    file: FileId,
    pos: LineCol,
) -> Option<NavigationTarget> {
    SymbolLocator::new(index)
        .resolve(file, pos)
        .map(|decl| NavigationTarget::from(&decl))
}

/// References of the Variable under the cursor, declaration included.
pub fn find_references<P: SourceProvider>(
    index: &WorkspaceIndex<P>,
    file: FileId,
    pos: LineCol,
) -> Vec<Location> {
    match SymbolLocator::new(index).resolve(file, pos) {
        Some(decl) => crate::hir::find_references(index, &decl),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemorySource;
    use std::path::Path;

    #[test]
    fn test_goto_definition_targets_declaring_name() {
        let source = MemorySource::new();
        source.set("ORD.rtm", "$ENTRY ORD\n$DATA\nAMT N9.2\n$PROG\nAMT = 1\nRETURN\n");
        let index = WorkspaceIndex::new(source);
        let file = index.file_id(Path::new("ORD.rtm"));

        let target = goto_definition(&index, file, LineCol::new(4, 1)).unwrap();

        assert_eq!(target.kind, SymbolKind::Variable);
        assert_eq!(target.focus_range, Extent::on_line(2, 0, 3));
        assert_eq!(target.file, file);
        assert!(goto_definition(&index, file, LineCol::new(4, 4)).is_none());
    }

    #[test]
    fn test_find_references_from_usage() {
        let source = MemorySource::new();
        source.set("ORD.rtm", "$ENTRY ORD\n$DATA\nAMT N9.2\n$PROG\nAMT = AMT\nRETURN\n");
        let index = WorkspaceIndex::new(source);
        let file = index.file_id(Path::new("ORD.rtm"));

        assert_eq!(find_references(&index, file, LineCol::new(4, 7)).len(), 3);
        assert!(find_references(&index, file, LineCol::new(5, 0)).is_empty());
    }
}
