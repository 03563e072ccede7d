//! Folding ranges — collapsible code regions.
//!
//! Every symbol whose extent spans more than one line folds.

use crate::base::FileId;
use crate::hir::{SourceProvider, WorkspaceIndex};
use crate::syntax::SymbolKind;

/// A folding range with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldingRange {
    /// Start line (0-indexed)
    pub start_line: u32,
    /// Start column (0-indexed)
    pub start_col: u32,
    /// End line (0-indexed)
    pub end_line: u32,
    /// End column (0-indexed)
    pub end_col: u32,
    pub kind: SymbolKind,
}

/// Get folding ranges for a file, ordered by start line.
pub fn folding_ranges<P: SourceProvider>(
    index: &WorkspaceIndex<P>,
    file: FileId,
) -> Vec<FoldingRange> {
    let tree = index.tree(file);
    let mut ranges: Vec<FoldingRange> = tree
        .iter()
        .filter(|(_, sym)| sym.extent.is_multiline())
        .map(|(_, sym)| FoldingRange {
            start_line: sym.extent.start.line,
            start_col: sym.extent.start.col,
            end_line: sym.extent.end.line,
            end_col: sym.extent.end.col,
            kind: sym.kind,
        })
        .collect();

    ranges.sort_by_key(|r| r.start_line);
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemorySource;
    use std::path::Path;

    #[test]
    fn test_only_multiline_symbols_fold() {
        let source = MemorySource::new();
        source.set(
            "ORD.rtm",
            "$ENTRY ORD\n$DATA\nAMT N9.2\n$PROG\nRETURN\nCALC PROC\nX = 1\nENDPROC\n",
        );
        let index = WorkspaceIndex::new(source);
        let file = index.file_id(Path::new("ORD.rtm"));

        let kinds: Vec<SymbolKind> = folding_ranges(&index, file).iter().map(|r| r.kind).collect();

        assert_eq!(
            kinds,
            [SymbolKind::Entry, SymbolKind::DataArea, SymbolKind::Prog, SymbolKind::Proc]
        );
    }
}
