//! Find references — textual occurrences of a Variable within its Entry.

use tracing::{debug, warn};

use super::index::WorkspaceIndex;
use super::input::SourceProvider;
use super::resolve::{Declaration, is_token_char};
use crate::base::{Extent, FileId, LineIndex, TextSize};
use crate::syntax::SymbolKind;

/// A span in a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: FileId,
    pub range: Extent,
}

impl Location {
    pub fn new(file: FileId, range: Extent) -> Self {
        Self { file, range }
    }
}

/// Every occurrence of a Variable's name inside the Entry that declares it,
/// the declaration included, in document order.
///
/// Only Variables are supported; other kinds, and Variables outside any
/// Entry, yield no locations.
pub fn find_references<P: SourceProvider>(
    index: &WorkspaceIndex<P>,
    decl: &Declaration,
) -> Vec<Location> {
    let symbol = decl.symbol();
    if symbol.kind != SymbolKind::Variable {
        debug!(kind = ?symbol.kind, "references only supported for variables");
        return Vec::new();
    }
    let tree = decl.tree();
    let Some(entry) = tree.enclosing(decl.id(), SymbolKind::Entry) else {
        return Vec::new();
    };

    let text = match index.text(decl.file()) {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %decl.file(), error = %err, "cannot read source for references");
            return Vec::new();
        }
    };

    let scope = tree.get(entry).extent;
    let file = decl.file();
    occurrences(&text, scope, &symbol.name)
        .into_iter()
        .map(|range| Location::new(file, range))
        .collect()
}

/// Whole-identifier occurrences of `name` in `text` within `scope`.
pub(crate) fn occurrences(text: &str, scope: Extent, name: &str) -> Vec<Extent> {
    if name.is_empty() {
        return Vec::new();
    }
    let lines = LineIndex::new(text);
    let (Some(start), Some(end)) = (lines.offset(scope.start), lines.offset(scope.end)) else {
        return Vec::new();
    };
    let (start, end) = (usize::from(start), usize::from(end));
    let Some(haystack) = text.get(start..end) else {
        return Vec::new();
    };

    haystack
        .match_indices(name)
        .map(|(idx, _)| start + idx)
        .filter(|&at| is_whole_identifier(text, at, at + name.len()))
        .map(|at| {
            let pos = lines.line_col(TextSize::new(at as u32));
            Extent::on_line(pos.line, pos.col, pos.col + name.len() as u32)
        })
        .collect()
}

fn is_whole_identifier(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    if before.is_some_and(is_token_char) {
        return false;
    }
    let mut after = text[end..].chars();
    match after.next() {
        Some('.') => !after.next().is_some_and(unicode_ident::is_xid_continue),
        Some(c) => !unicode_ident::is_xid_continue(c),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LineCol;
    use crate::hir::SymbolLocator;
    use crate::project::MemorySource;
    use rstest::rstest;
    use std::path::Path;

    const TWO_ENTRIES: &str = "\
$ENTRY ORD
$DATA
AMT N9.2
$PROG
CALC PROC
AMT = AMT + 1
ENDPROC
RETURN
$ENTRY OTHER
$DATA
AMT N5
$PROG
AMT = 0
RETURN
";

    fn references_at(text: &str, line: u32, col: u32) -> Vec<Location> {
        let source = MemorySource::new();
        source.set("ORD.rtm", text);
        let index = WorkspaceIndex::new(source);
        let file = index.file_id(Path::new("ORD.rtm"));

        let decl = SymbolLocator::new(&index)
            .resolve(file, LineCol::new(line, col))
            .expect("token should resolve");
        find_references(&index, &decl)
    }

    #[test]
    fn test_references_stay_within_entry() {
        let refs = references_at(TWO_ENTRIES, 5, 0);

        let ranges: Vec<Extent> = refs.iter().map(|loc| loc.range).collect();
        assert_eq!(
            ranges,
            [
                Extent::on_line(2, 0, 3),
                Extent::on_line(5, 0, 3),
                Extent::on_line(5, 6, 9),
            ]
        );
    }

    #[test]
    fn test_references_in_second_entry() {
        let refs = references_at(TWO_ENTRIES, 12, 1);

        let lines: Vec<u32> = refs.iter().map(|loc| loc.range.start.line).collect();
        assert_eq!(lines, [10, 12]);
    }

    #[test]
    fn test_references_for_proc_are_empty() {
        let refs = references_at("$ENTRY A\n$PROG\nCALL CALC\nRETURN\nCALC PROC\nENDPROC\n", 2, 6);

        assert!(refs.is_empty());
    }

    #[test]
    fn test_references_for_name_block_variable_are_empty() {
        let source = MemorySource::new();
        source.set("STOCK.rtm", "$NAME SHARED\nQTY N5\nX = QTY\n");
        let index = WorkspaceIndex::new(source);
        let tree = index.tree_for_path(Path::new("STOCK.rtm"));
        let block = tree.find_root(SymbolKind::Name, "SHARED").unwrap();
        let qty = tree.find_child(block, &[SymbolKind::Variable], "QTY").unwrap();

        let refs = find_references(&index, &Declaration::new(tree, qty));

        assert!(refs.is_empty());
    }

    #[rstest]
    #[case("AMT = AMT + 1", 2)]
    #[case("AMTX = XAMT", 0)]
    #[case("CUST.AMT = AMT.X", 0)]
    #[case("X = AMT.", 1)]
    #[case("AMT_2 = AMT", 1)]
    #[case("$AMT (AMT)", 2)]
    fn test_whole_identifier_matching(#[case] line: &str, #[case] expected: usize) {
        let scope = Extent::on_line(0, 0, line.len() as u32);

        assert_eq!(occurrences(line, scope, "AMT").len(), expected);
    }

    #[test]
    fn test_occurrences_respect_scope_end() {
        let text = "AMT\nAMT\nAMT\n";
        let scope = Extent::new(LineCol::new(0, 0), LineCol::new(1, 3));

        assert_eq!(occurrences(text, scope, "AMT").len(), 2);
    }
}
