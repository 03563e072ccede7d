//! Selection ranges — expanding selection regions.

use crate::base::{Extent, FileId, LineCol};
use crate::hir::{SourceProvider, WorkspaceIndex};

/// Extents containing `pos`, innermost first.
///
/// Used for "Expand Selection": each step grows to the next enclosing
/// symbol. Identical extents are reported once.
pub fn selection_ranges<P: SourceProvider>(
    index: &WorkspaceIndex<P>,
    file: FileId,
    pos: LineCol,
) -> Vec<Extent> {
    let tree = index.tree(file);
    let Some(innermost) = tree
        .iter()
        .filter(|(_, sym)| sym.extent.contains(pos))
        .last()
        .map(|(id, _)| id)
    else {
        return Vec::new();
    };

    let mut ranges = vec![tree.get(innermost).extent];
    ranges.extend(tree.ancestors(innermost).map(|(_, sym)| sym.extent));
    ranges.dedup();
    ranges
}
