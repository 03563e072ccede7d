//! Document links — clickable include targets.

use std::borrow::Cow;

use crate::base::{Extent, FileId};
use crate::hir::{IncludeTarget, SourceProvider, SymbolLocator, WorkspaceIndex};
use crate::syntax::SymbolKind;

/// A document link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// The span of the link in the source file.
    pub range: Extent,
    /// The file containing the Name block.
    pub target_file: FileId,
    /// The block's declaring name.
    pub target_range: Extent,
    /// Tooltip text for the link.
    pub tooltip: Cow<'static, str>,
}

/// Links from every `$INCLUDE` in a file to the Name block it pulls in.
///
/// Includes whose block cannot be found get no link.
pub fn document_links<P: SourceProvider>(
    index: &WorkspaceIndex<P>,
    file: FileId,
) -> Vec<DocumentLink> {
    let tree = index.tree(file);
    let locator = SymbolLocator::new(index);

    tree.iter()
        .filter(|(_, sym)| sym.kind == SymbolKind::Include)
        .filter_map(|(_, include)| {
            let target = IncludeTarget::parse(&include.name)?;
            let block = locator.name_block(&target, file)?;
            Some(DocumentLink {
                range: include.selection,
                target_file: block.file(),
                target_range: block.symbol().selection,
                tooltip: Cow::Owned(format!("Go to {} {}", SymbolKind::Name.label(), target.block)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemorySource;
    use std::path::Path;

    #[test]
    fn test_links_only_resolvable_includes() {
        let source = MemorySource::new();
        source.set(
            "ORD.rtm",
            "$ENTRY ORD\n$INCLUDE STOCK(SHARED)\n$INCLUDE STOCK(GONE)\n$INCLUDE *(LOCAL)\n$NAME LOCAL\n",
        );
        source.set("lib/STOCK.rtm", "* shared stock data\n$NAME SHARED\nQTY N5\n");
        let index = WorkspaceIndex::new(source);
        let file = index.file_id(Path::new("ORD.rtm"));

        let links = document_links(&index, file);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].range, Extent::on_line(1, 9, 22));
        assert_eq!(links[0].target_file, index.file_id(Path::new("lib/STOCK.rtm")));
        assert_eq!(links[0].target_range, Extent::on_line(1, 6, 12));
        assert_eq!(links[0].tooltip, "Go to $NAME SHARED");
        assert_eq!(links[1].target_file, file);
        assert_eq!(links[1].target_range, Extent::on_line(4, 6, 11));
    }
}
