//! Workspace-wide symbol identifiers.

use std::fmt;

use crate::base::FileId;
use crate::syntax::SymbolId;

/// A globally unique handle for a symbol.
///
/// Combines the owning file with the symbol's slot in that file's tree. The
/// handle is only meaningful against the tree it was taken from; any edit to
/// the file invalidates it along with the tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct SymbolRef {
    pub file: FileId,
    pub id: SymbolId,
}

impl SymbolRef {
    #[inline]
    pub const fn new(file: FileId, id: SymbolId) -> Self {
        Self { file, id }
    }
}

impl fmt::Debug for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolRef({:?}:{})", self.file, self.id.index())
    }
}
