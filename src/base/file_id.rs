//! File identities handed out by the workspace file set.

use std::fmt;

/// Identity of a source file within a workspace index.
///
/// A `FileId` is the slot of its path in the [`FileSet`](crate::hir::FileSet)
/// that interned it, so it indexes straight back into that set. Every
/// [`Symbol`](crate::syntax::Symbol) records the `FileId` it was parsed from
/// as its owner, and the tree cache is keyed by it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Id for the `slot`-th interned path.
    pub(crate) fn from_slot(slot: usize) -> Self {
        Self(u32::try_from(slot).unwrap_or(u32::MAX))
    }

    /// Slot of this file's path in its file set.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}
