//! The symbol tree produced by the structural parser.
//!
//! A file's tree is an arena of [`Symbol`] records addressed by [`SymbolId`].
//! Parents own their children through the `children` id lists; the `parent`
//! field is a plain lookup handle. Trees are built once per parse and never
//! mutated afterwards, so they are shared as `Arc<SymbolTree>`.

use std::fmt;

use smol_str::SmolStr;

use crate::base::{Extent, FileId, LineCol};

/// The closed set of constructs the grammar recognizes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Entry,
    Name,
    Include,
    Ext,
    OverlayRef,
    DataArea,
    Prog,
    Proc,
    Variable,
    EditMask,
    CodeStringValue,
}

impl SymbolKind {
    /// Short display label, matching the directive or keyword that opens it.
    pub fn label(self) -> &'static str {
        match self {
            SymbolKind::Entry => "$ENTRY",
            SymbolKind::Name => "$NAME",
            SymbolKind::Include => "$INCLUDE",
            SymbolKind::Ext => "$EXT",
            SymbolKind::OverlayRef => "overlay",
            SymbolKind::DataArea => "$DATA",
            SymbolKind::Prog => "$PROG",
            SymbolKind::Proc => "PROC",
            SymbolKind::Variable => "variable",
            SymbolKind::EditMask => "edit mask",
            SymbolKind::CodeStringValue => "code value",
        }
    }

    /// Top-level units: the only kinds that appear as tree roots.
    pub fn is_unit(self) -> bool {
        matches!(self, SymbolKind::Entry | SymbolKind::Name)
    }
}

/// File-local handle of a symbol inside its [`SymbolTree`].
///
/// Assigned in source order as the parser emits symbols, so identical text
/// yields identical ids.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// A node in a file's structural tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    /// The file this symbol was parsed from.
    pub owner: FileId,
    /// The identifier or keyword text the rule designates as the name.
    pub name: SmolStr,
    /// The full matched text.
    pub detail: SmolStr,
    pub kind: SymbolKind,
    /// Everything the construct occupies, children included.
    pub extent: Extent,
    /// Just the name token; always inside `extent`.
    pub selection: Extent,
    pub children: Vec<SymbolId>,
    pub parent: Option<SymbolId>,
}

/// The parse result for one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTree {
    file: FileId,
    symbols: Vec<Symbol>,
    roots: Vec<SymbolId>,
}

impl SymbolTree {
    pub(crate) fn new(file: FileId, symbols: Vec<Symbol>, roots: Vec<SymbolId>) -> Self {
        Self {
            file,
            symbols,
            roots,
        }
    }

    /// A tree with no symbols, used for missing or unreadable files.
    pub fn empty(file: FileId) -> Self {
        Self::new(file, Vec::new(), Vec::new())
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// Top-level symbols in source order.
    pub fn roots(&self) -> &[SymbolId] {
        &self.roots
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols in pre-order (parents before children, source order).
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(idx, sym)| (SymbolId::new(idx as u32), sym))
    }

    pub fn children_of(&self, id: SymbolId) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.get(id)
            .children
            .iter()
            .map(move |&child| (child, self.get(child)))
    }

    /// Strict ancestors of `id`, innermost first.
    pub fn ancestors(&self, id: SymbolId) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        std::iter::successors(self.get(id).parent, move |&p| self.get(p).parent)
            .map(move |p| (p, self.get(p)))
    }

    /// Nearest ancestor of the given kind.
    pub fn enclosing(&self, id: SymbolId, kind: SymbolKind) -> Option<SymbolId> {
        self.ancestors(id)
            .find(|(_, sym)| sym.kind == kind)
            .map(|(ancestor, _)| ancestor)
    }

    /// First direct child of `id` whose kind is in `kinds` and whose name is `name`.
    pub fn find_child(&self, id: SymbolId, kinds: &[SymbolKind], name: &str) -> Option<SymbolId> {
        self.children_of(id)
            .find(|(_, sym)| kinds.contains(&sym.kind) && sym.name == name)
            .map(|(child, _)| child)
    }

    /// First top-level symbol of `kind` named `name`.
    pub fn find_root(&self, kind: SymbolKind, name: &str) -> Option<SymbolId> {
        self.roots
            .iter()
            .copied()
            .find(|&root| {
                let sym = self.get(root);
                sym.kind == kind && sym.name == name
            })
    }

    /// The Entry whose extent contains `pos`.
    pub fn entry_at(&self, pos: LineCol) -> Option<SymbolId> {
        self.roots.iter().copied().find(|&root| {
            let sym = self.get(root);
            sym.kind == SymbolKind::Entry && sym.extent.contains(pos)
        })
    }
}
