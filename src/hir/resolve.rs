//! Name resolution — the token under a position to its declaration.
//!
//! Resolution tries a fixed chain of lookups and stops at the first hit:
//!
//! 1. a Variable in the enclosing Entry's data area
//! 2. a Proc of the enclosing Entry
//! 3. a Proc or Variable exposed by a Name block the Entry includes
//! 4. the Name block itself, when the cursor sits on an Include's block name
//! 5. an Entry anywhere in the workspace named by the Entry's `$EXT` list
//!
//! Matching is exact at every step. An include lookup that hits in more than
//! one Include is ambiguous and resolves to nothing.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use super::ids::SymbolRef;
use super::index::WorkspaceIndex;
use super::input::SourceProvider;
use crate::base::{FileId, LineCol};
use crate::syntax::{Symbol, SymbolId, SymbolKind, SymbolTree};

// ============================================================================
// DECLARATION
// ============================================================================

/// A symbol together with the tree that owns it.
#[derive(Clone)]
pub struct Declaration {
    tree: Arc<SymbolTree>,
    id: SymbolId,
}

impl Declaration {
    pub fn new(tree: Arc<SymbolTree>, id: SymbolId) -> Self {
        Self { tree, id }
    }

    pub fn tree(&self) -> &Arc<SymbolTree> {
        &self.tree
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn file(&self) -> FileId {
        self.tree.file()
    }

    pub fn symbol_ref(&self) -> SymbolRef {
        SymbolRef::new(self.file(), self.id)
    }

    pub fn symbol(&self) -> &Symbol {
        self.tree.get(self.id)
    }

    pub fn kind(&self) -> SymbolKind {
        self.symbol().kind
    }

    pub fn name(&self) -> &str {
        &self.symbol().name
    }

    pub fn parent(&self) -> Option<&Symbol> {
        self.symbol().parent.map(|p| self.tree.get(p))
    }
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        self.file() == other.file() && self.id == other.id
    }
}

impl Eq for Declaration {}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = self.symbol();
        write!(
            f,
            "Declaration({:?} {:?} {} @ {:?})",
            self.file(),
            sym.kind,
            sym.name,
            sym.selection
        )
    }
}

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// Result of resolving a token.
#[derive(Clone, Debug)]
pub enum ResolveResult {
    /// Resolved to a single declaration.
    Found(Declaration),
    /// Several includes expose the token.
    Ambiguous(Vec<Declaration>),
    NotFound,
}

impl ResolveResult {
    pub fn declaration(&self) -> Option<&Declaration> {
        match self {
            ResolveResult::Found(decl) => Some(decl),
            _ => None,
        }
    }

    /// The declaration if unambiguous; ambiguity counts as no definition.
    pub fn into_declaration(self) -> Option<Declaration> {
        match self {
            ResolveResult::Found(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ResolveResult::Ambiguous(_))
    }

    fn step(self, step: &'static str) -> Self {
        match &self {
            ResolveResult::Found(decl) => debug!(step, ?decl, "resolved"),
            ResolveResult::Ambiguous(decls) => debug!(step, candidates = decls.len(), "ambiguous"),
            ResolveResult::NotFound => {}
        }
        self
    }

    /// Keep a found or ambiguous result, otherwise try the next step.
    fn or_else(self, next: impl FnOnce() -> ResolveResult) -> ResolveResult {
        match self {
            ResolveResult::NotFound => next(),
            settled => settled,
        }
    }
}

impl From<Option<Declaration>> for ResolveResult {
    fn from(decl: Option<Declaration>) -> Self {
        decl.map_or(ResolveResult::NotFound, ResolveResult::Found)
    }
}

// ============================================================================
// INCLUDE TARGETS
// ============================================================================

/// The decoded name of an Include: `FILE(BLOCK)` or `*(BLOCK)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IncludeTarget<'a> {
    /// Logical file name; `*` is the including file.
    pub file: &'a str,
    /// Name block to pull declarations from.
    pub block: &'a str,
    /// Byte offset of `block` within the include name.
    pub block_offset: usize,
}

impl<'a> IncludeTarget<'a> {
    pub fn parse(name: &'a str) -> Option<Self> {
        let open = name.find('(')?;
        let inner = name[open + 1..].strip_suffix(')')?;
        let file = &name[..open];
        if file.is_empty() || inner.is_empty() {
            return None;
        }
        Some(Self {
            file,
            block: inner,
            block_offset: open + 1,
        })
    }
}

// ============================================================================
// TOKENS
// ============================================================================

/// Characters that may appear in an identifier token; `.` joins segments.
pub(crate) fn is_token_char(c: char) -> bool {
    c == '.' || unicode_ident::is_xid_continue(c)
}

/// Byte range of the maximal identifier token at (or ending at) `col`.
pub(crate) fn token_at(line: &str, col: usize) -> Option<Range<usize>> {
    let col = col.min(line.len());
    if !line.is_char_boundary(col) {
        return None;
    }
    let (before, after) = line.split_at(col);
    let start = before
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_token_char(c))
        .last()
        .map_or(col, |(idx, _)| idx);
    let end = col
        + after
            .char_indices()
            .find(|&(_, c)| !is_token_char(c))
            .map_or(after.len(), |(idx, _)| idx);

    let token = &line[start..end];
    let start = start + (token.len() - token.trim_start_matches('.').len());
    let end = end - (token.len() - token.trim_end_matches('.').len());
    (start < end).then_some(start..end)
}

// ============================================================================
// LOCATOR
// ============================================================================

/// Resolves tokens to declaring symbols through a [`WorkspaceIndex`].
pub struct SymbolLocator<'a, P> {
    index: &'a WorkspaceIndex<P>,
}

impl<'a, P: SourceProvider> SymbolLocator<'a, P> {
    pub fn new(index: &'a WorkspaceIndex<P>) -> Self {
        Self { index }
    }

    /// The declaration of the token at `pos`, if exactly one exists.
    pub fn resolve(&self, file: FileId, pos: LineCol) -> Option<Declaration> {
        self.resolve_detailed(file, pos).into_declaration()
    }

    /// Like [`resolve`](Self::resolve), but keeps ambiguous include hits.
    pub fn resolve_detailed(&self, file: FileId, pos: LineCol) -> ResolveResult {
        let Some(token) = self.token(file, pos) else {
            return ResolveResult::NotFound;
        };
        let tree = self.index.tree(file);
        let entry = tree.entry_at(pos);

        let result = match entry {
            Some(entry) => self
                .find_variable(&tree, entry, &token)
                .step("variable")
                .or_else(|| self.find_proc(&tree, entry, &token).step("proc"))
                .or_else(|| self.find_included(&tree, entry, &token).step("include")),
            None => ResolveResult::NotFound,
        }
        .or_else(|| self.find_include_block(&tree, pos).step("include block"))
        .or_else(|| match entry {
            Some(entry) => self.find_overlay(&tree, entry, &token).step("overlay"),
            None => ResolveResult::NotFound,
        });

        if matches!(result, ResolveResult::NotFound) {
            debug!(%file, %pos, token = token.as_str(), "no declaration");
        }
        result
    }

    fn token(&self, file: FileId, pos: LineCol) -> Option<String> {
        let text = self.index.text(file).ok()?;
        let line = text.split('\n').nth(pos.line as usize)?;
        let line = line.strip_suffix('\r').unwrap_or(line);
        token_at(line, pos.col as usize).map(|range| line[range].to_owned())
    }

    fn find_variable(&self, tree: &Arc<SymbolTree>, entry: SymbolId, token: &str) -> ResolveResult {
        tree.children_of(entry)
            .filter(|(_, sym)| sym.kind == SymbolKind::DataArea)
            .find_map(|(data, _)| tree.find_child(data, &[SymbolKind::Variable], token))
            .map(|id| Declaration::new(Arc::clone(tree), id))
            .into()
    }

    fn find_proc(&self, tree: &Arc<SymbolTree>, entry: SymbolId, token: &str) -> ResolveResult {
        tree.find_child(entry, &[SymbolKind::Proc], token)
            .map(|id| Declaration::new(Arc::clone(tree), id))
            .into()
    }

    fn find_included(&self, tree: &SymbolTree, entry: SymbolId, token: &str) -> ResolveResult {
        let mut hits: Vec<Declaration> = tree
            .children_of(entry)
            .filter(|(_, sym)| sym.kind == SymbolKind::Include)
            .filter_map(|(_, include)| IncludeTarget::parse(&include.name))
            .filter_map(|target| {
                let block = self.name_block(&target, tree.file())?;
                let id = block.tree().find_child(
                    block.id(),
                    &[SymbolKind::Proc, SymbolKind::Variable],
                    token,
                )?;
                Some(Declaration::new(Arc::clone(block.tree()), id))
            })
            .collect();

        match hits.len() {
            0 => ResolveResult::NotFound,
            1 => ResolveResult::Found(hits.remove(0)),
            _ => ResolveResult::Ambiguous(hits),
        }
    }

    fn find_include_block(&self, tree: &SymbolTree, pos: LineCol) -> ResolveResult {
        for (_, include) in tree.iter().filter(|(_, s)| s.kind == SymbolKind::Include) {
            if include.selection.start.line != pos.line {
                continue;
            }
            let Some(target) = IncludeTarget::parse(&include.name) else {
                continue;
            };
            let start = include.selection.start.col as usize + target.block_offset;
            let end = start + target.block.len();
            if (start..=end).contains(&(pos.col as usize)) {
                return self.name_block(&target, tree.file()).into();
            }
        }
        ResolveResult::NotFound
    }

    fn find_overlay(&self, tree: &SymbolTree, entry: SymbolId, token: &str) -> ResolveResult {
        let Some(reference) = tree
            .children_of(entry)
            .filter(|(_, sym)| sym.kind == SymbolKind::Ext)
            .find_map(|(ext, _)| tree.find_child(ext, &[SymbolKind::OverlayRef], token))
        else {
            return ResolveResult::NotFound;
        };
        let target = &tree.get(reference).name;

        self.index
            .all_trees()
            .into_iter()
            .find_map(|candidate| {
                let id = candidate.find_root(SymbolKind::Entry, target)?;
                Some(Declaration::new(candidate, id))
            })
            .into()
    }

    /// The Name block an include target points at.
    pub fn name_block(&self, target: &IncludeTarget<'_>, origin: FileId) -> Option<Declaration> {
        self.index
            .trees_by_logical_name(target.file, origin)
            .into_iter()
            .find_map(|tree| {
                let id = tree.find_root(SymbolKind::Name, target.block)?;
                Some(Declaration::new(tree, id))
            })
    }
}
