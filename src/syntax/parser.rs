//! Single-pass structural parser: source text → [`SymbolTree`].
//!
//! The parser walks the text line by line, left to right, keeping an explicit
//! stack of open frames. At each offset it compares the earliest begin-match
//! among the rules the top frame allows with the earliest terminator match;
//! a terminator at or before the begin-match closes first, otherwise the
//! begin-match opens (or emits) a new symbol. Nothing here can fail: frames
//! still open at end of input are closed at end of file.

use smol_str::SmolStr;
use tracing::{debug, trace};

use super::grammar::{BeginMatch, EndMatch, GRAMMAR, Grammar, RuleId, TOP_LEVEL};
use super::tree::{Symbol, SymbolId, SymbolTree};
use crate::base::{Extent, FileId, LineCol};

/// Parse one file's text into its symbol tree.
///
/// Pure: identical text always yields an identical tree.
pub fn parse(file: FileId, text: &str) -> SymbolTree {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut parser = Parser::new(&GRAMMAR, file, &lines);
    for (line_no, raw) in lines.iter().enumerate() {
        let line_no = line_no as u32;
        if line_no > 0 {
            parser.close_implicit_frames(line_no);
        }
        parser.scan_line(line_no, strip_comments(raw));
    }
    let tree = parser.finish();

    debug!(
        file = %file,
        symbols = tree.len(),
        roots = tree.roots().len(),
        "parsed file"
    );
    tree
}

/// Blank out comments while keeping the columns of the remaining text.
///
/// A `*` in column 0 comments the whole line; `<<` comments the rest of it.
fn strip_comments(line: &str) -> &str {
    if line.starts_with('*') {
        return "";
    }
    match line.find("<<") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[derive(Copy, Clone, Debug)]
struct Frame {
    rule: RuleId,
    symbol: SymbolId,
}

/// A terminator hit together with the depth of the frame it belongs to.
#[derive(Copy, Clone, Debug)]
struct Closing {
    depth: usize,
    hit: EndMatch,
}

struct Parser<'a> {
    grammar: &'a Grammar,
    file: FileId,
    lines: &'a [&'a str],
    symbols: Vec<Symbol>,
    roots: Vec<SymbolId>,
    stack: Vec<Frame>,
}

impl<'a> Parser<'a> {
    fn new(grammar: &'a Grammar, file: FileId, lines: &'a [&'a str]) -> Self {
        Self {
            grammar,
            file,
            lines,
            symbols: Vec::new(),
            roots: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn scan_line(&mut self, line_no: u32, line: &str) {
        let mut offset = 0;
        loop {
            let child = self.next_child_match(line, offset);
            let closing = self.next_closing(line, offset);

            match (closing, child) {
                (Some(closing), child)
                    if child.as_ref().is_none_or(|c| closing.hit.start <= c.start) =>
                {
                    let at = if closing.hit.boundary {
                        self.boundary_position(line_no, closing.hit.start)
                    } else {
                        offset = closing.hit.end;
                        LineCol::new(line_no, closing.hit.end as u32)
                    };
                    self.close_down_to(closing.depth, at);
                }
                (_, Some(child)) => {
                    offset = child.end;
                    self.open(line_no, line, child);
                }
                _ => break,
            }
        }
    }

    /// Earliest begin-match among the rules the top frame permits.
    ///
    /// Equal starts keep the rule listed first by the parent.
    fn next_child_match(&self, line: &str, offset: usize) -> Option<BeginMatch> {
        let permitted = match self.stack.last() {
            Some(frame) => self.grammar.rule(frame.rule).children,
            None => TOP_LEVEL,
        };
        let mut best: Option<BeginMatch> = None;
        for &rule in permitted {
            if let Some(hit) = self.grammar.rule(rule).find_begin(line, offset) {
                if best.as_ref().is_none_or(|b| hit.start < b.start) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    /// Earliest terminator hit on the rest of the line.
    ///
    /// The top frame offers all of its terminators; enclosing frames offer
    /// only their boundary terminators, which close everything above them.
    /// Ties go to the innermost frame.
    fn next_closing(&self, line: &str, offset: usize) -> Option<Closing> {
        let mut best: Option<Closing> = None;
        for (depth, frame) in self.stack.iter().enumerate().rev() {
            let is_top = depth + 1 == self.stack.len();
            for end in &self.grammar.rule(frame.rule).ends {
                if !is_top && !end.is_boundary() {
                    continue;
                }
                if let Some(hit) = end.find(line, offset) {
                    if best.is_none_or(|b| hit.start < b.hit.start) {
                        best = Some(Closing { depth, hit });
                    }
                }
            }
        }
        best
    }

    fn open(&mut self, line_no: u32, line: &str, hit: BeginMatch) {
        let rule = self.grammar.rule(hit.rule);
        let parent = self.stack.last().map(|frame| frame.symbol);
        let id = SymbolId::new(self.symbols.len() as u32);

        let extent = Extent::on_line(line_no, hit.start as u32, hit.end as u32);
        self.symbols.push(Symbol {
            owner: self.file,
            name: SmolStr::new(&line[hit.name_start..hit.name_end]),
            detail: SmolStr::new(&line[hit.start..hit.end]),
            kind: rule.kind,
            extent,
            selection: Extent::on_line(line_no, hit.name_start as u32, hit.name_end as u32),
            children: Vec::new(),
            parent,
        });
        match parent {
            Some(parent) => self.symbols[parent.index()].children.push(id),
            None => self.roots.push(id),
        }

        if rule.is_leaf() {
            self.close_full_frames(extent.end);
        } else {
            trace!(kind = ?rule.kind, at = %extent.start, "open frame");
            self.stack.push(Frame {
                rule: hit.rule,
                symbol: id,
            });
        }
    }

    /// Close every frame above `depth` and the frame at `depth` itself.
    fn close_down_to(&mut self, depth: usize, at: LineCol) {
        while self.stack.len() > depth {
            self.pop(at);
        }
        self.close_full_frames(at);
    }

    /// Cascade-close capped frames whose child quota is met.
    fn close_full_frames(&mut self, at: LineCol) {
        while let Some(frame) = self.stack.last() {
            let Some(cap) = self.grammar.rule(frame.rule).max_children else {
                break;
            };
            if self.symbols[frame.symbol.index()].children.len() < cap {
                break;
            }
            self.pop(at);
        }
    }

    /// Frames without terminators do not outlive their line.
    fn close_implicit_frames(&mut self, line_no: u32) {
        let prev = line_no - 1;
        let at = LineCol::new(prev, self.line_len(prev));
        while let Some(frame) = self.stack.last() {
            if !self.grammar.rule(frame.rule).is_implicit() {
                break;
            }
            self.pop(at);
            self.close_full_frames(at);
        }
    }

    fn pop(&mut self, at: LineCol) {
        if let Some(frame) = self.stack.pop() {
            let symbol = &mut self.symbols[frame.symbol.index()];
            symbol.extent.end = symbol.extent.end.max(at);
            trace!(kind = ?symbol.kind, end = %symbol.extent.end, "close frame");
        }
    }

    /// Where a construct ends when the next one begins at `col`.
    ///
    /// A boundary in column 0 ends the construct on the previous line.
    fn boundary_position(&self, line_no: u32, col: usize) -> LineCol {
        if col == 0 && line_no > 0 {
            LineCol::new(line_no - 1, self.line_len(line_no - 1))
        } else {
            LineCol::new(line_no, col as u32)
        }
    }

    fn line_len(&self, line_no: u32) -> u32 {
        self.lines.get(line_no as usize).map_or(0, |l| l.len() as u32)
    }

    fn finish(mut self) -> SymbolTree {
        let last = self.lines.len().saturating_sub(1) as u32;
        let eof = LineCol::new(last, self.line_len(last));
        while !self.stack.is_empty() {
            self.pop(eof);
        }
        SymbolTree::new(self.file, self.symbols, self.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SymbolKind;
    use rstest::rstest;

    fn parse_text(text: &str) -> SymbolTree {
        parse(FileId::new(0), text)
    }

    /// Render a tree as `Kind:name[children]` for compact assertions.
    fn outline(tree: &SymbolTree) -> String {
        fn render(tree: &SymbolTree, id: SymbolId, out: &mut String) {
            let sym = tree.get(id);
            out.push_str(&format!("{:?}:{}", sym.kind, sym.name));
            if !sym.children.is_empty() {
                out.push('[');
                for (i, &child) in sym.children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    render(tree, child, out);
                }
                out.push(']');
            }
        }
        let mut out = String::new();
        for (i, &root) in tree.roots().iter().enumerate() {
            if i > 0 {
                out.push_str(" | ");
            }
            render(tree, root, &mut out);
        }
        out
    }

    const ORDER: &str = "$ENTRY ORD\n$DATA\nAMT N9.2\n$PROG\nCALC PROC\nENDPROC\nRETURN\n";

    #[test]
    fn test_entry_with_data_prog_and_proc() {
        let tree = parse_text(ORDER);

        assert_eq!(
            outline(&tree),
            "Entry:ORD[DataArea:$DATA[Variable:AMT[EditMask:N9.2]] Prog:$PROG Proc:CALC]"
        );
    }

    #[test]
    fn test_extents_follow_terminators() {
        let tree = parse_text(ORDER);
        let entry = tree.roots()[0];
        let children: Vec<_> = tree.children_of(entry).map(|(_, s)| s.clone()).collect();

        // $DATA ends where $PROG begins
        assert_eq!(children[0].extent.end, LineCol::new(2, 8));
        // $PROG ends right before the first PROC
        assert_eq!(children[1].extent, Extent::new(LineCol::new(3, 0), LineCol::new(3, 5)));
        // PROC ends after ENDPROC
        assert_eq!(children[2].extent, Extent::new(LineCol::new(4, 0), LineCol::new(5, 7)));
        assert_eq!(children[2].selection, Extent::on_line(4, 0, 4));
        // Entry runs to end of file
        assert_eq!(tree.get(entry).extent.end, LineCol::new(7, 0));
    }

    #[test]
    fn test_variable_cap_closes_after_mask() {
        let tree = parse_text("$ENTRY A\n$DATA\nAMT N9.2\nQTY A4\n");
        let (data, _) = tree.children_of(tree.roots()[0]).next().unwrap();
        let vars: Vec<_> = tree.children_of(data).map(|(_, s)| s.clone()).collect();

        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "AMT");
        assert_eq!(vars[0].extent, Extent::on_line(2, 0, 8));
        assert_eq!(vars[1].name, "QTY");
        assert_eq!(vars[1].children.len(), 1);
    }

    #[test]
    fn test_variable_without_mask_closes_at_line_end() {
        let tree = parse_text("$ENTRY A\n$DATA\nAMT BOGUS\nQTY N5\n");

        assert_eq!(
            outline(&tree),
            "Entry:A[DataArea:$DATA[Variable:AMT Variable:QTY[EditMask:N5]]]"
        );
        let (data, _) = tree.children_of(tree.roots()[0]).next().unwrap();
        let (_, amt) = tree.children_of(data).next().unwrap();
        assert_eq!(amt.extent, Extent::on_line(2, 0, 9));
    }

    #[test]
    fn test_code_string_mask_cascades_variable_close() {
        let tree = parse_text("$ENTRY A\n$DATA\nKIND C^OPEN^DONE^^\nQTY N5\n");

        assert_eq!(
            outline(&tree),
            "Entry:A[DataArea:$DATA[Variable:KIND[EditMask:C[CodeStringValue:OPEN CodeStringValue:DONE]] Variable:QTY[EditMask:N5]]]"
        );
        let (data, _) = tree.children_of(tree.roots()[0]).next().unwrap();
        let (kind_id, kind) = tree.children_of(data).next().unwrap();
        assert_eq!(kind.extent.end, LineCol::new(2, 18));
        let (_, mask) = tree.children_of(kind_id).next().unwrap();
        assert_eq!(mask.extent, Extent::on_line(2, 5, 18));
    }

    #[test]
    fn test_name_block_prefers_proc_over_variable() {
        let tree = parse_text("$NAME SHARED\nQTY N5\nBUMP PROC\nQTY = QTY + 1\nENDPROC\n");

        assert_eq!(
            outline(&tree),
            "Name:SHARED[Variable:QTY[EditMask:N5] Proc:BUMP]"
        );
    }

    #[test]
    fn test_ext_collects_overlay_references() {
        let tree = parse_text("$ENTRY A\n$EXT ORDB, ORDC\nORDD\n$PROG\nRETURN\n");

        assert_eq!(
            outline(&tree),
            "Entry:A[Ext:$EXT[OverlayRef:ORDB OverlayRef:ORDC OverlayRef:ORDD] Prog:$PROG]"
        );
    }

    #[test]
    fn test_include_is_leaf_and_ends_prog() {
        let tree = parse_text("$ENTRY B\n$PROG\nX = 1\n$INCLUDE STOCK(SHARED)\n$INCLUDE *(LOCAL)\n");

        assert_eq!(
            outline(&tree),
            "Entry:B[Prog:$PROG Include:STOCK(SHARED) Include:*(LOCAL)]"
        );
        let (_, include) = tree.children_of(tree.roots()[0]).nth(1).unwrap();
        assert_eq!(include.detail, "$INCLUDE STOCK(SHARED)");
        assert_eq!(include.selection, Extent::on_line(3, 9, 22));
    }

    #[rstest]
    #[case::quitzug("$ENTRY A\n$PROG(MAIN)\nQUITZUG\nX = 1\n", "$PROG(MAIN)", LineCol::new(2, 7))]
    #[case::return_mid_line("$ENTRY A\n$PROG\nIF X RETURN\n", "$PROG", LineCol::new(2, 11))]
    #[case::longer_identifier("$ENTRY A\n$PROG\nXRETURN = RETURNED\nRETURN\n", "$PROG", LineCol::new(3, 6))]
    fn test_prog_terminators(#[case] text: &str, #[case] name: &str, #[case] end: LineCol) {
        let tree = parse_text(text);
        let (_, prog) = tree.children_of(tree.roots()[0]).next().unwrap();

        assert_eq!(prog.kind, SymbolKind::Prog);
        assert_eq!(prog.name, name);
        assert_eq!(prog.extent, Extent::new(LineCol::new(1, 0), end));
    }

    #[test]
    fn test_comments_never_match() {
        let text = "* $ENTRY HIDDEN\n$ENTRY A << $ENTRY ALSO.HIDDEN\n$DATA\nAMT N5 << QTY N5\n";
        let tree = parse_text(text);

        assert_eq!(outline(&tree), "Entry:A[DataArea:$DATA[Variable:AMT[EditMask:N5]]]");
    }

    #[test]
    fn test_unterminated_proc_is_closed_by_next_entry() {
        let tree = parse_text("$ENTRY A\nLOOP PROC\nX = 1\n$ENTRY B\n$PROG\n");

        assert_eq!(outline(&tree), "Entry:A[Proc:LOOP] | Entry:B[Prog:$PROG]");
        let first = tree.get(tree.roots()[0]);
        assert_eq!(first.extent.end, LineCol::new(2, 5));
        let (_, proc) = tree.children_of(tree.roots()[0]).next().unwrap();
        assert_eq!(proc.extent.end, LineCol::new(2, 5));
    }

    #[test]
    fn test_unterminated_frames_force_closed_at_eof() {
        let tree = parse_text("$ENTRY A\n$DATA\nKIND C^OPEN");

        let entry = tree.get(tree.roots()[0]);
        assert_eq!(entry.extent.end, LineCol::new(2, 11));
        for (_, sym) in tree.iter() {
            assert!(sym.extent.end <= LineCol::new(2, 11));
        }
    }

    #[test]
    fn test_crlf_sources_match_lf_sources() {
        let lf = parse_text(ORDER);
        let crlf = parse_text(&ORDER.replace('\n', "\r\n"));

        assert_eq!(lf, crlf);
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse_text(ORDER), parse_text(ORDER));
    }

    #[rstest]
    #[case("", 0)]
    #[case("RANDOM TEXT\n", 0)]
    #[case("$ENTRY A\n", 1)]
    #[case("$ENTRY A\n$NAME B\n$ENTRY C\n", 3)]
    #[case("$NAME N\nP PROC\n$ENTRY A\n$DATA\nX N1\n$EXT B\n", 2)]
    fn test_root_count_equals_unit_directives(#[case] text: &str, #[case] expected: usize) {
        let tree = parse_text(text);

        assert_eq!(tree.roots().len(), expected);
        assert!(tree.roots().iter().all(|&r| tree.get(r).kind.is_unit()));
    }

    #[test]
    fn test_containment_holds_for_every_symbol() {
        let text = "$ENTRY A\n$DATA\nKIND C^X^Y^^\nAMT N9.2\n$EXT B\n$PROG\nCALC PROC\nENDPROC\nRETURN\n$NAME N\nQ A2\n";
        let tree = parse_text(text);

        for (id, sym) in tree.iter() {
            assert!(sym.extent.contains_extent(&sym.selection), "{:?}", sym);
            for (_, child) in tree.children_of(id) {
                assert!(sym.extent.contains_extent(&child.extent), "{:?} ⊄ {:?}", child, sym);
                assert_eq!(child.parent, Some(id));
            }
        }
    }
}
