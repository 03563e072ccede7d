//! The static rule table driving the structural parser.
//!
//! Every construct is a row of plain data: a begin pattern, zero or more
//! terminators, the kind it produces, the rules allowed directly inside it and
//! an optional cap on its child count. Patterns may name two groups:
//!
//! - `m`: the marked text the symbol occupies (defaults to the whole match).
//!   Scanning resumes right after it.
//! - `name`: the symbol's name (defaults to `m`).

use std::sync::LazyLock;

use regex::Regex;

use super::tree::SymbolKind;

pub(crate) type RuleId = usize;

pub(crate) const ENTRY: RuleId = 0;
pub(crate) const NAME: RuleId = 1;
pub(crate) const DATA_AREA: RuleId = 2;
pub(crate) const VARIABLE: RuleId = 3;
pub(crate) const ALNUM_MASK: RuleId = 4;
pub(crate) const NUMERIC_MASK: RuleId = 5;
pub(crate) const CODE_STRING_MASK: RuleId = 6;
pub(crate) const CODE_STRING_VALUE: RuleId = 7;
pub(crate) const EXT: RuleId = 8;
pub(crate) const OVERLAY_REF: RuleId = 9;
pub(crate) const PROG: RuleId = 10;
pub(crate) const PROC: RuleId = 11;
pub(crate) const INCLUDE: RuleId = 12;

/// Rules that may open at file level.
pub(crate) const TOP_LEVEL: &[RuleId] = &[ENTRY, NAME];

macro_rules! ident {
    () => {
        r"[A-Z](?:\.?\w)*"
    };
}

struct TerminatorDef {
    pattern: &'static str,
    boundary: bool,
}

/// A terminator that consumes its text (`ENDPROC`, `RETURN`, `^^`).
const fn inclusive(pattern: &'static str) -> TerminatorDef {
    TerminatorDef {
        pattern,
        boundary: false,
    }
}

/// A terminator that marks where the next construct begins.
const fn boundary(pattern: &'static str) -> TerminatorDef {
    TerminatorDef {
        pattern,
        boundary: true,
    }
}

struct RuleDef {
    kind: SymbolKind,
    begin: &'static str,
    ends: &'static [TerminatorDef],
    children: &'static [RuleId],
    max_children: Option<usize>,
}

/// Indexed by the `RuleId` constants above; order matters.
static RULE_DEFS: [RuleDef; 13] = [
    // ENTRY
    RuleDef {
        kind: SymbolKind::Entry,
        begin: concat!(r"^\$ENTRY\s+(?P<name>", ident!(), ")"),
        ends: &[boundary(r"^\$(?:ENTRY|NAME)\b")],
        children: &[DATA_AREA, EXT, PROG, PROC, INCLUDE],
        max_children: None,
    },
    // NAME
    RuleDef {
        kind: SymbolKind::Name,
        begin: concat!(r"^\$NAME\s+(?P<name>", ident!(), ")"),
        ends: &[boundary(r"^\$")],
        children: &[PROC, VARIABLE],
        max_children: None,
    },
    // DATA_AREA
    RuleDef {
        kind: SymbolKind::DataArea,
        begin: r"^\$DATA\b",
        ends: &[boundary(r"^\$")],
        children: &[VARIABLE],
        max_children: None,
    },
    // VARIABLE
    RuleDef {
        kind: SymbolKind::Variable,
        begin: concat!(r"^(?P<m>", ident!(), r")[ \t]+\S"),
        ends: &[],
        children: &[ALNUM_MASK, NUMERIC_MASK, CODE_STRING_MASK],
        max_children: Some(1),
    },
    // ALNUM_MASK
    RuleDef {
        kind: SymbolKind::EditMask,
        begin: r"(?:^|\s)(?P<m>[AX]\d+)\b",
        ends: &[],
        children: &[],
        max_children: None,
    },
    // NUMERIC_MASK
    RuleDef {
        kind: SymbolKind::EditMask,
        begin: r"(?:^|\s)(?P<m>[NUSFZ][BLP\-]*\d+(?:\.\d+)?)\b",
        ends: &[],
        children: &[],
        max_children: None,
    },
    // CODE_STRING_MASK
    RuleDef {
        kind: SymbolKind::EditMask,
        begin: r"(?:^|\s)(?P<m>C)\^",
        ends: &[inclusive(r"\^\^")],
        children: &[CODE_STRING_VALUE],
        max_children: None,
    },
    // CODE_STRING_VALUE
    RuleDef {
        kind: SymbolKind::CodeStringValue,
        begin: r"\^(?P<m>\w+)",
        ends: &[],
        children: &[],
        max_children: None,
    },
    // EXT
    RuleDef {
        kind: SymbolKind::Ext,
        begin: r"^\$EXT\b",
        ends: &[boundary(r"^\$")],
        children: &[OVERLAY_REF],
        max_children: None,
    },
    // OVERLAY_REF
    RuleDef {
        kind: SymbolKind::OverlayRef,
        begin: concat!(r"(?:^|[\s,])(?P<m>", ident!(), ")"),
        ends: &[],
        children: &[],
        max_children: None,
    },
    // PROG
    RuleDef {
        kind: SymbolKind::Prog,
        begin: r"^\$PROG(?:\(.*\))?",
        ends: &[
            inclusive(r"\b(?:RETURN|QUITZUG)\b"),
            boundary(concat!(r"^", ident!(), r"[ \t]+PROC\b")),
            boundary(r"^\$INCLUDE\b"),
        ],
        children: &[],
        max_children: None,
    },
    // PROC
    RuleDef {
        kind: SymbolKind::Proc,
        begin: concat!(r"^(?P<name>", ident!(), r")[ \t]+PROC\b(?:\(.*\))?"),
        ends: &[inclusive(r"\bENDPROC\b")],
        children: &[],
        max_children: None,
    },
    // INCLUDE
    RuleDef {
        kind: SymbolKind::Include,
        begin: r"^\$INCLUDE\s+(?P<name>(?:[\w.]+|\*)\([^)]*\))",
        ends: &[],
        children: &[],
        max_children: None,
    },
];

/// A begin-pattern hit on a line.
#[derive(Clone, Debug)]
pub(crate) struct BeginMatch {
    pub rule: RuleId,
    /// Byte range of the marked text.
    pub start: usize,
    pub end: usize,
    /// Byte range of the name.
    pub name_start: usize,
    pub name_end: usize,
}

/// A terminator hit on a line.
#[derive(Copy, Clone, Debug)]
pub(crate) struct EndMatch {
    pub start: usize,
    pub end: usize,
    pub boundary: bool,
}

pub(crate) struct Terminator {
    regex: Regex,
    boundary: bool,
}

impl Terminator {
    pub fn is_boundary(&self) -> bool {
        self.boundary
    }

    pub fn find(&self, line: &str, offset: usize) -> Option<EndMatch> {
        self.regex.find_at(line, offset).map(|m| EndMatch {
            start: m.start(),
            end: m.end(),
            boundary: self.boundary,
        })
    }
}

pub(crate) struct Rule {
    pub id: RuleId,
    pub kind: SymbolKind,
    begin: Regex,
    pub ends: Vec<Terminator>,
    pub children: &'static [RuleId],
    pub max_children: Option<usize>,
}

impl Rule {
    /// Rules with neither children nor terminators are emitted but never opened.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.ends.is_empty()
    }

    /// Frames of this rule close only implicitly (next line or cap).
    pub fn is_implicit(&self) -> bool {
        self.ends.is_empty()
    }

    pub fn find_begin(&self, line: &str, offset: usize) -> Option<BeginMatch> {
        let caps = self.begin.captures_at(line, offset)?;
        let marked = caps.name("m").or_else(|| caps.get(0))?;
        let name = caps.name("name").unwrap_or(marked);
        Some(BeginMatch {
            rule: self.id,
            start: marked.start(),
            end: marked.end(),
            name_start: name.start(),
            name_end: name.end(),
        })
    }
}

pub(crate) struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    fn compile() -> Self {
        let rules = RULE_DEFS
            .iter()
            .enumerate()
            .map(|(id, def)| Rule {
                id,
                kind: def.kind,
                begin: Regex::new(def.begin).expect("grammar begin pattern is valid"),
                ends: def
                    .ends
                    .iter()
                    .map(|end| Terminator {
                        regex: Regex::new(end.pattern).expect("grammar end pattern is valid"),
                        boundary: end.boundary,
                    })
                    .collect(),
                children: def.children,
                max_children: def.max_children,
            })
            .collect();
        Self { rules }
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }
}

pub(crate) static GRAMMAR: LazyLock<Grammar> = LazyLock::new(Grammar::compile);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_patterns_compile() {
        for def in &RULE_DEFS {
            assert!(Regex::new(def.begin).is_ok(), "bad begin: {}", def.begin);
            for end in def.ends {
                assert!(Regex::new(end.pattern).is_ok(), "bad end: {}", end.pattern);
            }
        }
    }

    #[test]
    fn test_rule_ids_match_table_order() {
        let grammar = &*GRAMMAR;
        assert_eq!(grammar.rule(ENTRY).kind, SymbolKind::Entry);
        assert_eq!(grammar.rule(NAME).kind, SymbolKind::Name);
        assert_eq!(grammar.rule(DATA_AREA).kind, SymbolKind::DataArea);
        assert_eq!(grammar.rule(VARIABLE).kind, SymbolKind::Variable);
        assert_eq!(grammar.rule(CODE_STRING_VALUE).kind, SymbolKind::CodeStringValue);
        assert_eq!(grammar.rule(OVERLAY_REF).kind, SymbolKind::OverlayRef);
        assert_eq!(grammar.rule(PROG).kind, SymbolKind::Prog);
        assert_eq!(grammar.rule(PROC).kind, SymbolKind::Proc);
        assert_eq!(grammar.rule(INCLUDE).kind, SymbolKind::Include);
    }

    #[test]
    fn test_leaf_rules() {
        let grammar = &*GRAMMAR;
        assert!(grammar.rule(INCLUDE).is_leaf());
        assert!(grammar.rule(ALNUM_MASK).is_leaf());
        assert!(!grammar.rule(PROG).is_leaf());
        assert!(!grammar.rule(VARIABLE).is_leaf());
        assert!(grammar.rule(VARIABLE).is_implicit());
    }

    #[rstest]
    #[case(ALNUM_MASK, "AMT A12", Some("A12"))]
    #[case(ALNUM_MASK, "AMT X5", Some("X5"))]
    #[case(ALNUM_MASK, "AMT A12B", None)]
    #[case(NUMERIC_MASK, "AMT N9.2", Some("N9.2"))]
    #[case(NUMERIC_MASK, "AMT SBL-7", Some("SBL-7"))]
    #[case(NUMERIC_MASK, "AMT Z4", Some("Z4"))]
    #[case(NUMERIC_MASK, "AMT Q4", None)]
    #[case(CODE_STRING_MASK, "KIND C^A^B^^", Some("C"))]
    #[case(CODE_STRING_MASK, "KIND CX^A^^", None)]
    fn test_edit_mask_patterns(
        #[case] rule: RuleId,
        #[case] line: &str,
        #[case] expected: Option<&str>,
    ) {
        let hit = GRAMMAR.rule(rule).find_begin(line, 3);
        assert_eq!(hit.map(|m| &line[m.start..m.end]), expected);
    }

    #[rstest]
    #[case(PROC, "CALC PROC", "CALC")]
    #[case(PROC, "CALC PROC(A, B)", "CALC")]
    #[case(ENTRY, "$ENTRY ORD.MAIN", "ORD.MAIN")]
    #[case(NAME, "$NAME SHARED", "SHARED")]
    #[case(INCLUDE, "$INCLUDE STOCK(SHARED)", "STOCK(SHARED)")]
    #[case(INCLUDE, "$INCLUDE *(LOCAL)", "*(LOCAL)")]
    #[case(VARIABLE, "QTY N5", "QTY")]
    fn test_name_group(#[case] rule: RuleId, #[case] line: &str, #[case] name: &str) {
        let hit = GRAMMAR.rule(rule).find_begin(line, 0).expect("rule should match");
        assert_eq!(&line[hit.name_start..hit.name_end], name);
    }

    #[test]
    fn test_line_anchor_respects_offset() {
        // `^` anchors to the real line start, not the scan offset.
        let rule = GRAMMAR.rule(VARIABLE);
        assert!(rule.find_begin("AMT N9", 0).is_some());
        assert!(rule.find_begin("X AMT N9", 2).is_none());
    }

    #[test]
    fn test_variable_requires_following_token() {
        assert!(GRAMMAR.rule(VARIABLE).find_begin("FILLER", 0).is_none());
        assert!(GRAMMAR.rule(VARIABLE).find_begin("FILLER   ", 0).is_none());
    }
}
