//! Parse tree produced by a successful match
//!
//! Every node names the rule or terminal it represents and the contiguous
//! span of input it consumed, with children in match order. Nodes are created
//! fresh per parse call and owned by the caller; they hold offsets into the
//! input rather than copies of it.
//!
//! Zero-width matches (an empty `Optional`, a zero-repetition `ZeroOrMore`,
//! lookaheads, end-of-input) are elided: they contribute no node. A terminal
//! node's span includes the trivia skipped before the token, so concatenating
//! the text of a node's children reproduces exactly the consumed input.

use serde::{Deserialize, Serialize};

/// A half-open byte range `start..end` into the matched input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The slice of `input` this span covers.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

/// Whether a node stands for a grammar rule or a matched terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Rule,
    Terminal,
}

/// A labeled span of consumed input with ordered child nodes.
///
/// For `Rule` nodes the label is the rule name; for `Terminal` nodes it is
/// the matched text (literal token or character).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseNode {
    pub kind: NodeKind,
    pub label: String,
    pub span: Span,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub(crate) fn terminal(label: impl Into<String>, span: Span) -> Self {
        Self {
            kind: NodeKind::Terminal,
            label: label.into(),
            span,
            children: Vec::new(),
        }
    }

    pub(crate) fn rule(label: impl Into<String>, span: Span, children: Vec<ParseNode>) -> Self {
        Self {
            kind: NodeKind::Rule,
            label: label.into(),
            span,
            children,
        }
    }

    pub fn is_rule(&self) -> bool {
        self.kind == NodeKind::Rule
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == NodeKind::Terminal
    }

    /// The slice of `input` this node consumed.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        self.span.text(input)
    }

    /// First direct child with the given label.
    pub fn child(&self, label: &str) -> Option<&ParseNode> {
        self.children.iter().find(|c| c.label == label)
    }

    /// First node with the given label, depth-first, including self.
    pub fn find(&self, label: &str) -> Option<&ParseNode> {
        if self.label == label {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(label))
    }

    /// All terminal nodes beneath (or at) this node, in match order.
    pub fn terminals(&self) -> Vec<&ParseNode> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a ParseNode>) {
        if self.is_terminal() {
            out.push(self);
            return;
        }
        for child in &self.children {
            child.collect_terminals(out);
        }
    }
}
