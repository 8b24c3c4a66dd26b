//! Match expression model for the Trellis engine
//!
//! Expressions are plain values describing how to consume input: terminals
//! (literal tokens, character classes, end of input), composites (sequence,
//! ordered alternation, optionality, repetition, lookahead), and references
//! to named rules. A grammar is assembled by binding expressions to rules;
//! the matcher in [`crate::matcher`] evaluates them.
//!
//! Expressions form a DAG over expression nodes. Cycles are legal only
//! through rule names: `RuleRef` carries a name that the matcher resolves by
//! identity lookup at evaluation time, never by structural copy, which is
//! what makes forward declaration, mutual recursion, and mocking work.

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A composable description of how to consume input.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A fixed token. Matches iff the input at the cursor starts with the
    /// text; consumes exactly its length.
    Literal(String),
    /// A single character satisfying a named predicate. Equality compares
    /// the name only: function pointer identity is not stable across
    /// codegen.
    CharClass {
        name: &'static str,
        pred: fn(char) -> bool,
    },
    /// All sub-expressions in order, threading the cursor forward.
    Sequence(Vec<Expr>),
    /// Ordered alternation: the first alternative to match wins.
    FirstOf(Vec<Expr>),
    /// Matches the inner expression or succeeds zero-width. Never fails.
    Optional(Box<Expr>),
    /// Zero or more repetitions. Never fails.
    ZeroOrMore(Box<Expr>),
    /// One or more repetitions; fails iff the first repetition fails.
    OneOrMore(Box<Expr>),
    /// Reference to a rule by name, resolved in the grammar at match time.
    RuleRef(String),
    /// Negative lookahead: succeeds zero-width iff the inner expression
    /// fails here.
    Not(Box<Expr>),
    /// Positive lookahead: succeeds zero-width iff the inner expression
    /// matches here, consuming nothing.
    And(Box<Expr>),
    /// Zero-width match at end of input.
    EndOfInput,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Literal(a), Expr::Literal(b)) => a == b,
            (Expr::CharClass { name: a, .. }, Expr::CharClass { name: b, .. }) => a == b,
            (Expr::Sequence(a), Expr::Sequence(b)) | (Expr::FirstOf(a), Expr::FirstOf(b)) => {
                a == b
            }
            (Expr::Optional(a), Expr::Optional(b))
            | (Expr::ZeroOrMore(a), Expr::ZeroOrMore(b))
            | (Expr::OneOrMore(a), Expr::OneOrMore(b))
            | (Expr::Not(a), Expr::Not(b))
            | (Expr::And(a), Expr::And(b)) => a == b,
            (Expr::RuleRef(a), Expr::RuleRef(b)) => a == b,
            (Expr::EndOfInput, Expr::EndOfInput) => true,
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Expr {
    /// Short human-readable label for diagnostics ("expected ...").
    pub(crate) fn describe(&self) -> String {
        match self {
            Expr::Literal(text) => format!("\"{}\"", text),
            Expr::CharClass { name, .. } => (*name).to_string(),
            Expr::Sequence(items) => items
                .first()
                .map(Expr::describe)
                .unwrap_or_else(|| "empty sequence".to_string()),
            Expr::FirstOf(items) => {
                let alternatives: Vec<String> = items.iter().map(Expr::describe).collect();
                alternatives.join(" or ")
            }
            Expr::Optional(inner) | Expr::ZeroOrMore(inner) | Expr::OneOrMore(inner) => {
                inner.describe()
            }
            Expr::RuleRef(name) => name.clone(),
            Expr::Not(inner) => format!("not {}", inner.describe()),
            Expr::And(inner) => inner.describe(),
            Expr::EndOfInput => "end of input".to_string(),
        }
    }

    /// Invokes `visit` with every rule name referenced by this expression,
    /// recursively. Used by grammar validation.
    pub(crate) fn for_each_rule_ref(&self, visit: &mut impl FnMut(&str)) {
        match self {
            Expr::Literal(_) | Expr::CharClass { .. } | Expr::EndOfInput => {}
            Expr::RuleRef(name) => visit(name),
            Expr::Sequence(items) | Expr::FirstOf(items) => {
                for item in items {
                    item.for_each_rule_ref(visit);
                }
            }
            Expr::Optional(inner)
            | Expr::ZeroOrMore(inner)
            | Expr::OneOrMore(inner)
            | Expr::Not(inner)
            | Expr::And(inner) => inner.for_each_rule_ref(visit),
        }
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// A literal token.
pub fn literal(text: impl Into<String>) -> Expr {
    Expr::Literal(text.into())
}

/// A single character satisfying `pred`. The name appears in diagnostics.
pub fn char_class(name: &'static str, pred: fn(char) -> bool) -> Expr {
    Expr::CharClass { name, pred }
}

/// All items in order.
pub fn sequence(items: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Sequence(items.into_iter().collect())
}

/// The first matching alternative, tried in order.
pub fn first_of(items: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::FirstOf(items.into_iter().collect())
}

/// The inner expression, or a zero-width match.
pub fn optional(inner: Expr) -> Expr {
    Expr::Optional(Box::new(inner))
}

/// Zero or more repetitions of the inner expression.
pub fn zero_or_more(inner: Expr) -> Expr {
    Expr::ZeroOrMore(Box::new(inner))
}

/// One or more repetitions of the inner expression.
pub fn one_or_more(inner: Expr) -> Expr {
    Expr::OneOrMore(Box::new(inner))
}

/// A reference to the rule with the given name.
pub fn rule(name: impl Into<String>) -> Expr {
    Expr::RuleRef(name.into())
}

/// Negative lookahead over the inner expression.
pub fn not(inner: Expr) -> Expr {
    Expr::Not(Box::new(inner))
}

/// Positive lookahead over the inner expression.
pub fn and(inner: Expr) -> Expr {
    Expr::And(Box::new(inner))
}

/// End of input.
pub fn end_of_input() -> Expr {
    Expr::EndOfInput
}
