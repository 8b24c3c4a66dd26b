//! Trellis: a grammar-rule engine.
//!
//! A language's syntax is declared as a [`Grammar`](grammar::Grammar) — a
//! graph of named, mutually-referencing rules built from
//! [match expressions](expr) — and executed against input text by a
//! backtracking [`Matcher`](matcher::Matcher) to produce a parse tree or a
//! precise failure. Any rule can be [mocked](grammar::Grammar::mock) down to
//! a literal placeholder of its own name, so a single production can be
//! unit-tested before the rest of the grammar exists.
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut grammar = Grammar::new();
//! grammar.define("returnType", literal("void")).unwrap();
//! grammar
//!     .define(
//!         "methodDeclaration",
//!         sequence([rule("returnType"), literal("run"), literal("("), literal(")"), literal(";")]),
//!     )
//!     .unwrap();
//!
//! // Isolate methodDeclaration: returnType now matches its own name.
//! grammar.mock("returnType").unwrap();
//!
//! let matcher = Matcher::new(&grammar, "methodDeclaration").unwrap();
//! assert_parses(&matcher, "returnType run ();");
//! assert_does_not_parse(&matcher, "returnType run ()");
//! ```

pub mod config;
pub mod errors;
pub mod expr;
pub mod grammar;
pub mod matcher;
pub mod testing;
pub mod tree;

pub use errors::{EngineError, ErrorCategory, ErrorKind};

/// One-stop imports for grammar and test authors.
pub mod prelude {
    pub use crate::config::{Encoding, MatcherConfig, TriviaPolicy};
    pub use crate::errors::EngineError;
    pub use crate::expr::{
        and, char_class, end_of_input, first_of, literal, not, one_or_more, optional, rule,
        sequence, zero_or_more, Expr,
    };
    pub use crate::grammar::{Grammar, Rule, RuleId};
    pub use crate::matcher::{Cursor, MatchFailure, MatchOutcome, Matcher};
    pub use crate::testing::{assert_does_not_parse, assert_parses};
    pub use crate::tree::{NodeKind, ParseNode, Span};
}
