//! Backtracking matcher
//!
//! Recursive-descent evaluation of a grammar's expressions over an immutable
//! input buffer. Failure is data, not control flow: every sub-match returns
//! either a new cursor plus the nodes it produced, or a [`MatchFailure`]
//! carrying the furthest position reached, and the caller's cursor is never
//! touched — which is what makes backtracking safe.
//!
//! Two defects abort matching instead of failing it: re-entering a rule at
//! the same position without consuming input (left recursion, an authoring
//! bug), and blowing the configured depth fuse. Both surface as
//! [`EngineError`]s, distinct from the ordinary "no" of a mismatch.

use std::collections::HashSet;
use std::fmt;

use crate::config::{MatcherConfig, TriviaPolicy};
use crate::errors::{EngineError, ErrorKind};
use crate::expr::Expr;
use crate::grammar::{Grammar, RuleId};
use crate::tree::{ParseNode, Span};

// ============================================================================
// CURSOR & OUTCOME TYPES
// ============================================================================

/// An immutable position in the input. Matching a sub-expression returns a
/// new cursor on success and leaves the caller's untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Cursor {
    offset: usize,
}

impl Cursor {
    pub(crate) fn at(offset: usize) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// One alternative the matcher tried at the furthest failure position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    /// Display-ready token description: `"if"`, a character-class name,
    /// `end of input`, ...
    pub token: String,
    /// The innermost rule being matched when the attempt failed.
    pub in_rule: Option<String>,
}

/// The ordinary "no" answer: input does not conform to the rule.
///
/// Carries the furthest position reached across all backtracked attempts and
/// the alternatives tried there, for diagnosis. Positions are reported at the
/// token start, after any skipped trivia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFailure {
    pub at: usize,
    pub expected: Vec<Expectation>,
}

impl MatchFailure {
    fn expecting(at: usize, token: String) -> Self {
        Self {
            at,
            expected: vec![Expectation {
                token,
                in_rule: None,
            }],
        }
    }

    /// Keeps the failure with the best partial progress; at equal positions,
    /// the expectation sets are unioned.
    fn merge(mut self, other: MatchFailure) -> MatchFailure {
        use std::cmp::Ordering;
        match other.at.cmp(&self.at) {
            Ordering::Greater => other,
            Ordering::Less => self,
            Ordering::Equal => {
                for expectation in other.expected {
                    if !self.expected.contains(&expectation) {
                        self.expected.push(expectation);
                    }
                }
                self
            }
        }
    }
}

impl fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected.is_empty() {
            return write!(f, "no match at offset {}", self.at);
        }
        write!(f, "expected ")?;
        for (i, expectation) in self.expected.iter().enumerate() {
            if i > 0 {
                write!(f, " or ")?;
            }
            write!(f, "{}", expectation.token)?;
            if let Some(rule) = &expectation.in_rule {
                write!(f, " (in {})", rule)?;
            }
        }
        write!(f, " at offset {}", self.at)
    }
}

/// Result of driving the root rule over an entire input.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The root rule matched and the entire input (modulo trailing trivia)
    /// was consumed.
    Matched(ParseNode),
    /// The root rule matched a strict prefix; `end` is where the match
    /// stopped. Distinct from a mismatch so callers can tell "grammar too
    /// short" from "wrong shape entirely".
    Partial { node: ParseNode, end: usize },
    /// The root rule did not match.
    Mismatch(MatchFailure),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    /// The parse tree, for full and partial matches.
    pub fn node(&self) -> Option<&ParseNode> {
        match self {
            MatchOutcome::Matched(node) | MatchOutcome::Partial { node, .. } => Some(node),
            MatchOutcome::Mismatch(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&MatchFailure> {
        match self {
            MatchOutcome::Mismatch(failure) => Some(failure),
            _ => None,
        }
    }
}

// ============================================================================
// MATCHER
// ============================================================================

/// A matcher rooted at one rule of a grammar.
///
/// Construction validates the grammar eagerly: every rule reachable from the
/// root must be resolvable and bound before any input is processed. The
/// borrow of the grammar also guarantees no rule mutation mid-parse.
#[derive(Debug)]
pub struct Matcher<'g> {
    grammar: &'g Grammar,
    root: String,
    config: MatcherConfig,
}

/// Per-parse mutable state: the recursion fuse and the in-flight
/// `(rule, position)` set backing the left-recursion guard.
struct MatchContext<'i> {
    input: &'i str,
    in_flight: HashSet<(RuleId, usize)>,
    stack: Vec<RuleId>,
    depth: usize,
}

/// Result of evaluating one expression: a new cursor plus the nodes produced
/// (zero-width matches produce none), or a failure.
enum Step {
    Matched(StepOk),
    Failed(MatchFailure),
}

struct StepOk {
    end: Cursor,
    nodes: Vec<ParseNode>,
}

impl Step {
    fn zero_width(at: Cursor) -> Self {
        Step::Matched(StepOk {
            end: at,
            nodes: Vec::new(),
        })
    }
}

impl<'g> Matcher<'g> {
    pub fn new(grammar: &'g Grammar, root: &str) -> Result<Self, EngineError> {
        Self::with_config(grammar, root, MatcherConfig::default())
    }

    pub fn with_config(
        grammar: &'g Grammar,
        root: &str,
        config: MatcherConfig,
    ) -> Result<Self, EngineError> {
        grammar.validate(root)?;
        Ok(Self {
            grammar,
            root: root.to_string(),
            config,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Evaluates the root rule from the start of `input` and requires the
    /// entire input be consumed for overall success.
    pub fn match_all(&self, input: &str) -> Result<MatchOutcome, EngineError> {
        let mut ctx = MatchContext {
            input,
            in_flight: HashSet::new(),
            stack: Vec::new(),
            depth: 0,
        };
        let root_id = self.grammar.rule_id(&self.root).ok_or_else(|| {
            EngineError::bare(ErrorKind::UnknownRule {
                name: self.root.clone(),
            })
        })?;
        match self.eval_rule(root_id, Cursor::default(), &mut ctx)? {
            Step::Matched(ok) => {
                let end = ok.end;
                // A zero-width root match produces no node; keep an empty
                // marker so callers always get a tree on success.
                let node = ok.nodes.into_iter().next().unwrap_or_else(|| {
                    ParseNode::rule(self.root.clone(), Span::new(0, end.offset()), Vec::new())
                });
                let after = self.skip_trivia(input, end);
                if after.offset() == input.len() {
                    Ok(MatchOutcome::Matched(node))
                } else {
                    Ok(MatchOutcome::Partial {
                        node,
                        end: end.offset(),
                    })
                }
            }
            Step::Failed(failure) => Ok(MatchOutcome::Mismatch(failure)),
        }
    }

    /// Decodes raw bytes with the configured encoding, then matches.
    pub fn match_bytes(&self, bytes: &[u8]) -> Result<MatchOutcome, EngineError> {
        let text = self.config.encoding.decode(bytes)?;
        self.match_all(&text)
    }

    // ------------------------------------------------------------------
    // Expression evaluation
    // ------------------------------------------------------------------

    fn eval(&self, expr: &Expr, at: Cursor, ctx: &mut MatchContext) -> Result<Step, EngineError> {
        match expr {
            Expr::Literal(text) => Ok(self.eval_literal(text, at, ctx)),
            Expr::CharClass { name, pred } => Ok(self.eval_char_class(*name, *pred, at, ctx)),
            Expr::Sequence(items) => self.eval_sequence(items, at, ctx),
            Expr::FirstOf(items) => self.eval_first_of(items, at, ctx),
            Expr::Optional(inner) => match self.eval(inner, at, ctx)? {
                matched @ Step::Matched(_) => Ok(matched),
                Step::Failed(_) => Ok(Step::zero_width(at)),
            },
            Expr::ZeroOrMore(inner) => self.eval_repetition(inner, at, ctx, false),
            Expr::OneOrMore(inner) => self.eval_repetition(inner, at, ctx, true),
            Expr::RuleRef(name) => {
                let id = self.grammar.rule_id(name).ok_or_else(|| {
                    let referrer = ctx
                        .stack
                        .last()
                        .map(|&id| self.grammar.rule_by_id(id).name().to_string())
                        .unwrap_or_else(|| self.root.clone());
                    EngineError::bare(ErrorKind::UnresolvedReference {
                        rule: referrer,
                        target: name.clone(),
                    })
                })?;
                self.eval_rule(id, at, ctx)
            }
            Expr::Not(inner) => match self.eval(inner, at, ctx)? {
                Step::Matched(_) => Ok(Step::Failed(MatchFailure::expecting(
                    at.offset(),
                    format!("not {}", inner.describe()),
                ))),
                Step::Failed(_) => Ok(Step::zero_width(at)),
            },
            Expr::And(inner) => match self.eval(inner, at, ctx)? {
                Step::Matched(_) => Ok(Step::zero_width(at)),
                failed @ Step::Failed(_) => Ok(failed),
            },
            Expr::EndOfInput => {
                let tok = self.skip_trivia(ctx.input, at);
                if tok.offset() == ctx.input.len() {
                    Ok(Step::zero_width(at))
                } else {
                    Ok(Step::Failed(MatchFailure::expecting(
                        tok.offset(),
                        "end of input".to_string(),
                    )))
                }
            }
        }
    }

    fn eval_literal(&self, text: &str, at: Cursor, ctx: &MatchContext) -> Step {
        if text.is_empty() {
            return Step::zero_width(at);
        }
        let tok = self.skip_trivia(ctx.input, at);
        if ctx.input[tok.offset()..].starts_with(text) {
            let end = Cursor::at(tok.offset() + text.len());
            // Leading trivia belongs to the token's span, keeping sibling
            // spans contiguous.
            let span = Span::new(at.offset(), end.offset());
            Step::Matched(StepOk {
                end,
                nodes: vec![ParseNode::terminal(text, span)],
            })
        } else {
            Step::Failed(MatchFailure::expecting(
                tok.offset(),
                format!("\"{}\"", text),
            ))
        }
    }

    fn eval_char_class(
        &self,
        name: &'static str,
        pred: fn(char) -> bool,
        at: Cursor,
        ctx: &MatchContext,
    ) -> Step {
        let tok = self.skip_trivia(ctx.input, at);
        match ctx.input[tok.offset()..].chars().next() {
            Some(c) if pred(c) => {
                let end = Cursor::at(tok.offset() + c.len_utf8());
                let span = Span::new(at.offset(), end.offset());
                Step::Matched(StepOk {
                    end,
                    nodes: vec![ParseNode::terminal(c.to_string(), span)],
                })
            }
            _ => Step::Failed(MatchFailure::expecting(tok.offset(), name.to_string())),
        }
    }

    fn eval_sequence(
        &self,
        items: &[Expr],
        at: Cursor,
        ctx: &mut MatchContext,
    ) -> Result<Step, EngineError> {
        let mut cur = at;
        let mut nodes = Vec::new();
        for item in items {
            match self.eval(item, cur, ctx)? {
                Step::Matched(ok) => {
                    cur = ok.end;
                    nodes.extend(ok.nodes);
                }
                // The sequence fails at the inner failure's position, not
                // reset to the sequence start; that position feeds the
                // furthest-reached diagnostics even though the parse
                // backtracks.
                Step::Failed(failure) => return Ok(Step::Failed(failure)),
            }
        }
        Ok(Step::Matched(StepOk { end: cur, nodes }))
    }

    fn eval_first_of(
        &self,
        items: &[Expr],
        at: Cursor,
        ctx: &mut MatchContext,
    ) -> Result<Step, EngineError> {
        let mut best: Option<MatchFailure> = None;
        for item in items {
            match self.eval(item, at, ctx)? {
                matched @ Step::Matched(_) => return Ok(matched),
                Step::Failed(failure) => {
                    best = Some(match best {
                        None => failure,
                        Some(prior) => prior.merge(failure),
                    });
                }
            }
        }
        Ok(Step::Failed(best.unwrap_or_else(|| {
            MatchFailure::expecting(at.offset(), "empty alternation".to_string())
        })))
    }

    fn eval_repetition(
        &self,
        inner: &Expr,
        at: Cursor,
        ctx: &mut MatchContext,
        require_one: bool,
    ) -> Result<Step, EngineError> {
        let mut cur = at;
        let mut nodes = Vec::new();
        let mut repetitions = 0usize;
        loop {
            match self.eval(inner, cur, ctx)? {
                Step::Matched(ok) => {
                    let progressed = ok.end > cur;
                    cur = ok.end;
                    nodes.extend(ok.nodes);
                    repetitions += 1;
                    if !progressed {
                        // Forward-progress guard: a zero-width inner match
                        // would otherwise repeat forever.
                        break;
                    }
                }
                Step::Failed(failure) => {
                    if require_one && repetitions == 0 {
                        return Ok(Step::Failed(failure));
                    }
                    break;
                }
            }
        }
        Ok(Step::Matched(StepOk { end: cur, nodes }))
    }

    fn eval_rule(
        &self,
        id: RuleId,
        at: Cursor,
        ctx: &mut MatchContext,
    ) -> Result<Step, EngineError> {
        let rule = self.grammar.rule_by_id(id);
        let key = (id, at.offset());
        if !ctx.in_flight.insert(key) {
            return Err(EngineError::in_input(
                ErrorKind::LeftRecursion {
                    rule: rule.name().to_string(),
                    at: at.offset(),
                },
                ctx.input,
                at.offset(),
            )
            .with_help(
                "every recursive cycle must consume input before re-entering the same rule",
            ));
        }
        ctx.stack.push(id);
        ctx.depth += 1;

        let step = if ctx.depth > self.config.max_depth {
            Err(EngineError::in_input(
                ErrorKind::RecursionLimit {
                    limit: self.config.max_depth,
                },
                ctx.input,
                at.offset(),
            ))
        } else {
            match rule.expr() {
                Some(expr) => self.eval(expr, at, ctx),
                // Validation makes this unreachable for rules in the root's
                // reference graph.
                None => Err(EngineError::bare(ErrorKind::UndefinedExpression {
                    name: rule.name().to_string(),
                })),
            }
        };

        ctx.depth -= 1;
        ctx.stack.pop();
        ctx.in_flight.remove(&key);

        Ok(match step? {
            Step::Matched(ok) => {
                if ok.end == at {
                    // Zero-width rule matches are elided like every other
                    // zero-width match.
                    Step::zero_width(at)
                } else {
                    let node = ParseNode::rule(
                        rule.name(),
                        Span::new(at.offset(), ok.end.offset()),
                        ok.nodes,
                    );
                    Step::Matched(StepOk {
                        end: ok.end,
                        nodes: vec![node],
                    })
                }
            }
            Step::Failed(mut failure) => {
                for expectation in &mut failure.expected {
                    if expectation.in_rule.is_none() {
                        expectation.in_rule = Some(rule.name().to_string());
                    }
                }
                Step::Failed(failure)
            }
        })
    }

    fn skip_trivia(&self, input: &str, from: Cursor) -> Cursor {
        match self.config.trivia {
            TriviaPolicy::None => from,
            TriviaPolicy::Whitespace => {
                let rest = &input[from.offset()..];
                let skipped = rest.len() - rest.trim_start().len();
                Cursor::at(from.offset() + skipped)
            }
        }
    }
}
