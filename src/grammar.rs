//! Grammar and rule container
//!
//! A [`Grammar`] owns every rule of one language definition: an
//! insertion-ordered arena of named rules plus a name index. Rules are
//! forward-declarable — [`Grammar::define_rule`] registers an empty slot whose
//! expression is bound later — so mutually recursive productions wire up
//! naturally. All references between rules go through names resolved at match
//! time, never through copies, which is also what makes [`Grammar::mock`]
//! transparent to every referencing rule.
//!
//! No process-wide registry exists: distinct grammars are fully independent,
//! so isolated tests can each build their own.

use std::collections::{HashMap, HashSet};

use crate::errors::{EngineError, ErrorKind};
use crate::expr::Expr;

/// Handle to a rule inside the grammar that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub(crate) usize);

/// A named, mutable slot holding one match expression.
///
/// The expression is the only mutable part: set once at definition,
/// overwritten only by mocking. Identity (name and id) is stable for the
/// grammar's lifetime.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    expr: Option<Expr>,
    mocked: bool,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> Option<&Expr> {
        self.expr.as_ref()
    }

    pub fn is_mocked(&self) -> bool {
        self.mocked
    }
}

/// The full named collection of rules for one language definition.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a forward-declared rule with no expression yet.
    /// Defining the same name twice is a construction defect.
    pub fn define_rule(&mut self, name: impl Into<String>) -> Result<RuleId, EngineError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(EngineError::bare(ErrorKind::DuplicateRule { name }));
        }
        let id = RuleId(self.rules.len());
        self.index.insert(name.clone(), id.0);
        self.rules.push(Rule {
            name,
            expr: None,
            mocked: false,
        });
        Ok(id)
    }

    /// Declares a rule and binds its expression in one step.
    pub fn define(&mut self, name: impl Into<String>, expr: Expr) -> Result<RuleId, EngineError> {
        let id = self.define_rule(name)?;
        self.set_expression(id, expr);
        Ok(id)
    }

    /// Binds (or rebinds) the expression of a previously declared rule.
    ///
    /// The id must come from this grammar's `define_rule`; indexing with a
    /// foreign id panics.
    pub fn set_expression(&mut self, id: RuleId, expr: Expr) {
        self.rules[id.0].expr = Some(expr);
    }

    /// Name-addressed variant of [`Grammar::set_expression`].
    pub fn set_expression_named(&mut self, name: &str, expr: Expr) -> Result<(), EngineError> {
        let idx = self.lookup(name)?;
        self.rules[idx].expr = Some(expr);
        Ok(())
    }

    /// Replaces the rule's expression with a literal placeholder equal to its
    /// own name, so the production can be exercised in isolation while every
    /// rule referencing it keeps working unchanged.
    ///
    /// Idempotent: mocking again just overwrites the expression again.
    pub fn mock(&mut self, name: &str) -> Result<(), EngineError> {
        let idx = self.lookup(name)?;
        let rule = &mut self.rules[idx];
        rule.expr = Some(Expr::Literal(rule.name.clone()));
        rule.mocked = true;
        Ok(())
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&idx| &self.rules[idx])
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied().map(RuleId)
    }

    pub(crate) fn rule_by_id(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    /// Rules in definition order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<usize, EngineError> {
        self.index.get(name).copied().ok_or_else(|| {
            EngineError::bare(ErrorKind::UnknownRule {
                name: name.to_string(),
            })
        })
    }

    /// Checks that every rule reachable from `root` has its expression set
    /// and references only defined rules. Run before any input is processed,
    /// so unresolved references surface as construction defects rather than
    /// parse-time surprises.
    pub fn validate(&self, root: &str) -> Result<(), EngineError> {
        let root_idx = self.lookup(root)?;
        let mut pending = vec![root_idx];
        let mut visited = HashSet::new();
        while let Some(idx) = pending.pop() {
            if !visited.insert(idx) {
                continue;
            }
            let rule = &self.rules[idx];
            let expr = rule.expr.as_ref().ok_or_else(|| {
                EngineError::bare(ErrorKind::UndefinedExpression {
                    name: rule.name.clone(),
                })
            })?;
            let mut unresolved = None;
            expr.for_each_rule_ref(&mut |target| {
                match self.index.get(target) {
                    Some(&target_idx) => pending.push(target_idx),
                    None => {
                        if unresolved.is_none() {
                            unresolved = Some(target.to_string());
                        }
                    }
                }
            });
            if let Some(target) = unresolved {
                return Err(EngineError::bare(ErrorKind::UnresolvedReference {
                    rule: rule.name.clone(),
                    target,
                }));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{literal, optional, rule, sequence};
    use crate::errors::ErrorKind;

    #[test]
    fn duplicate_definition_is_a_construction_defect() {
        let mut g = Grammar::new();
        g.define_rule("expr").unwrap();
        let err = g.define_rule("expr").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateRule { ref name } if name == "expr"));
    }

    #[test]
    fn forward_declared_rules_can_be_bound_later() {
        let mut g = Grammar::new();
        let id = g.define_rule("stmt").unwrap();
        assert!(g.rule("stmt").unwrap().expr().is_none());
        g.set_expression(id, literal(";"));
        assert!(g.rule("stmt").unwrap().expr().is_some());
    }

    #[test]
    fn expressions_can_be_bound_by_name() {
        let mut g = Grammar::new();
        g.define_rule("stmt").unwrap();
        g.set_expression_named("stmt", literal(";")).unwrap();
        assert_eq!(g.rule("stmt").unwrap().expr(), Some(&Expr::Literal(";".into())));

        let err = g.set_expression_named("ghost", literal("x")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownRule { ref name } if name == "ghost"));
    }

    #[test]
    fn mock_swaps_in_a_literal_of_the_rules_own_name() {
        let mut g = Grammar::new();
        g.define("attributes", sequence([literal("["), literal("]")]))
            .unwrap();
        g.mock("attributes").unwrap();
        let mocked = g.rule("attributes").unwrap();
        assert!(mocked.is_mocked());
        assert_eq!(mocked.expr(), Some(&Expr::Literal("attributes".into())));

        // Mocking again is idempotent.
        g.mock("attributes").unwrap();
        assert_eq!(
            g.rule("attributes").unwrap().expr(),
            Some(&Expr::Literal("attributes".into()))
        );
    }

    #[test]
    fn mocking_an_unknown_rule_fails() {
        let mut g = Grammar::new();
        let err = g.mock("nope").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownRule { ref name } if name == "nope"));
    }

    #[test]
    fn validate_rejects_references_to_undefined_rules() {
        let mut g = Grammar::new();
        g.define("root", sequence([rule("missing")])).unwrap();
        let err = g.validate("root").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::UnresolvedReference { ref rule, ref target }
                if rule == "root" && target == "missing"
        ));
    }

    #[test]
    fn validate_rejects_declared_but_unbound_rules() {
        let mut g = Grammar::new();
        g.define("root", optional(rule("later"))).unwrap();
        g.define_rule("later").unwrap();
        let err = g.validate("root").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UndefinedExpression { ref name } if name == "later"));
    }

    #[test]
    fn validate_follows_mutual_recursion_without_looping() {
        let mut g = Grammar::new();
        g.define("a", sequence([literal("("), rule("b")])).unwrap();
        g.define("b", sequence([rule("a"), literal(")")])).unwrap();
        g.validate("a").unwrap();
    }

    #[test]
    fn unreachable_rules_are_not_validated() {
        let mut g = Grammar::new();
        g.define("root", literal("x")).unwrap();
        g.define_rule("dangling").unwrap(); // never bound, never referenced
        g.validate("root").unwrap();
    }
}
