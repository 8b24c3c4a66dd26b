// tests/grammar_tests.rs

use trellis::prelude::*;
use trellis::{ErrorCategory, ErrorKind};

// A small arithmetic grammar with forward and mutual references.
fn arithmetic() -> Grammar {
    let mut g = Grammar::new();
    g.define(
        "number",
        one_or_more(char_class("digit", |c| c.is_ascii_digit())),
    )
    .unwrap();
    g.define(
        "primary",
        first_of([
            rule("number"),
            sequence([literal("("), rule("sum"), literal(")")]),
        ]),
    )
    .unwrap();
    g.define(
        "sum",
        sequence([
            rule("primary"),
            zero_or_more(sequence([literal("+"), rule("primary")])),
        ]),
    )
    .unwrap();
    g
}

#[test]
fn matcher_construction_rejects_unresolved_references() {
    let mut g = Grammar::new();
    g.define("root", sequence([literal("x"), rule("missing")]))
        .unwrap();
    let err = Matcher::new(&g, "root").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Construction);
    assert!(matches!(
        err.kind,
        ErrorKind::UnresolvedReference { ref rule, ref target }
            if rule == "root" && target == "missing"
    ));
}

#[test]
fn matcher_construction_rejects_unbound_rules() {
    let mut g = Grammar::new();
    g.define("root", optional(rule("later"))).unwrap();
    g.define_rule("later").unwrap();
    let err = Matcher::new(&g, "root").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedExpression { ref name } if name == "later"));
}

#[test]
fn matcher_construction_rejects_an_unknown_root() {
    let g = arithmetic();
    let err = Matcher::new(&g, "product").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownRule { ref name } if name == "product"));
}

#[test]
fn defining_a_rule_twice_is_rejected() {
    let mut g = arithmetic();
    let err = g.define("number", literal("0")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateRule { ref name } if name == "number"));
}

#[test]
fn every_mocked_rule_parses_its_own_name_in_full() {
    let names: Vec<String> = arithmetic().rules().map(|r| r.name().to_string()).collect();
    assert_eq!(names, ["number", "primary", "sum"]);

    for name in &names {
        let mut g = arithmetic();
        g.mock(name).unwrap();
        let m = Matcher::new(&g, name).unwrap();
        assert_parses(&m, name);
    }
}

#[test]
fn mocking_is_transparent_to_referencing_rules() {
    let mut g = arithmetic();
    g.mock("number").unwrap();
    let m = Matcher::new(&g, "sum").unwrap();
    assert_parses(&m, "number + number");
    assert_parses(&m, "(number + number) + number");
    assert_does_not_parse(&m, "1 + 2"); // real digits no longer match
}

#[test]
fn mocking_does_not_leak_between_grammars() {
    let mut mocked = arithmetic();
    mocked.mock("number").unwrap();
    let plain = arithmetic();

    let mocked_matcher = Matcher::new(&mocked, "sum").unwrap();
    let plain_matcher = Matcher::new(&plain, "sum").unwrap();

    assert_parses(&mocked_matcher, "number");
    assert_parses(&plain_matcher, "1+2");
    assert_does_not_parse(&plain_matcher, "number");
}

#[test]
fn rules_iterate_in_definition_order() {
    let mut g = Grammar::new();
    g.define_rule("zeta").unwrap();
    g.define_rule("alpha").unwrap();
    g.define_rule("mu").unwrap();
    let names: Vec<&str> = g.rules().map(|r| r.name()).collect();
    assert_eq!(names, ["zeta", "alpha", "mu"]);
    assert_eq!(g.len(), 3);
}
