// tests/interface_method_declaration.rs
//
// Exercises one production in isolation with every referenced rule mocked:
// the mocked rules reduce to literal tokens equal to their own names, so a
// combinatorial grammar test becomes a plain string check.

use trellis::prelude::*;

fn csharp_subset() -> Grammar {
    let mut g = Grammar::new();
    // Forward-declare the production under test; its collaborators follow.
    let imd = g.define_rule("interfaceMethodDeclaration").unwrap();

    g.define(
        "attributes",
        one_or_more(sequence([literal("["), literal("Attr"), literal("]")])),
    )
    .unwrap();
    g.define("returnType", first_of([literal("void"), literal("int")]))
        .unwrap();
    g.define(
        "typeParameterList",
        sequence([literal("<"), literal("T"), literal(">")]),
    )
    .unwrap();
    g.define(
        "formalParameterList",
        sequence([literal("int"), literal("value")]),
    )
    .unwrap();
    g.define(
        "typeParameterConstraintsClauses",
        sequence([literal("where"), literal("T"), literal(":"), literal("class")]),
    )
    .unwrap();

    g.set_expression(
        imd,
        sequence([
            optional(rule("attributes")),
            optional(literal("new")),
            rule("returnType"),
            literal("id"),
            optional(rule("typeParameterList")),
            literal("("),
            optional(rule("formalParameterList")),
            literal(")"),
            optional(rule("typeParameterConstraintsClauses")),
            literal(";"),
        ]),
    );
    g
}

fn mocked() -> Grammar {
    let mut g = csharp_subset();
    g.mock("attributes").unwrap();
    g.mock("returnType").unwrap();
    g.mock("typeParameterList").unwrap();
    g.mock("formalParameterList").unwrap();
    g.mock("typeParameterConstraintsClauses").unwrap();
    g
}

#[test]
fn minimal_declaration_parses() {
    let g = mocked();
    let m = Matcher::new(&g, "interfaceMethodDeclaration").unwrap();
    assert_parses(&m, "returnType id ();");
}

#[test]
fn full_declaration_parses() {
    let g = mocked();
    let m = Matcher::new(&g, "interfaceMethodDeclaration").unwrap();
    assert_parses(
        &m,
        "attributes new returnType id typeParameterList (formalParameterList) typeParameterConstraintsClauses;",
    );
}

#[test]
fn missing_semicolon_fails_at_the_end_of_what_matched() {
    let g = mocked();
    let m = Matcher::new(&g, "interfaceMethodDeclaration").unwrap();
    let input = "returnType id ()";
    assert_does_not_parse(&m, input);

    // The failure position distinguishes "almost matched" from "wrong shape
    // entirely": everything up to the missing ";" was consumed.
    let outcome = m.match_all(input).unwrap();
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.at, input.len());
    assert_eq!(failure.expected[0].token, "\";\"");
}

#[test]
fn wrong_shape_fails_at_the_start() {
    let g = mocked();
    let m = Matcher::new(&g, "interfaceMethodDeclaration").unwrap();
    let outcome = m.match_all("class C {}").unwrap();
    assert_eq!(outcome.failure().unwrap().at, 0);
}

#[test]
fn the_unmocked_production_still_works() {
    let g = csharp_subset();
    let m = Matcher::new(&g, "interfaceMethodDeclaration").unwrap();
    assert_parses(&m, "[Attr] void id (int value);");
    assert_parses(&m, "new int id <T> () where T : class;");
    assert_does_not_parse(&m, "void id ()");
}

#[test]
fn mocked_parse_tree_names_the_mocked_rules() {
    let g = mocked();
    let m = Matcher::new(&g, "interfaceMethodDeclaration").unwrap();
    let input = "returnType id ();";
    let outcome = m.match_all(input).unwrap();
    let node = outcome.node().unwrap();

    assert_eq!(node.label, "interfaceMethodDeclaration");
    let return_type = node.child("returnType").unwrap();
    assert!(return_type.is_rule());
    assert_eq!(return_type.text(input), "returnType");
    // The mocked rule's only child is the placeholder token.
    assert_eq!(return_type.children[0].label, "returnType");
    assert!(return_type.children[0].is_terminal());
}
