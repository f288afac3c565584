//! End-to-end pipeline tests: lex -> parse -> analyze -> emit against an
//! in-memory artifact sink. Covers the concrete scenarios and invariants.

use indoc::indoc;

use grammatic_compiler::analyze::LookaheadSet;
use grammatic_compiler::customizations::Customizations;
use grammatic_compiler::diagnostics::Diagnostics;
use grammatic_compiler::emit::{self, InMemoryArtifactSink};
use grammatic_compiler::lexer::{lex, significant};
use grammatic_compiler::model::Grammar;
use grammatic_compiler::parser::parse_grammar;
use grammatic_compiler::{analyze, Error};

fn parse(source: &str) -> Grammar {
    let tokens = lex(source).expect("lexes cleanly");
    let sig = significant(&tokens);
    parse_grammar(&sig).expect("parses cleanly")
}

fn compile_grammar(source: &str) -> (Grammar, analyze::Analysis) {
    let mut grammar = parse(source);
    let mut diagnostics = Diagnostics::new();
    let analysis = analyze::analyze(&mut grammar, &mut diagnostics).expect("analyzes cleanly");
    (grammar, analysis)
}

#[test]
fn tokenization_is_total() {
    let source = indoc! {r#"
        (chapter=A)
        X:
          "k"
    "#};
    let tokens = lex(source).unwrap();
    let total: usize = tokens.iter().map(|t| t.text.len()).sum();
    assert_eq!(total, source.len());
}

#[test]
fn trivial_literal_scenario() {
    let source = indoc! {r#"
        (chapter=A)
        X: (@toplevel)
          "k"
    "#};
    let (grammar, analysis) = compile_grammar(source);
    assert_eq!(grammar.chapters.len(), 1);
    assert_eq!(grammar.chapters[0].name, "A");

    let x = grammar.production("X").unwrap();
    assert_eq!(x.variants.len(), 1);
    assert!(!analysis.nullable.contains("X"));

    match analysis.lookahead.reported("X", &x.variants[0].name, &analysis.nullable) {
        LookaheadSet::Tokens(tokens) => assert!(tokens.contains("k")),
        LookaheadSet::AnyToken => panic!("X should report a concrete FIRST set"),
    }
    assert!(!analysis.left_calls.is_lr("X", &x.variants[0].name));
}

#[test]
fn optional_sequence_scenario() {
    let source = indoc! {r#"
        X: (@toplevel)
          [ "a" ] "b"
    "#};
    let (grammar, analysis) = compile_grammar(source);
    let x = grammar.production("X").unwrap();
    assert_eq!(x.variants.len(), 1);
    assert!(!analysis.nullable.contains("X"));

    match analysis.lookahead.reported("X", &x.variants[0].name, &analysis.nullable) {
        LookaheadSet::Tokens(tokens) => {
            assert!(tokens.contains("a"));
            assert!(tokens.contains("b"));
        }
        LookaheadSet::AnyToken => panic!("X should report a concrete FIRST set"),
    }
}

#[test]
fn direct_left_recursion_scenario() {
    let source = indoc! {r#"
        E: (@toplevel)
          E "+" E
          "n"
    "#};
    let (grammar, analysis) = compile_grammar(source);
    let e = grammar.production("E").unwrap();
    let plus_variant = e
        .variants
        .iter()
        .find(|v| matches!(v.ptree.as_slice(), [grammatic_compiler::parser::Pt::Reference { .. }, ..]))
        .expect("a variant starting with a reference to E exists");

    assert!(analysis.left_calls.is_lr("E", &plus_variant.name));
    let witness = &analysis.left_calls.lr_variants[&("E".to_owned(), plus_variant.name.clone())];
    assert_eq!(witness.chain[0], ("E".to_owned(), plus_variant.name.clone()));

    match analysis.lookahead.reported("E", &plus_variant.name, &analysis.nullable) {
        LookaheadSet::Tokens(tokens) => assert!(tokens.contains("n")),
        LookaheadSet::AnyToken => panic!("E should report a concrete FIRST set"),
    }
}

#[test]
fn indirect_left_recursion_with_nullable_bridge_scenario() {
    let source = indoc! {r#"
        A: (@toplevel)
          [ "x" ] B
        B:
          A "y"
    "#};
    let (grammar, analysis) = compile_grammar(source);
    assert!(!analysis.nullable.contains("A"));
    assert!(!analysis.nullable.contains("B"));

    let a = grammar.production("A").unwrap();
    let b = grammar.production("B").unwrap();

    let a_calls = &analysis.left_calls.left_calls[&("A".to_owned(), a.variants[0].name.clone())];
    assert_eq!(a_calls.first().map(String::as_str), Some("B"));

    let b_calls = &analysis.left_calls.left_calls[&("B".to_owned(), b.variants[0].name.clone())];
    assert_eq!(b_calls.first().map(String::as_str), Some("A"));

    assert!(analysis.left_calls.is_lr("A", &a.variants[0].name));
    assert!(analysis.left_calls.is_lr("B", &b.variants[0].name));
}

#[test]
fn nullable_production_scenario() {
    let source = indoc! {r#"
        L: (@toplevel)
          { "," N }
        N:
          "n"
    "#};
    let (grammar, analysis) = compile_grammar(source);
    assert!(analysis.nullable.contains("L"));
    assert!(!analysis.nullable.contains("N"));

    let l = grammar.production("L").unwrap();
    assert!(matches!(
        analysis.lookahead.reported("L", &l.variants[0].name, &analysis.nullable),
        LookaheadSet::AnyToken
    ));

    let n = grammar.production("N").unwrap();
    match analysis.lookahead.reported("N", &n.variants[0].name, &analysis.nullable) {
        LookaheadSet::Tokens(tokens) => assert!(tokens.contains("n")),
        LookaheadSet::AnyToken => panic!("N should report a concrete FIRST set"),
    }
}

#[test]
fn intermediate_delegation_scenario() {
    let source = indoc! {r#"
        P: (@toplevel)
          Q            (@intermediate)
        Q:
          "q"
    "#};
    let (grammar, _analysis) = compile_grammar(source);
    let p = grammar.production("P").unwrap();
    assert_eq!(
        p.variants[0]
            .annotation(grammatic_compiler::parser::well_known::DELEGATE)
            .and_then(|a| a.value.as_deref()),
        Some("Q")
    );
}

#[test]
fn unreachable_production_is_pruned_and_pruning_is_idempotent() {
    let source = indoc! {r#"
        E: (@toplevel)
          "n"
        Orphan:
          "o"
    "#};
    let mut grammar = parse(source);
    let mut diagnostics = Diagnostics::new();
    analyze::prune_unreachable(&mut grammar, &mut diagnostics);
    assert!(grammar.production("Orphan").is_none());
    assert!(grammar.production("E").is_some());

    let before = grammar.productions.len();
    let mut diagnostics2 = Diagnostics::new();
    analyze::prune_unreachable(&mut grammar, &mut diagnostics2);
    assert_eq!(grammar.productions.len(), before);
}

#[test]
fn every_reference_in_the_pruned_model_resolves() {
    let source = indoc! {r#"
        E: (@toplevel)
          E "+" T
          T
        T:
          "n"
    "#};
    let (grammar, _analysis) = compile_grammar(source);

    fn check(nodes: &[grammatic_compiler::parser::Pt], grammar: &Grammar) {
        for node in nodes {
            if let grammatic_compiler::parser::Pt::Reference { name, .. } = node {
                assert!(
                    grammatic_compiler::model::is_builtin(name) || grammar.production(name).is_some(),
                    "reference '{name}' resolves to neither a builtin nor a surviving production"
                );
            }
            check(node.children(), grammar);
        }
    }

    for production in grammar.productions.values() {
        for variant in &production.variants {
            check(&variant.ptree, &grammar);
        }
    }
}

#[test]
fn variant_names_are_unique_within_a_production() {
    let source = indoc! {r#"
        E: (@toplevel)
          E "+" E
          E "-" E
          "n"
    "#};
    let (grammar, _analysis) = compile_grammar(source);
    let e = grammar.production("E").unwrap();
    let mut names: Vec<&str> = e.variants.iter().map(|v| v.name.as_str()).collect();
    let before = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), before);
}

#[test]
fn literal_catalogue_matches_the_distinct_literals_in_standard_productions() {
    let source = indoc! {r#"
        X: (@toplevel)
          "if" "(" ")" "if"
    "#};
    let (grammar, _analysis) = compile_grammar(source);
    let catalogue = emit::catalogue_literals(&grammar);
    assert_eq!(catalogue.keywords, vec!["if".to_owned()]);
    assert_eq!(catalogue.punctuation, vec!["(".to_owned(), ")".to_owned()]);
}

#[test]
fn emits_one_artifact_per_surviving_production_in_an_in_memory_sink() {
    let source = indoc! {r#"
        E: (@toplevel)
          E "+" E
          "n"
        Orphan:
          "o"
    "#};
    let (grammar, analysis) = compile_grammar(source);
    let mut sink = InMemoryArtifactSink::new();
    let emitted = emit::emit_all(&grammar, &analysis, &Customizations::default(), &mut sink).unwrap();
    assert_eq!(emitted, vec!["E.artifact".to_owned()]);
    assert!(sink.body_of("E.artifact").unwrap().contains("production E"));
}

#[test]
fn malformed_grammar_is_a_fatal_error_through_the_top_level_entry_point() {
    let source = indoc! {r#"
        X: (@toplevel)
          ( "a"
    "#};
    let err = grammatic_compiler::compile(source).unwrap_err();
    assert!(matches!(err, Error::Structural(_)));
}
