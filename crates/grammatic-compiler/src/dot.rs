//! DOT graph rendering of the nonterminal reference graph (§6): one node per
//! production, one edge per referent relationship, with left-call edges
//! colored separately from the rest.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::analyze::LeftCallAnalysis;
use crate::model::{is_builtin, Grammar};
use crate::parser::Pt;

fn references_of(nodes: &[Pt], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            Pt::Reference { name, .. } if !is_builtin(name) => out.push(name.clone()),
            Pt::Reference { .. } => {}
            Pt::Sequence(_) | Pt::Repeated(_) | Pt::Optional(_) | Pt::NegativeLookahead(_) => {
                references_of(node.children(), out);
            }
            Pt::Literal { .. } => {}
        }
    }
}

/// Renders `grammar`'s nonterminal reference graph as `digraph nonterminals
/// { ... }`. An edge `from -> to` is colored `blue` if some left-call set of
/// `from` contains `to`, and `black` otherwise.
pub fn render_dot(grammar: &Grammar, left_calls: &LeftCallAnalysis) -> String {
    let mut out = String::new();
    out.push_str("digraph nonterminals {\n");

    for name in grammar.production_names() {
        let _ = writeln!(out, "  \"{name}\";");
    }

    for production in grammar.productions.values() {
        let left_targets: BTreeSet<&str> = left_calls
            .left_calls_of(&production.name)
            .map(String::as_str)
            .collect();

        let mut referents = BTreeSet::new();
        for variant in &production.variants {
            let mut refs = Vec::new();
            references_of(&variant.ptree, &mut refs);
            referents.extend(refs);
        }

        for referent in referents {
            let color = if left_targets.contains(referent.as_str()) { "blue" } else { "black" };
            let _ = writeln!(out, "  \"{}\" -> \"{}\" [color={}];", production.name, referent, color);
        }
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::analyze_left_recursion;
    use crate::analyze::compute_nullable;
    use crate::lexer::{lex, significant};
    use crate::parser::parse_grammar;

    fn grammar_of(source: &str) -> Grammar {
        let tokens = lex(source).unwrap();
        let sig = significant(&tokens);
        parse_grammar(&sig).unwrap()
    }

    #[test]
    fn renders_one_node_per_production_and_marks_left_edges_blue() {
        let g = grammar_of("E: (@toplevel)\n  E \"+\" T\n  T\nT:\n  \"n\"\n");
        let nullable = compute_nullable(&g);
        let left_calls = analyze_left_recursion(&g, &nullable);
        let dot = render_dot(&g, &left_calls);
        assert!(dot.starts_with("digraph nonterminals {"));
        assert!(dot.contains("\"E\";"));
        assert!(dot.contains("\"T\";"));
        assert!(dot.contains("\"E\" -> \"E\" [color=blue];"));
        assert!(dot.contains("\"E\" -> \"T\" [color=black];"));
    }
}
