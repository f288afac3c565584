//! Reachability pass (§4.4).
//!
//! Starts from the productions annotated `@toplevel` and transitively adds
//! every production referenced from a variant's parse tree. Productions not
//! reached are dropped from the model; each chapter's production list is
//! filtered to match.

use std::collections::{BTreeMap, HashSet};

use crate::diagnostics::Diagnostics;
use crate::model::{is_builtin, Grammar};
use crate::parser::{well_known, Pt};

fn references_of(ptree: &[Pt], out: &mut Vec<String>) {
    for node in ptree {
        match node {
            Pt::Reference { name, .. } => {
                if !is_builtin(name) {
                    out.push(name.clone());
                }
            }
            Pt::Literal { .. } => {}
            Pt::Sequence(_) | Pt::Repeated(_) | Pt::Optional(_) | Pt::NegativeLookahead(_) => {
                references_of(node.children(), out);
            }
        }
    }
}

fn successor_map(grammar: &Grammar) -> BTreeMap<&str, Vec<String>> {
    grammar
        .productions
        .values()
        .map(|p| {
            let mut refs = Vec::new();
            for variant in &p.variants {
                references_of(&variant.ptree, &mut refs);
            }
            (p.name.as_str(), refs)
        })
        .collect()
}

/// Computes the set of production names reachable from any `@toplevel`
/// production, via BFS over the reference graph.
pub fn compute_reachable(grammar: &Grammar) -> HashSet<String> {
    let successors = successor_map(grammar);

    let mut reachable = HashSet::new();
    let mut queue: Vec<String> = grammar
        .productions
        .values()
        .filter(|p| p.is_toplevel())
        .map(|p| p.name.clone())
        .collect();

    while let Some(name) = queue.pop() {
        if !reachable.insert(name.clone()) {
            continue;
        }
        if let Some(succs) = successors.get(name.as_str()) {
            queue.extend(succs.iter().cloned());
        }
    }

    reachable
}

/// Drops every production not reachable from a `@toplevel` production,
/// emitting an info diagnostic per dropped production (§4.9: "unreachable
/// productions (info only)"). Idempotent: a second call against an
/// already-pruned grammar finds nothing new to drop.
pub fn prune_unreachable(grammar: &mut Grammar, diagnostics: &mut Diagnostics) {
    let reachable = compute_reachable(grammar);

    let dropped: Vec<String> = grammar
        .production_names()
        .filter(|name| !reachable.contains(*name))
        .map(str::to_owned)
        .collect();

    for name in &dropped {
        let msg = format!("production '{name}' is unreachable from any @{}", well_known::TOPLEVEL);
        diagnostics.info(msg, None).emit();
        grammar.productions.shift_remove(name);
    }

    for chapter in &mut grammar.chapters {
        chapter
            .production_names
            .retain(|name| grammar.productions.contains_key(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{lex, significant};
    use crate::parser::parse_grammar;

    fn grammar_of(source: &str) -> Grammar {
        let tokens = lex(source).unwrap();
        let sig = significant(&tokens);
        parse_grammar(&sig).unwrap()
    }

    #[test]
    fn unreferenced_production_is_dropped() {
        let mut g = grammar_of("Root: (@toplevel)\n  \"r\"\nOrphan:\n  \"o\"\n");
        let mut diags = Diagnostics::new();
        prune_unreachable(&mut g, &mut diags);
        assert!(g.production("Root").is_some());
        assert!(g.production("Orphan").is_none());
        assert_eq!(diags.warning_count(), 0);
    }

    #[test]
    fn referenced_production_survives() {
        let mut g = grammar_of("Root: (@toplevel)\n  Child\nChild:\n  \"c\"\n");
        let mut diags = Diagnostics::new();
        prune_unreachable(&mut g, &mut diags);
        assert!(g.production("Child").is_some());
    }

    #[test]
    fn pruning_is_idempotent() {
        let mut g = grammar_of("Root: (@toplevel)\n  \"r\"\nOrphan:\n  \"o\"\n");
        let mut diags = Diagnostics::new();
        prune_unreachable(&mut g, &mut diags);
        let after_first = g.productions.len();
        prune_unreachable(&mut g, &mut diags);
        assert_eq!(g.productions.len(), after_first);
    }
}
