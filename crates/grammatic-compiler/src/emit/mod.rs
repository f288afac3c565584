//! Artifact emission (§4.8, §6): walks the analyzed grammar and writes one
//! artifact per production to an [`ArtifactSink`].

mod sink;

pub use sink::{FsArtifactSink, InMemoryArtifactSink};

use std::collections::BTreeMap;

use crate::analyze::{Analysis, LookaheadSet};
use crate::customizations::Customizations;
use crate::model::{is_builtin, Grammar, Production};
use crate::parser::{well_known, Pt};

/// A `(production, variant)` pair, identifying one step of a left-call
/// chain in an emitted shortest-cycle witness.
type VariantKey = (String, String);

/// External capability that persists generated artifacts, per §6: a
/// pre-existing-file guard plus a write operation, both scoped to a
/// configurable output root.
pub trait ArtifactSink {
    /// True if a hand-written file already exists at `relative_path`; a
    /// generated artifact for that name is skipped when this is true.
    fn exists(&self, relative_path: &str) -> bool;

    fn emit(&mut self, artifact_name: &str, body_text: &str) -> std::io::Result<()>;
}

/// One production's fully resolved view, ready to hand to a code generator
/// or template. This is deliberately a plain data bundle: emission (in the
/// sense of actually rendering target-language source) is out of scope
/// (§1's Non-goals); what is in scope is producing this resolved view and
/// routing it through an `ArtifactSink`.
#[derive(Debug, Clone)]
pub struct ProductionArtifact {
    pub name: String,
    pub chapter: String,
    pub is_leaf: bool,
    pub is_toplevel: bool,
    pub variants: Vec<VariantArtifact>,
    pub annotation_table: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct VariantArtifact {
    pub name: String,
    pub is_lr: bool,
    pub delegate: Option<String>,
    pub lookahead: LookaheadSet,
    /// The shortest left-recursive cycle that reaches this variant, if it
    /// is left-recursive (§1(c), Testable Property #7). `None` for
    /// non-recursive variants.
    pub shortest_cycle: Option<Vec<VariantKey>>,
}

/// Literals catalogued across the whole grammar, partitioned into
/// alphabetic *keywords* and non-alphabetic *punctuation*, excluding
/// non-standard productions (§4.8).
#[derive(Debug, Clone, Default)]
pub struct LiteralCatalogue {
    pub keywords: Vec<String>,
    pub punctuation: Vec<String>,
}

fn collect_literals(nodes: &[Pt], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            Pt::Literal { text, .. } => out.push(text.clone()),
            Pt::Reference { .. } => {}
            Pt::Sequence(_) | Pt::Repeated(_) | Pt::Optional(_) | Pt::NegativeLookahead(_) => {
                collect_literals(node.children(), out);
            }
        }
    }
}

/// Catalogues every literal across the grammar's standard (non-
/// `@nonstandard`) productions into keywords and punctuation (§4.8). Public
/// so callers other than [`build_artifacts`] — verbose dumps, tests — can
/// inspect the grammar-wide catalogue directly rather than reconstructing
/// it from per-production artifacts.
pub fn catalogue_literals(grammar: &Grammar) -> LiteralCatalogue {
    let mut catalogue = LiteralCatalogue::default();
    for production in grammar.productions.values() {
        if production.is_nonstandard() {
            continue;
        }
        let mut literals = Vec::new();
        for variant in &production.variants {
            collect_literals(&variant.ptree, &mut literals);
        }
        for literal in literals {
            if literal.chars().all(|c| c.is_alphabetic()) && !literal.is_empty() {
                catalogue.keywords.push(literal);
            } else {
                catalogue.punctuation.push(literal);
            }
        }
    }
    catalogue.keywords.sort();
    catalogue.keywords.dedup();
    catalogue.punctuation.sort();
    catalogue.punctuation.dedup();
    catalogue
}

/// A production is an identifier-wrapper if its single variant is a single
/// reference to `Identifier` (or, transitively, to another
/// identifier-wrapper production).
fn is_identifier_wrapper(grammar: &Grammar, production: &Production, seen: &mut Vec<String>) -> bool {
    if seen.contains(&production.name) {
        return false;
    }
    let [variant] = production.variants.as_slice() else {
        return false;
    };
    let [Pt::Reference { name, .. }] = variant.ptree.as_slice() else {
        return false;
    };
    if name == crate::model::IDENTIFIER {
        return true;
    }
    if is_builtin(name) {
        return false;
    }
    let Some(target) = grammar.production(name) else {
        return false;
    };
    seen.push(production.name.clone());
    is_identifier_wrapper(grammar, target, seen)
}

fn annotation_table(production: &Production, variant_annotations: impl Iterator<Item = (String, Vec<crate::parser::Annotation>)>) -> BTreeMap<String, Vec<String>> {
    let recognized = [
        well_known::NAME,
        well_known::MIXIN,
        well_known::TRAIT,
        well_known::INTERMEDIATE,
        well_known::DELEGATE,
    ];
    let mut table: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for annotation in &production.annotations {
        if !recognized.contains(&annotation.name.as_str()) {
            table.entry(annotation.name.clone()).or_default().push(annotation.value.clone().unwrap_or_default());
        }
    }
    for (_variant_name, annotations) in variant_annotations {
        for annotation in annotations {
            if !recognized.contains(&annotation.name.as_str()) {
                table.entry(annotation.name.clone()).or_default().push(annotation.value.clone().unwrap_or_default());
            }
        }
    }
    table
}

/// Builds the resolved per-production artifact view for every production in
/// the (already pruned and analyzed) grammar.
pub fn build_artifacts(grammar: &Grammar, analysis: &Analysis) -> Vec<ProductionArtifact> {
    grammar
        .productions
        .values()
        .map(|production| {
            let variants = production
                .variants
                .iter()
                .map(|v| VariantArtifact {
                    name: v.name.clone(),
                    is_lr: analysis.left_calls.is_lr(&production.name, &v.name),
                    delegate: v.annotation(well_known::DELEGATE).and_then(|a| a.value.clone()),
                    lookahead: analysis.lookahead.reported(&production.name, &v.name, &analysis.nullable),
                    shortest_cycle: analysis
                        .left_calls
                        .shortest_cycle_for(&production.name, &v.name)
                        .cloned(),
                })
                .collect();

            let variant_annotations = production
                .variants
                .iter()
                .map(|v| (v.name.clone(), v.annotations.clone()));

            ProductionArtifact {
                name: production.name.clone(),
                chapter: production.chapter.clone(),
                is_leaf: production.is_leaf(),
                is_toplevel: production.is_toplevel(),
                variants,
                annotation_table: annotation_table(production, variant_annotations),
            }
        })
        .collect()
}

/// Renders one production's artifact as the plain-text body written to the
/// sink; real target-language rendering is left to callers that need it
/// (§1 Non-goals: no target-language code generator is part of this crate).
pub fn render_artifact(artifact: &ProductionArtifact) -> String {
    let mut out = String::new();
    out.push_str(&format!("production {}\n", artifact.name));
    out.push_str(&format!("chapter: {}\n", artifact.chapter));
    for variant in &artifact.variants {
        out.push_str(&format!(
            "  variant {} lr={} delegate={:?}\n",
            variant.name, variant.is_lr, variant.delegate
        ));
        if let Some(cycle) = &variant.shortest_cycle {
            let chain: Vec<String> = cycle.iter().map(|(p, v)| format!("{p}::{v}")).collect();
            out.push_str(&format!("    shortest_cycle: {}\n", chain.join(" -> ")));
        }
    }
    out
}

/// Walks the analyzed grammar and writes one artifact per production,
/// skipping any name for which the sink reports a pre-existing hand-written
/// file (§6). `customizations` is accepted for parity with the CLI pipeline
/// even though this renderer does not yet consume it (custom node content
/// injection is left to a downstream code generator).
pub fn emit_all(
    grammar: &Grammar,
    analysis: &Analysis,
    _customizations: &Customizations,
    sink: &mut dyn ArtifactSink,
) -> std::io::Result<Vec<String>> {
    let mut emitted = Vec::new();
    for artifact in build_artifacts(grammar, analysis) {
        let artifact_name = format!("{}.artifact", artifact.name);
        if sink.exists(&artifact_name) {
            continue;
        }
        let body = render_artifact(&artifact);
        sink.emit(&artifact_name, &body)?;
        emitted.push(artifact_name);
    }
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::analyze as run_analysis;
    use crate::diagnostics::Diagnostics;
    use crate::lexer::{lex, significant};
    use crate::parser::parse_grammar;

    fn grammar_of(source: &str) -> Grammar {
        let tokens = lex(source).unwrap();
        let sig = significant(&tokens);
        parse_grammar(&sig).unwrap()
    }

    #[test]
    fn literals_are_catalogued_as_keywords_or_punctuation() {
        let g = grammar_of("X: (@toplevel)\n  \"if\" \"(\" \")\"\n");
        let catalogue = catalogue_literals(&g);
        assert!(catalogue.keywords.contains(&"if".to_owned()));
        assert!(catalogue.punctuation.contains(&"(".to_owned()));
    }

    #[test]
    fn identifier_wrapper_is_recognized_transitively() {
        let g = grammar_of("A: (@toplevel)\n  B\nB:\n  Identifier\n");
        let a = g.production("A").unwrap();
        assert!(is_identifier_wrapper(&g, a, &mut Vec::new()));
    }

    #[test]
    fn emit_all_writes_one_artifact_per_surviving_production() {
        let mut g = grammar_of("E: (@toplevel)\n  E \"+\" E\n  \"n\"\n");
        let mut diags = Diagnostics::new();
        let analysis = run_analysis(&mut g, &mut diags).unwrap();
        let mut sink = InMemoryArtifactSink::new();
        let emitted = emit_all(&g, &analysis, &Customizations::default(), &mut sink).unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(sink.artifacts().len(), 1);
    }

    #[test]
    fn shortest_cycle_ends_back_at_the_starting_production() {
        let mut g = grammar_of("E: (@toplevel)\n  E \"+\" E\n  \"n\"\n");
        let mut diags = Diagnostics::new();
        let analysis = run_analysis(&mut g, &mut diags).unwrap();
        let artifacts = build_artifacts(&g, &analysis);
        let e = artifacts.iter().find(|a| a.name == "E").unwrap();
        let lr_variant = e.variants.iter().find(|v| v.is_lr).expect("E has an LR variant");
        let cycle = lr_variant.shortest_cycle.as_ref().expect("LR variant records a shortest cycle");
        let (last_production, _) = cycle.last().expect("cycle is non-empty");
        assert_eq!(last_production, "E");
    }

    #[test]
    fn existing_hand_written_file_is_skipped() {
        let mut g = grammar_of("E: (@toplevel)\n  \"n\"\n");
        let mut diags = Diagnostics::new();
        let analysis = run_analysis(&mut g, &mut diags).unwrap();
        let mut sink = InMemoryArtifactSink::new();
        sink.seed_existing("E.artifact");
        let emitted = emit_all(&g, &analysis, &Customizations::default(), &mut sink).unwrap();
        assert!(emitted.is_empty());
    }
}
