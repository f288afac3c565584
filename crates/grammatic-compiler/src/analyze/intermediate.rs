//! Intermediate inference (§4.4): resolving each `@intermediate` variant to
//! the single nonterminal reference it delegates to, and rewriting the
//! annotation to `(@delegate=<name>)`.

use crate::model::{is_builtin, Grammar};
use crate::parser::{well_known, Annotation, Pt};

#[derive(Debug, Clone, thiserror::Error)]
#[error("variant '{variant}' of production '{production}' is marked @intermediate but has no unique delegate")]
pub struct NoDelegateError {
    pub production: String,
    pub variant: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Delegate {
    None,
    One(String),
    Disqualified,
}

fn merge(a: Delegate, b: Delegate) -> Delegate {
    match (a, b) {
        (Delegate::Disqualified, _) | (_, Delegate::Disqualified) => Delegate::Disqualified,
        (Delegate::None, x) => x,
        (x, Delegate::None) => x,
        (Delegate::One(_), Delegate::One(_)) => Delegate::Disqualified,
    }
}

fn delegate_of_node(node: &Pt, allow_literals: bool) -> Delegate {
    match node {
        Pt::Reference { name, .. } => {
            if is_builtin(name) {
                Delegate::Disqualified
            } else {
                Delegate::One(name.clone())
            }
        }
        Pt::Literal { .. } => {
            if allow_literals {
                Delegate::None
            } else {
                Delegate::Disqualified
            }
        }
        Pt::NegativeLookahead(_) => Delegate::None,
        Pt::Sequence(_) | Pt::Repeated(_) | Pt::Optional(_) => delegate_of_nodes(node.children(), allow_literals),
    }
}

fn delegate_of_nodes(nodes: &[Pt], allow_literals: bool) -> Delegate {
    let mut acc = Delegate::None;
    for node in nodes {
        acc = merge(acc, delegate_of_node(node, allow_literals));
        if acc == Delegate::Disqualified {
            break;
        }
    }
    acc
}

/// Rewrites every `@intermediate` variant's annotation to `(@delegate=...)`
/// in place, failing if any such variant has no unique delegate. Literals
/// are ignored (treated as contributing nothing) while inferring the
/// delegate of an `@intermediate` variant, per §4.4.
pub fn infer_intermediates(grammar: &mut Grammar) -> Result<(), NoDelegateError> {
    for production in grammar.productions.values_mut() {
        for variant in &mut production.variants {
            let Some(intermediate_idx) = variant
                .annotations
                .iter()
                .position(|a| a.name == well_known::INTERMEDIATE)
            else {
                continue;
            };

            let delegate = delegate_of_nodes(&variant.ptree, true);
            let Delegate::One(name) = delegate else {
                return Err(NoDelegateError {
                    production: production.name.clone(),
                    variant: variant.name.clone(),
                });
            };

            let span = variant.annotations[intermediate_idx].span;
            variant.annotations.remove(intermediate_idx);
            variant.annotations.push(Annotation {
                name: well_known::DELEGATE.to_owned(),
                value: Some(name),
                span,
            });
        }
    }
    Ok(())
}
