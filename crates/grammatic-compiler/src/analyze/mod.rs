//! Static analysis passes that run over a parsed [`crate::model::Grammar`]:
//! reachability pruning, intermediate inference, nullability, left-call /
//! left-recursion detection, and FIRST-set lookahead (§4.4-§4.7).

mod intermediate;
mod left_recursion;
mod lookahead;
mod nullability;
mod reachability;

pub use intermediate::{infer_intermediates, NoDelegateError};
pub use left_recursion::{analyze as analyze_left_recursion, LeftCallAnalysis, LeftRecursionWitness};
pub use lookahead::{compute_lookahead, Lookahead, LookaheadSet};
pub use nullability::compute_nullable;
pub use reachability::{compute_reachable, prune_unreachable};

use std::collections::HashSet;

use crate::diagnostics::Diagnostics;
use crate::model::Grammar;

/// The full, read-only analysis result threaded into emission (§4.8).
#[derive(Debug, Clone)]
pub struct Analysis {
    pub nullable: HashSet<String>,
    pub left_calls: LeftCallAnalysis,
    pub lookahead: Lookahead,
}

/// Runs every analysis stage in the order §4 lays them out: prune
/// unreachable productions, resolve `@intermediate` delegates, then compute
/// nullability, left-recursion, and lookahead over the pruned, delegate-
/// resolved grammar.
pub fn analyze(grammar: &mut Grammar, diagnostics: &mut Diagnostics) -> Result<Analysis, NoDelegateError> {
    prune_unreachable(grammar, diagnostics);
    infer_intermediates(grammar)?;

    let nullable = compute_nullable(grammar);
    let left_calls = analyze_left_recursion(grammar, &nullable);
    let lookahead = compute_lookahead(grammar);

    Ok(Analysis {
        nullable,
        left_calls,
        lookahead,
    })
}
