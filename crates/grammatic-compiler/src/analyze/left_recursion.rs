//! Left-call sets, left-recursion detection, shortest LR cycles, and
//! LR-forwarding (§4.6).

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{is_builtin, Grammar, Production};
use crate::parser::Pt;

type VariantKey = (String, String);

/// The witnessing chain for one left-recursive variant: `chain[0]` is the
/// variant itself; each entry left-calls the next entry's production, and
/// `chain.last()` left-calls the starting production back around.
#[derive(Debug, Clone)]
pub struct LeftRecursionWitness {
    pub chain: Vec<VariantKey>,
}

/// Results of the §4.6 analysis over one grammar.
///
/// `shortest_cycles` is keyed by `(variant, callee)`, not by `variant`
/// alone: a single LR variant can left-call several distinct productions,
/// and each such callee has its own shortest path back to the variant
/// (§3's data model, `shortest_lr_cycle`).
#[derive(Debug, Clone, Default)]
pub struct LeftCallAnalysis {
    pub left_calls: HashMap<VariantKey, Vec<String>>,
    pub lr_variants: HashMap<VariantKey, LeftRecursionWitness>,
    pub shortest_cycles: HashMap<(VariantKey, String), Vec<VariantKey>>,
}

impl LeftCallAnalysis {
    pub fn is_lr(&self, production: &str, variant: &str) -> bool {
        self.lr_variants
            .contains_key(&(production.to_owned(), variant.to_owned()))
    }

    /// The shortest of the per-callee cycles recorded for `(production,
    /// variant)`, for callers (artifact emission, verbose dumps) that just
    /// want one representative witness rather than the full per-callee
    /// table.
    pub fn shortest_cycle_for(&self, production: &str, variant: &str) -> Option<&Vec<VariantKey>> {
        let key = (production.to_owned(), variant.to_owned());
        self.shortest_cycles
            .iter()
            .filter(|((k, _), _)| k == &key)
            .map(|(_, path)| path)
            .min_by_key(|path| path.len())
    }

    /// The union, across every variant of `production`, of the productions
    /// it left-calls. Used to color left-call edges when rendering the
    /// nonterminal reference graph.
    pub fn left_calls_of<'a, 'b>(&'a self, production: &'b str) -> impl Iterator<Item = &'a String> + use<'a, 'b> {
        self.left_calls
            .iter()
            .filter(move |((p, _), _)| p == production)
            .flat_map(|(_, callees)| callees.iter())
    }

    /// A production is LR-forwarding iff every one of its LR variants is a
    /// bare reference to another production that itself has an LR variant.
    /// Such productions have `isLR` cleared on emission: they only re-enter
    /// an existing cycle rather than originating one.
    pub fn is_lr_forwarding(&self, grammar: &Grammar, production: &Production) -> bool {
        let lr_variants: Vec<_> = production
            .variants
            .iter()
            .filter(|v| self.is_lr(&production.name, &v.name))
            .collect();
        if lr_variants.is_empty() {
            return false;
        }
        lr_variants.iter().all(|v| match v.ptree.as_slice() {
            [Pt::Reference { name, .. }] if !is_builtin(name) => grammar
                .production(name)
                .is_some_and(|target| target.variants.iter().any(|tv| self.is_lr(name, &tv.name))),
            _ => false,
        })
    }
}

fn add_left_calls(nodes: &[Pt], nullable: &HashSet<String>, calls: &mut Vec<String>) {
    for node in nodes {
        match node {
            Pt::Sequence(_) | Pt::Repeated(_) | Pt::Optional(_) => {
                add_left_calls(node.children(), nullable, calls);
            }
            Pt::NegativeLookahead(_) => continue,
            Pt::Reference { name, .. } => {
                if is_builtin(name) {
                    break;
                }
                calls.push(name.clone());
                if !nullable.contains(name) {
                    break;
                }
            }
            Pt::Literal { .. } => break,
        }
    }
}

fn compute_left_calls(grammar: &Grammar, nullable: &HashSet<String>) -> HashMap<VariantKey, Vec<String>> {
    let mut out = HashMap::new();
    for production in grammar.productions.values() {
        for variant in &production.variants {
            let mut calls = Vec::new();
            add_left_calls(&variant.ptree, nullable, &mut calls);
            out.insert((production.name.clone(), variant.name.clone()), calls);
        }
    }
    out
}

fn find_left_recursion(
    grammar: &Grammar,
    left_calls: &HashMap<VariantKey, Vec<String>>,
    start_prod: &str,
    start_variant: &str,
) -> Option<LeftRecursionWitness> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut chain: Vec<VariantKey> = Vec::new();

    fn recurse(
        grammar: &Grammar,
        left_calls: &HashMap<VariantKey, Vec<String>>,
        start_prod: &str,
        seen: &mut HashSet<String>,
        chain: &mut Vec<VariantKey>,
        p: &str,
        v: &str,
    ) -> Option<Vec<VariantKey>> {
        chain.push((p.to_owned(), v.to_owned()));
        let calls = left_calls.get(&(p.to_owned(), v.to_owned())).cloned().unwrap_or_default();
        for callee_name in &calls {
            if callee_name == start_prod {
                let witness = chain.clone();
                chain.pop();
                return Some(witness);
            }
            if seen.contains(callee_name) {
                chain.pop();
                return None;
            }
            seen.insert(callee_name.clone());
            if let Some(callee) = grammar.production(callee_name) {
                for callee_variant in &callee.variants {
                    if let Some(found) = recurse(
                        grammar,
                        left_calls,
                        start_prod,
                        seen,
                        chain,
                        callee_name,
                        &callee_variant.name,
                    ) {
                        chain.pop();
                        return Some(found);
                    }
                }
            }
        }
        chain.pop();
        None
    }

    recurse(grammar, left_calls, start_prod, &mut seen, &mut chain, start_prod, start_variant)
        .map(|chain| LeftRecursionWitness { chain })
}

/// BFS over `(production, variant)` nodes, following left-call edges, for
/// the shortest chain from any variant of `from_production` back to `to`.
fn shortest_left_call_cycle(
    grammar: &Grammar,
    left_calls: &HashMap<VariantKey, Vec<String>>,
    from_production: &str,
    to: &VariantKey,
) -> Option<Vec<VariantKey>> {
    let start = grammar.production(from_production)?;
    let mut visited: HashSet<VariantKey> = HashSet::new();
    let mut prev: HashMap<VariantKey, VariantKey> = HashMap::new();
    let mut queue: VecDeque<VariantKey> = VecDeque::new();

    for v in &start.variants {
        let node = (from_production.to_owned(), v.name.clone());
        if visited.insert(node.clone()) {
            queue.push_back(node);
        }
    }

    while let Some(node) = queue.pop_front() {
        if &node == to {
            let mut path = vec![node.clone()];
            let mut cur = node;
            while let Some(p) = prev.get(&cur) {
                path.push(p.clone());
                cur = p.clone();
            }
            path.reverse();
            return Some(path);
        }
        if let Some(calls) = left_calls.get(&node) {
            for callee in calls {
                let Some(callee_prod) = grammar.production(callee) else { continue };
                for cv in &callee_prod.variants {
                    let next = (callee.clone(), cv.name.clone());
                    if visited.insert(next.clone()) {
                        prev.insert(next.clone(), node.clone());
                        queue.push_back(next);
                    }
                }
            }
        }
    }
    None
}

/// For every LR variant, and every distinct production it left-calls,
/// records the shortest left-call chain from that callee back to the
/// variant. Keyed by `(variant, callee)` rather than collapsed to a single
/// "best" path per variant, per §3's data model: a variant that left-calls
/// two different productions can have two different shortest cycles.
fn compute_shortest_cycles(
    grammar: &Grammar,
    left_calls: &HashMap<VariantKey, Vec<String>>,
    lr_variants: &HashMap<VariantKey, LeftRecursionWitness>,
) -> HashMap<(VariantKey, String), Vec<VariantKey>> {
    let mut results = HashMap::new();
    for key in lr_variants.keys() {
        let mut callees = left_calls.get(key).cloned().unwrap_or_default();
        callees.sort();
        callees.dedup();
        for callee in &callees {
            if let Some(path) = shortest_left_call_cycle(grammar, left_calls, callee, key) {
                results.insert((key.clone(), callee.clone()), path);
            }
        }
    }
    results
}

/// Runs the full §4.6 analysis: left-call sets, left-recursion discovery,
/// and shortest-cycle computation for every discovered LR variant.
pub fn analyze(grammar: &Grammar, nullable: &HashSet<String>) -> LeftCallAnalysis {
    let left_calls = compute_left_calls(grammar, nullable);

    let mut lr_variants = HashMap::new();
    for production in grammar.productions.values() {
        for variant in &production.variants {
            if lr_variants.contains_key(&(production.name.clone(), variant.name.clone())) {
                continue;
            }
            if let Some(witness) = find_left_recursion(grammar, &left_calls, &production.name, &variant.name) {
                lr_variants.insert((production.name.clone(), variant.name.clone()), witness);
            }
        }
    }

    let shortest_cycles = compute_shortest_cycles(grammar, &left_calls, &lr_variants);

    LeftCallAnalysis {
        left_calls,
        lr_variants,
        shortest_cycles,
    }
}
