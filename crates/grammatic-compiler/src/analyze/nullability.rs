//! Nullability ("empty-matching") pass (§4.5).
//!
//! For each production, decides whether some variant can match the empty
//! input. Implemented as a DFS over the reference graph with a tri-state
//! result per node (`Empty` / `NonEmpty` / `Cyclic`) rather than a classic
//! monotone worklist, since cyclic references must be allowed to resolve
//! without forcing a conservative default in either direction.

use std::collections::HashSet;

use crate::model::{builtin_is_nullable, is_builtin, Grammar};
use crate::parser::Pt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NullState {
    Empty,
    NonEmpty,
    Cyclic,
}

struct Walker<'g> {
    grammar: &'g Grammar,
    computed: HashSet<String>,
    empty_matching: HashSet<String>,
}

impl<'g> Walker<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Walker {
            grammar,
            computed: HashSet::new(),
            empty_matching: HashSet::new(),
        }
    }

    fn walk_pt(&mut self, node: &Pt, seen: &mut HashSet<String>) -> (NullState, bool) {
        match node {
            Pt::Optional(_) | Pt::Repeated(_) | Pt::NegativeLookahead(_) => (NullState::Empty, false),
            Pt::Literal { text, .. } => {
                let state = if text.is_empty() { NullState::Empty } else { NullState::NonEmpty };
                (state, false)
            }
            Pt::Reference { name, .. } => self.walk_ref(name, seen),
            Pt::Sequence(children) => self.walk_cat(children, seen),
        }
    }

    fn walk_ref(&mut self, name: &str, seen: &mut HashSet<String>) -> (NullState, bool) {
        if is_builtin(name) {
            let state = if builtin_is_nullable(name) { NullState::Empty } else { NullState::NonEmpty };
            return (state, false);
        }
        if self.computed.contains(name) {
            let state = if self.empty_matching.contains(name) { NullState::Empty } else { NullState::NonEmpty };
            return (state, false);
        }
        if seen.contains(name) {
            return (NullState::Cyclic, true);
        }
        seen.insert(name.to_owned());
        let result = self.walk_prod(name, seen, false);
        seen.remove(name);
        result
    }

    fn walk_cat(&mut self, children: &[Pt], seen: &mut HashSet<String>) -> (NullState, bool) {
        let mut overall = NullState::Empty;
        let mut cycle_detected = false;
        for child in children {
            let (e, c) = self.walk_pt(child, seen);
            if e == NullState::NonEmpty {
                overall = NullState::NonEmpty;
                break;
            }
            if c {
                cycle_detected = true;
            }
        }
        (overall, cycle_detected)
    }

    fn walk_prod(&mut self, name: &str, seen: &mut HashSet<String>, topmost: bool) -> (NullState, bool) {
        let production = self
            .grammar
            .production(name)
            .expect("reference resolves to a production in the analyzed grammar");

        let mut overall = NullState::Cyclic;
        let mut cycle = false;
        for variant in &production.variants {
            let (e, c) = self.walk_cat(&variant.ptree, seen);
            if c {
                cycle = true;
            }
            match e {
                NullState::Empty => {
                    overall = NullState::Empty;
                    break;
                }
                NullState::NonEmpty => overall = NullState::NonEmpty,
                NullState::Cyclic => {}
            }
        }

        if topmost || !cycle {
            self.computed.insert(name.to_owned());
            if overall == NullState::Empty {
                self.empty_matching.insert(name.to_owned());
            }
        }
        (overall, cycle)
    }
}

/// Computes the set of production names that can match the empty input.
pub fn compute_nullable(grammar: &Grammar) -> HashSet<String> {
    let mut walker = Walker::new(grammar);
    for name in grammar.production_names().map(str::to_owned).collect::<Vec<_>>() {
        if walker.computed.contains(&name) {
            continue;
        }
        let mut seen = HashSet::new();
        seen.insert(name.clone());
        walker.walk_prod(&name, &mut seen, true);
    }
    walker.empty_matching
}
