//! FIRST-set / lookahead fixed point (§4.7).

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{self, builtin_first_set, is_builtin, Grammar, BUILTIN, IDENTIFIER_START_CLASS};
use crate::parser::{well_known, Pt};

type VariantKey = (String, String);

/// A variant's or production's reported FIRST set: either a concrete set of
/// single characters / character-class markers, or the *anytoken* sentinel
/// for anything that can match the empty string (§4.7's last paragraph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookaheadSet {
    Tokens(BTreeSet<String>),
    AnyToken,
}

#[derive(Debug, Clone, Default)]
pub struct Lookahead {
    variant_first: HashMap<VariantKey, BTreeSet<String>>,
    production_first: HashMap<String, BTreeSet<String>>,
}

impl Lookahead {
    /// The reported lookahead for one variant, folding in the "nullable
    /// production / distinguished ignorable production reports as anytoken"
    /// rule on top of the fixed-point-computed token set.
    pub fn reported(&self, production: &str, variant: &str, nullable: &HashSet<String>) -> LookaheadSet {
        if nullable.contains(production) || production == model::JAVADOC_COMMENT {
            return LookaheadSet::AnyToken;
        }
        let tokens = self
            .variant_first
            .get(&(production.to_owned(), variant.to_owned()))
            .cloned()
            .unwrap_or_default();
        LookaheadSet::Tokens(tokens)
    }

    pub fn production_tokens(&self, production: &str) -> Option<&BTreeSet<String>> {
        self.production_first.get(production)
    }
}

/// Escapes a regex metacharacter, leaving everything else untouched.
fn escape_char(c: char) -> String {
    const METACHARS: &[char] = &['.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '^', '$', '|', '\\'];
    if METACHARS.contains(&c) {
        format!("\\{c}")
    } else {
        c.to_string()
    }
}

/// Walks `nodes` in order, seeding `toks`/`refs` up to the first position
/// that definitely consumes a token. Returns whether such a position was
/// found (so a caller walking an enclosing sequence knows to stop too).
fn seed(nodes: &[Pt], toks: &mut Vec<String>, refs: &mut Vec<String>) -> bool {
    for node in nodes {
        let consumed = match node {
            Pt::Literal { text, .. } => {
                if let Some(c) = text.chars().next() {
                    toks.push(escape_char(c));
                }
                true
            }
            Pt::Reference { name, .. } => {
                refs.push(name.clone());
                true
            }
            Pt::Optional(_) | Pt::Repeated(_) | Pt::NegativeLookahead(_) => false,
            Pt::Sequence(children) => seed(children, toks, refs),
        };
        if consumed {
            return true;
        }
    }
    false
}

fn seed_variants(grammar: &Grammar) -> HashMap<VariantKey, (Vec<String>, Vec<String>)> {
    let mut out = HashMap::new();
    for production in grammar.productions.values() {
        let interp = production.has_annotation(well_known::INTERP);
        for variant in &production.variants {
            let mut toks = Vec::new();
            let mut refs = Vec::new();
            seed(&variant.ptree, &mut toks, &mut refs);
            if interp {
                toks.push("<".to_owned());
            }
            out.insert((production.name.clone(), variant.name.clone()), (toks, refs));
        }
    }
    out
}

fn production_union(grammar: &Grammar, production: &str, variant_first: &HashMap<VariantKey, BTreeSet<String>>) -> BTreeSet<String> {
    let mut union = BTreeSet::new();
    if let Some(p) = grammar.production(production) {
        for v in &p.variants {
            if let Some(set) = variant_first.get(&(production.to_owned(), v.name.clone())) {
                union.extend(set.iter().cloned());
            }
        }
    }
    union
}

/// Computes FIRST sets for every variant and production by iterating to a
/// fixed point, then post-processes per §4.7's identifier-class rule.
pub fn compute_lookahead(grammar: &Grammar) -> Lookahead {
    let seeds = seed_variants(grammar);

    let mut variant_first: HashMap<VariantKey, BTreeSet<String>> = seeds
        .iter()
        .map(|(key, (toks, _))| (key.clone(), toks.iter().cloned().collect()))
        .collect();
    let mut production_first: HashMap<String, BTreeSet<String>> = grammar
        .production_names()
        .map(|name| (name.to_owned(), production_union(grammar, name, &variant_first)))
        .collect();

    loop {
        let mut changed = false;

        for (key, (_, refs)) in &seeds {
            let (production, _) = key;
            for r in refs {
                let addition: BTreeSet<String> = if r == BUILTIN {
                    production_first.get(production).cloned().unwrap_or_default()
                } else if is_builtin(r) {
                    builtin_first_set(r).into_iter().flatten().map(str::to_owned).collect()
                } else {
                    production_first.get(r).cloned().unwrap_or_default()
                };
                let set = variant_first.entry(key.clone()).or_default();
                for t in addition {
                    if set.insert(t) {
                        changed = true;
                    }
                }
            }
        }

        for name in grammar.production_names() {
            let union = production_union(grammar, name, &variant_first);
            let entry = production_first.entry(name.to_owned()).or_default();
            for t in union {
                if entry.insert(t) {
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    for set in variant_first.values_mut() {
        if set.contains(IDENTIFIER_START_CLASS) {
            set.retain(|t| !(t.len() == 1 && t.chars().next().unwrap().is_ascii_lowercase()));
        }
    }
    for set in production_first.values_mut() {
        if set.contains(IDENTIFIER_START_CLASS) {
            set.retain(|t| !(t.len() == 1 && t.chars().next().unwrap().is_ascii_lowercase()));
        }
    }

    Lookahead {
        variant_first,
        production_first,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::nullability::compute_nullable;
    use crate::lexer::{lex, significant};
    use crate::parser::parse_grammar;

    fn grammar_of(source: &str) -> Grammar {
        let tokens = lex(source).unwrap();
        let sig = significant(&tokens);
        parse_grammar(&sig).unwrap()
    }

    #[test]
    fn literal_first_character_is_seeded() {
        let g = grammar_of("X:\n  \"n\"\n");
        let nullable = compute_nullable(&g);
        let la = compute_lookahead(&g);
        match la.reported("X", "N", &nullable) {
            LookaheadSet::Tokens(t) => assert!(t.contains("n")),
            LookaheadSet::AnyToken => panic!("X is not nullable"),
        }
    }

    #[test]
    fn nullable_production_reports_anytoken() {
        let g = grammar_of("L:\n  { \",\" N }\nN:\n  \"n\"\n");
        let nullable = compute_nullable(&g);
        assert!(nullable.contains("L"));
        let la = compute_lookahead(&g);
        let l = g.production("L").unwrap();
        let variant_name = l.variants[0].name.clone();
        assert_eq!(la.reported("L", &variant_name, &nullable), LookaheadSet::AnyToken);
    }

    #[test]
    fn reference_first_set_propagates_through_fixed_point() {
        let g = grammar_of("A:\n  B\nB:\n  \"b\"\n");
        let nullable = compute_nullable(&g);
        let la = compute_lookahead(&g);
        let a = g.production("A").unwrap();
        match la.reported("A", &a.variants[0].name, &nullable) {
            LookaheadSet::Tokens(t) => assert!(t.contains("b")),
            LookaheadSet::AnyToken => panic!("A is not nullable"),
        }
    }

    #[test]
    fn interp_annotated_production_additionally_seeds_angle_bracket() {
        let g = grammar_of("X: (@interp=Java)\n  \"x\"\n");
        let nullable = compute_nullable(&g);
        let la = compute_lookahead(&g);
        let x = g.production("X").unwrap();
        match la.reported("X", &x.variants[0].name, &nullable) {
            LookaheadSet::Tokens(t) => {
                assert!(t.contains("<"));
                assert!(t.contains("x"));
            }
            LookaheadSet::AnyToken => panic!("X is not nullable"),
        }
    }

    #[test]
    fn identifier_start_class_strips_lowercase_letters() {
        let g = grammar_of("X:\n  Identifier\n");
        let nullable = compute_nullable(&g);
        let la = compute_lookahead(&g);
        let x = g.production("X").unwrap();
        match la.reported("X", &x.variants[0].name, &nullable) {
            LookaheadSet::Tokens(t) => {
                assert!(t.contains(IDENTIFIER_START_CLASS));
                assert!(!t.contains("a"));
            }
            LookaheadSet::AnyToken => panic!("X is not nullable"),
        }
    }
}
