//! The in-memory grammar model: chapters, productions, and variants, plus
//! the closed set of reserved builtin names.
//!
//! Built once by the structural parser (§4.2) and then only mutated by
//! reachability pruning (§4.4, dropping unreached productions) and
//! intermediate inference (§4.4, rewriting `@intermediate` into
//! `@delegate=...`). Every later analysis pass is read-only over it.

use indexmap::IndexMap;

use super::parser::{Annotation, Pt};

/// A single alternative of a production.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub ptree: Vec<Pt>,
    pub annotations: Vec<Annotation>,
}

impl Variant {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }
}

/// A named nonterminal with one or more variants.
#[derive(Debug, Clone)]
pub struct Production {
    pub name: String,
    pub chapter: String,
    pub variants: Vec<Variant>,
    pub annotations: Vec<Annotation>,
}

impl Production {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    pub fn is_nonstandard(&self) -> bool {
        self.has_annotation(super::parser::well_known::NONSTANDARD)
    }

    pub fn is_toplevel(&self) -> bool {
        self.has_annotation(super::parser::well_known::TOPLEVEL)
    }

    /// A production is a *leaf* production if its single variant references
    /// only the reserved `builtin` sentinel.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.variants.as_slice(),
            [Variant { ptree, .. }]
                if matches!(
                    ptree.as_slice(),
                    [Pt::Reference { name, .. }] if name == BUILTIN
                )
        )
    }
}

/// A named grouping of productions; metadata only, used for cross-reference
/// reports, not for any analysis decision.
#[derive(Debug, Clone)]
pub struct Chapter {
    pub name: String,
    pub production_names: Vec<String>,
}

/// The grammar model: chapters in declaration order, and productions
/// indexed by name (but also kept in declaration order via `IndexMap`, so
/// that diagnostic dumps and emission are deterministic).
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub chapters: Vec<Chapter>,
    pub productions: IndexMap<String, Production>,
}

impl Grammar {
    pub fn production(&self, name: &str) -> Option<&Production> {
        self.productions.get(name)
    }

    pub fn production_mut(&mut self, name: &str) -> Option<&mut Production> {
        self.productions.get_mut(name)
    }

    pub fn production_names(&self) -> impl Iterator<Item = &str> {
        self.productions.keys().map(String::as_str)
    }

    /// Every `(production, variant)` pair in declaration order.
    pub fn variants(&self) -> impl Iterator<Item = (&Production, &Variant)> {
        self.productions
            .values()
            .flat_map(|p| p.variants.iter().map(move |v| (p, v)))
    }
}

pub const BUILTIN: &str = "builtin";
pub const ANY: &str = "any";
pub const IDENTIFIER: &str = "Identifier";
pub const IDENTIFIER_CHARS: &str = "IdentifierChars";
pub const FLOATING_POINT_LITERAL: &str = "FloatingPointLiteral";
pub const INTEGER_LITERAL: &str = "IntegerLiteral";
pub const CHARACTER_LITERAL: &str = "CharacterLiteral";
pub const STRING_LITERAL: &str = "StringLiteral";
pub const JAVADOC_COMMENT: &str = "JavaDocComment";

/// The closed, known-in-advance set of reserved builtin names. Never
/// redefined as productions; their nullability and FIRST sets are supplied
/// as constants rather than computed.
pub const RESERVED_BUILTINS: &[&str] = &[
    BUILTIN,
    ANY,
    IDENTIFIER,
    IDENTIFIER_CHARS,
    FLOATING_POINT_LITERAL,
    INTEGER_LITERAL,
    CHARACTER_LITERAL,
    STRING_LITERAL,
    JAVADOC_COMMENT,
];

pub fn is_builtin(name: &str) -> bool {
    RESERVED_BUILTINS.contains(&name)
}

/// Constant FIRST set for a builtin, as a set of either single characters or
/// pseudo-character-class markers (§9 "Lazy character classes"). `None` for
/// the self-reference sentinels (`any`, `builtin`) and ignorable builtins,
/// which contribute nothing of their own.
///
/// The identifier-start class is represented as the literal string
/// `"[A-Za-z_$]"` so it can live in the same set as ordinary characters;
/// downstream consumers interpret it specially (§4.7's final "strip
/// lowercase letters" pass looks for exactly this marker).
pub const IDENTIFIER_START_CLASS: &str = "[A-Za-z_$]";

pub fn builtin_first_set(name: &str) -> Option<Vec<&'static str>> {
    match name {
        IDENTIFIER | IDENTIFIER_CHARS => Some(vec![IDENTIFIER_START_CLASS]),
        FLOATING_POINT_LITERAL => Some(vec![".", "0-9"]),
        INTEGER_LITERAL => Some(vec!["0-9"]),
        CHARACTER_LITERAL => Some(vec!["'"]),
        STRING_LITERAL => Some(vec!["\""]),
        JAVADOC_COMMENT | ANY | BUILTIN => None,
        _ => None,
    }
}

/// Builtins other than `any`/`builtin` never match the empty string; `any`
/// and `builtin` are self-reference sentinels that never stand for a
/// grammar production whose nullability could be in question, so they are
/// likewise treated as non-nullable. See DESIGN.md for the rationale (this
/// resolves an ambiguity the distilled spec leaves implicit).
pub fn builtin_is_nullable(_name: &str) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_builtins_are_recognized() {
        assert!(is_builtin("Identifier"));
        assert!(is_builtin("builtin"));
        assert!(!is_builtin("Expression"));
    }

    #[test]
    fn builtin_first_sets_match_the_spec_table() {
        assert_eq!(builtin_first_set(INTEGER_LITERAL), Some(vec!["0-9"]));
        assert_eq!(builtin_first_set(STRING_LITERAL), Some(vec!["\""]));
        assert_eq!(builtin_first_set(JAVADOC_COMMENT), None);
        assert_eq!(builtin_first_set(ANY), None);
    }
}
