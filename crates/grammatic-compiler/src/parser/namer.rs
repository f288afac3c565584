//! Derives stable, unique identifier names for variants from their
//! constituent tokens (§4.3).

use std::collections::HashSet;

use super::super::lexer::{Token, TokenKind};
use super::StructuralError;

struct PunctNode {
    mnemonic: Option<&'static str>,
    children: &'static [(char, PunctNode)],
}

const NONE: &[(char, PunctNode)] = &[];

const ELLIP: PunctNode = PunctNode {
    mnemonic: Some("ellip"),
    children: NONE,
};
const DOT2: PunctNode = PunctNode {
    mnemonic: None,
    children: &[('.', ELLIP)],
};
const DOT: PunctNode = PunctNode {
    mnemonic: Some("dot"),
    children: &[('.', DOT2)],
};
const AMP2: PunctNode = PunctNode {
    mnemonic: Some("amp2"),
    children: NONE,
};
const AMP: PunctNode = PunctNode {
    mnemonic: Some("amp"),
    children: &[('&', AMP2)],
};
const PIP2: PunctNode = PunctNode {
    mnemonic: Some("pip2"),
    children: NONE,
};
const PIP: PunctNode = PunctNode {
    mnemonic: Some("pip"),
    children: &[('|', PIP2)],
};
const LT3: PunctNode = PunctNode {
    mnemonic: Some("lt3"),
    children: NONE,
};
const LT2: PunctNode = PunctNode {
    mnemonic: Some("lt2"),
    children: &[('<', LT3)],
};
const LT: PunctNode = PunctNode {
    mnemonic: Some("lt"),
    children: &[('<', LT2)],
};
const GT3: PunctNode = PunctNode {
    mnemonic: Some("gt3"),
    children: NONE,
};
const GT2: PunctNode = PunctNode {
    mnemonic: Some("gt2"),
    children: &[('>', GT3)],
};
const GT: PunctNode = PunctNode {
    mnemonic: Some("gt"),
    children: &[('>', GT2)],
};
const ARR: PunctNode = PunctNode {
    mnemonic: Some("arr"),
    children: NONE,
};
const DSH: PunctNode = PunctNode {
    mnemonic: Some("dsh"),
    children: &[('>', ARR)],
};
const LEAF: fn(&'static str) -> PunctNode = |m| PunctNode {
    mnemonic: Some(m),
    children: NONE,
};

const PUNCT_ROOT: &[(char, PunctNode)] = &[
    ('.', DOT),
    ('[', PunctNode { mnemonic: Some("ls"), children: NONE }),
    (']', PunctNode { mnemonic: Some("rs"), children: NONE }),
    ('(', PunctNode { mnemonic: Some("lp"), children: NONE }),
    (')', PunctNode { mnemonic: Some("rp"), children: NONE }),
    ('{', PunctNode { mnemonic: Some("lc"), children: NONE }),
    ('}', PunctNode { mnemonic: Some("rc"), children: NONE }),
    ('&', AMP),
    ('|', PIP),
    ('<', LT),
    ('>', GT),
    (',', PunctNode { mnemonic: Some("com"), children: NONE }),
    ('?', PunctNode { mnemonic: Some("qm"), children: NONE }),
    (';', PunctNode { mnemonic: Some("sem"), children: NONE }),
    ('*', PunctNode { mnemonic: Some("str"), children: NONE }),
    ('=', PunctNode { mnemonic: Some("eq"), children: NONE }),
    ('!', PunctNode { mnemonic: Some("bng"), children: NONE }),
    ('@', PunctNode { mnemonic: Some("at"), children: NONE }),
    ('/', PunctNode { mnemonic: Some("fwd"), children: NONE }),
    ('\\', PunctNode { mnemonic: Some("bck"), children: NONE }),
    (':', PunctNode { mnemonic: Some("cln"), children: NONE }),
    ('-', DSH),
    ('^', PunctNode { mnemonic: Some("hat"), children: NONE }),
    ('~', PunctNode { mnemonic: Some("tld"), children: NONE }),
    ('%', PunctNode { mnemonic: Some("pct"), children: NONE }),
    ('+', PunctNode { mnemonic: Some("pls"), children: NONE }),
    ('#', PunctNode { mnemonic: Some("hsh"), children: NONE }),
    ('"', PunctNode { mnemonic: Some("dq"), children: NONE }),
    ('\'', PunctNode { mnemonic: Some("sq"), children: NONE }),
    ('`', PunctNode { mnemonic: Some("tck"), children: NONE }),
];

fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Longest-match: an identifier run, or the deepest trie mnemonic reachable
/// from `chars[i..]`. Returns the mnemonic and the index just past it.
fn to_alnum(chars: &[char], i: usize) -> Option<(&'static str, usize)> {
    if i < chars.len() && is_ident_part(chars[i]) {
        // caller handles runs of identifier chars separately; this branch
        // only fires when called mid-run, which does not happen from
        // `mnemonics_in` below. Kept for parity with the reference walk.
        return None;
    }
    let mut best = None;
    let mut current = PUNCT_ROOT;
    let mut idx = i;
    while idx < chars.len() {
        let Some((_, node)) = current.iter().find(|(c, _)| *c == chars[idx]) else {
            break;
        };
        if let Some(m) = node.mnemonic {
            best = Some((m, idx + 1));
        }
        if node.children.is_empty() {
            break;
        }
        current = node.children;
        idx += 1;
    }
    best
}

/// Walks a string-literal body and returns the name fragments it
/// contributes, using the longest-match punctuation trie and treating
/// alphanumeric runs as a single fragment.
fn mnemonics_in(body: &str) -> Vec<String> {
    let chars: Vec<char> = body.chars().collect();
    let mut parts = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if is_ident_part(chars[i]) {
            let start = i;
            while i < chars.len() && is_ident_part(chars[i]) {
                i += 1;
            }
            parts.push(chars[start..i].iter().collect());
        } else if let Some((mnemonic, next)) = to_alnum(&chars, i) {
            parts.push(mnemonic.to_owned());
            i = next;
        } else {
            i += 1;
        }
    }
    parts
}

fn to_upper_camel(parts: &[String]) -> String {
    let joined = parts.join("_");
    let mut result = String::new();
    let mut cap_next = true;
    let mut prev_underscore = false;
    for c in joined.chars() {
        if c == '_' {
            if prev_underscore {
                continue; // collapse runs of '_'
            }
            cap_next = true;
            prev_underscore = true;
            continue;
        }
        prev_underscore = false;
        if cap_next {
            result.extend(c.to_uppercase());
            cap_next = false;
        } else {
            result.push(c);
        }
    }
    if result.is_empty() {
        "Epsilon".to_owned()
    } else {
        result
    }
}

/// Builds the token-derived base name for a variant, per §4.3's part rules.
/// Annotation tokens are expected to already have been split off by the
/// caller; this only inspects the parse-tree tokens.
fn synthesize_base_name(tokens: &[Token]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for tok in tokens {
        match tok.kind {
            TokenKind::Identifier => parts.push(tok.text.clone()),
            TokenKind::QuotedString => {
                let body = tok.text.trim_matches('"');
                parts.extend(mnemonics_in(body));
            }
            TokenKind::Other if tok.text == "!" => {
                if parts.last().map(String::as_str) == Some("not") {
                    parts.pop();
                    parts.push("exp".to_owned());
                } else {
                    parts.push("not".to_owned());
                }
            }
            _ => {}
        }
    }
    to_upper_camel(&parts)
}

/// Assigns unique variant names within one production.
#[derive(Default)]
pub struct VariantNamer {
    used: HashSet<String>,
}

impl VariantNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `explicit` is the variant's `(@name=...)` annotation value, if any.
    /// `production` names the owning production, for error messages.
    pub fn name_for(
        &mut self,
        tokens: &[Token],
        explicit: Option<&str>,
        production: &str,
    ) -> Result<String, StructuralError> {
        if let Some(name) = explicit {
            if self.used.contains(name) {
                return Err(StructuralError::AmbiguousVariantName {
                    name: name.to_owned(),
                    production: production.to_owned(),
                });
            }
            self.used.insert(name.to_owned());
            return Ok(name.to_owned());
        }

        let base = synthesize_base_name(tokens);
        if !self.used.contains(&base) {
            self.used.insert(base.clone());
            return Ok(base);
        }
        let mut counter = 1u32;
        loop {
            let candidate = format!("{base}${counter}");
            if !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammatic_core::Position;

    fn ident(text: &str) -> Token {
        Token {
            kind: TokenKind::Identifier,
            text: text.to_owned(),
            position: Position::START,
        }
    }

    fn string_lit(text: &str) -> Token {
        Token {
            kind: TokenKind::QuotedString,
            text: text.to_owned(),
            position: Position::START,
        }
    }

    fn bang() -> Token {
        Token {
            kind: TokenKind::Other,
            text: "!".to_owned(),
            position: Position::START,
        }
    }

    #[test]
    fn single_literal_becomes_mnemonic_camel_case() {
        let name = synthesize_base_name(&[string_lit("\"k\"")]);
        assert_eq!(name, "K");
    }

    #[test]
    fn dot_dot_dot_becomes_ellip() {
        let name = synthesize_base_name(&[string_lit("\"...\"")]);
        assert_eq!(name, "Ellip");
    }

    #[test]
    fn two_dots_contribute_nothing() {
        let name = synthesize_base_name(&[string_lit("\"..\"")]);
        assert_eq!(name, "Epsilon");
    }

    #[test]
    fn bang_contributes_not_unless_doubled() {
        assert_eq!(synthesize_base_name(&[bang()]), "Not");
        assert_eq!(synthesize_base_name(&[bang(), bang()]), "Exp");
    }

    #[test]
    fn direct_left_recursion_variant_name() {
        let name = synthesize_base_name(&[ident("E"), string_lit("\"+\""), ident("E")]);
        assert_eq!(name, "EPlsE");
    }

    #[test]
    fn collisions_get_dollar_suffix() {
        let mut namer = VariantNamer::new();
        let a = namer.name_for(&[ident("X")], None, "P").unwrap();
        let b = namer.name_for(&[ident("X")], None, "P").unwrap();
        assert_eq!(a, "X");
        assert_eq!(b, "X$1");
    }

    #[test]
    fn colliding_explicit_name_is_an_error() {
        let mut namer = VariantNamer::new();
        namer.name_for(&[], Some("Foo"), "P").unwrap();
        let err = namer.name_for(&[], Some("Foo"), "P");
        assert!(err.is_err());
    }
}
