//! Token kinds and the raw `logos` disjunction used to scan them.

use logos::Logos;

use grammatic_core::{Position, Span};

/// The significance class of a token, per the data model's `Token` kind list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    LineBreak,
    Comment,
    QuotedString,
    Identifier,
    /// `@name` or `(@name=value)`. The parsed annotation name/value live on
    /// `Token`, not here, since `logos` only hands back the matched slice.
    Annotation,
    Other,
}

/// Raw lexical alternatives, declared in the priority order §4.1 specifies.
/// `logos` already resolves ties by longest match; the explicit priorities
/// below pin the tie-break for alternatives of equal length (e.g. a
/// single `/` is both the start of a comment attempt and an "other" char).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Raw {
    #[regex(r"//[^\r\n]*", priority = 10, allow_greedy = true)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", priority = 10)]
    BlockComment,

    #[regex(r"[ \t]+", priority = 9)]
    Whitespace,

    #[regex(r"(\r\n|\r|\n)+", priority = 9)]
    LineBreak,

    #[regex(r#""([^"\\]|\\.)*""#, priority = 9)]
    QuotedString,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", priority = 8)]
    Word,

    #[regex(r#"\(@[A-Za-z_][A-Za-z0-9_]*=[^"()]*\)"#, priority = 9)]
    AnnotationWithValue,

    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*", priority = 8)]
    BareAnnotation,

    #[regex(r".", priority = 1)]
    Other,
}

/// A scanned token: its exact source text and the position its first
/// character occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn span(&self) -> Span {
        let end = self.position.advance(&self.text);
        Span::new(self.position, end)
    }

    pub fn is_significant(&self) -> bool {
        !matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineBreak | TokenKind::Comment
        )
    }

    /// For an `Annotation` token, the name after `@` and, for the
    /// parenthesized form, the raw value text between `=` and `)`.
    pub fn annotation_parts(&self) -> Option<(&str, Option<&str>)> {
        if self.kind != TokenKind::Annotation {
            return None;
        }
        if let Some(body) = self.text.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            let body = body.strip_prefix('@')?;
            let (name, value) = body.split_once('=')?;
            Some((name, Some(value)))
        } else {
            Some((self.text.strip_prefix('@')?, None))
        }
    }
}

impl From<Raw> for TokenKind {
    fn from(raw: Raw) -> Self {
        match raw {
            Raw::LineComment | Raw::BlockComment => TokenKind::Comment,
            Raw::Whitespace => TokenKind::Whitespace,
            Raw::LineBreak => TokenKind::LineBreak,
            Raw::QuotedString => TokenKind::QuotedString,
            Raw::Word => TokenKind::Identifier,
            Raw::AnnotationWithValue | Raw::BareAnnotation => TokenKind::Annotation,
            Raw::Other => TokenKind::Other,
        }
    }
}
