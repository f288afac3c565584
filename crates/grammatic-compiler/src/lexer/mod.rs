//! Tokenizes grammar text into an ordered sequence of positioned tokens.
//!
//! Matching is delegated to a `logos`-generated scanner (see `token::Raw`);
//! this module's job is to walk the raw token stream and accumulate
//! `(line, column, byte_offset)` alongside each one, since `logos` itself is
//! position-agnostic.

mod token;

pub use token::{Token, TokenKind};

use logos::Logos;

use grammatic_core::Position;
use token::Raw;

/// The lexer never fails in practice (the catch-all `Other` pattern matches
/// any single character), but a scan is still checked against the total
/// input length per §4.1's invariant; violating that is an internal bug,
/// not a user-facing parse error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("lexer consumed {consumed} bytes but input is {input_len} bytes long")]
pub struct LexerInvariantViolation {
    pub consumed: usize,
    pub input_len: usize,
}

/// Tokenizes `source` into the full token stream, including whitespace,
/// line breaks, and comments (callers that only want structure should call
/// [`significant`] on the result).
pub fn lex(source: &str) -> Result<Vec<Token>, LexerInvariantViolation> {
    let mut tokens = Vec::new();
    let mut pos = Position::START;
    let mut consumed = 0usize;

    let mut lexer = Raw::lexer(source);
    while let Some(result) = lexer.next() {
        let raw = result.unwrap_or(Raw::Other);
        let text = lexer.slice().to_owned();
        consumed += text.len();
        let kind = TokenKind::from(raw);
        let start = pos;
        pos = pos.advance(&text);
        tokens.push(Token {
            kind,
            text,
            position: start,
        });
    }

    if consumed != source.len() {
        return Err(LexerInvariantViolation {
            consumed,
            input_len: source.len(),
        });
    }

    Ok(tokens)
}

/// Filters out whitespace, comments, and line breaks, keeping only
/// structurally significant tokens. Positions are untouched, so "same line"
/// queries over the filtered stream remain accurate.
pub fn significant(tokens: &[Token]) -> Vec<Token> {
    tokens.iter().filter(|t| t.is_significant()).cloned().collect()
}
