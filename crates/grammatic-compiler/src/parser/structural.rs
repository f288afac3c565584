//! Groups a significant token stream into chapters, productions, and
//! variants, and parses each variant's right-hand side into a [`Pt`] forest
//! via bracket-balanced recursive descent (§4.2).

use grammatic_core::Span;

use super::super::lexer::{Token, TokenKind};
use super::super::model::{Chapter, Grammar, Production, Variant};
use super::annotation::{well_known, Annotation};
use super::namer::VariantNamer;
use super::ptree::Pt;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StructuralError {
    #[error("unbalanced bracket: '{open}' at {span} has no matching close")]
    UnbalancedBracket { open: char, span: Span },
    #[error("unexpected end of variant inside a bracket group")]
    UnexpectedEof,
    #[error("'!' at {span} has no operand")]
    NegationWithoutOperand { span: Span },
    #[error("token '{text}' at {span} cannot start a parse-tree node")]
    UnexpectedToken { text: String, span: Span },
    #[error("ambiguous explicit variant name '{name}' in production '{production}'")]
    AmbiguousVariantName { name: String, production: String },
}

fn matching_close(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => unreachable!("only called with a known opening bracket"),
    }
}

/// Parses one bracket-delimited or top-level sequence of PT nodes, stopping
/// at `stop` (the open bracket char, its matching close, and the open
/// bracket's span, for error reporting) or at end of input, whichever comes
/// first. `stop = None` means "top level of a variant" (stop only at an
/// annotation token or end of input).
///
/// A close bracket of the wrong kind (e.g. `( "a" ]`) is reported as
/// [`StructuralError::UnbalancedBracket`], naming the open bracket that
/// never found its match; running out of tokens entirely while still
/// inside a bracket group is reported as [`StructuralError::UnexpectedEof`]
/// instead, per the original stack-based matcher this mirrors.
fn parse_nodes(
    tokens: &[Token],
    mut i: usize,
    stop: Option<(char, char, Span)>,
) -> Result<(Vec<Pt>, usize), StructuralError> {
    let mut nodes = Vec::new();
    while i < tokens.len() {
        let tok = &tokens[i];
        if let Some((open, close, open_span)) = stop {
            if tok.kind == TokenKind::Other && tok.text.len() == 1 {
                let c = tok.text.chars().next().unwrap();
                if c == close {
                    return Ok((nodes, i + 1));
                }
                if matches!(c, ')' | ']' | '}') {
                    return Err(StructuralError::UnbalancedBracket { open, span: open_span });
                }
            }
        } else if tok.kind == TokenKind::Annotation {
            return Ok((nodes, i));
        }
        let (node, next) = parse_node(tokens, i)?;
        nodes.push(node);
        i = next;
    }
    match stop {
        Some(_) => Err(StructuralError::UnexpectedEof),
        None => Ok((nodes, i)),
    }
}

fn parse_node(tokens: &[Token], i: usize) -> Result<(Pt, usize), StructuralError> {
    let tok = &tokens[i];
    match tok.kind {
        TokenKind::QuotedString => {
            let text = unescape(tok.text.trim_matches('"'));
            Ok((
                Pt::Literal {
                    text,
                    span: tok.span(),
                },
                i + 1,
            ))
        }
        TokenKind::Identifier => Ok((
            Pt::Reference {
                name: tok.text.clone(),
                span: tok.span(),
            },
            i + 1,
        )),
        TokenKind::Other if tok.text == "!" => {
            if i + 1 >= tokens.len() || tokens[i + 1].kind == TokenKind::Annotation {
                return Err(StructuralError::NegationWithoutOperand { span: tok.span() });
            }
            let (child, next) = parse_node(tokens, i + 1)?;
            Ok((
                Pt::NegativeLookahead(Box::new(Pt::Sequence(vec![child]))),
                next,
            ))
        }
        TokenKind::Other if matches!(tok.text.as_str(), "(" | "[" | "{") => {
            let open = tok.text.chars().next().unwrap();
            let close = matching_close(open);
            let (children, next) = parse_nodes(tokens, i + 1, Some((open, close, tok.span())))?;
            let node = match open {
                '(' => Pt::Sequence(children),
                '{' => Pt::Repeated(Box::new(Pt::Sequence(children))),
                '[' => Pt::Optional(Box::new(Pt::Sequence(children))),
                _ => unreachable!(),
            };
            Ok((node, next))
        }
        _ => Err(StructuralError::UnexpectedToken {
            text: tok.text.clone(),
            span: tok.span(),
        }),
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn same_line(a: &Token, b: &Token) -> bool {
    a.position.line == b.position.line
}

fn starts_line(tok: &Token) -> bool {
    tok.position.column == 1
}

fn is_ident(tok: &Token, text: &str) -> bool {
    tok.kind == TokenKind::Identifier && tok.text == text
}

fn is_other(tok: &Token, text: &str) -> bool {
    tok.kind == TokenKind::Other && tok.text == text
}

/// Splits `tokens[start..end]` into a list of `(span_start, span_end)`
/// groups as determined by `splitter`, mirroring the reference grammar
/// compiler's `split_at`: a group ends just before any index where
/// `splitter` recognizes the start of the next group.
fn split_at<T>(
    tokens: &[Token],
    start: usize,
    end: usize,
    mut splitter: impl FnMut(&[Token], usize, usize) -> Option<T>,
) -> Vec<T> {
    let mut items = Vec::new();
    let mut group_start = start;
    for i in (start + 1)..end {
        if let Some(item) = splitter(tokens, group_start, i) {
            items.push(item);
            group_start = i;
        }
    }
    if let Some(item) = splitter(tokens, group_start, end) {
        items.push(item);
    }
    items
}

/// Recognizes a production header `Ident :` starting in column 1 at index
/// `i`, returning the name token's index.
fn production_header_at(tokens: &[Token], i: usize) -> Option<usize> {
    if i + 1 < tokens.len()
        && starts_line(&tokens[i])
        && tokens[i].kind == TokenKind::Identifier
        && is_other(&tokens[i + 1], ":")
    {
        Some(i)
    } else {
        None
    }
}

/// Recognizes a chapter marker `( chapter = Ident )` starting in column 1.
fn chapter_header_at(tokens: &[Token], i: usize) -> Option<usize> {
    if i + 4 < tokens.len()
        && starts_line(&tokens[i])
        && is_other(&tokens[i], "(")
        && is_ident(&tokens[i + 1], "chapter")
        && is_other(&tokens[i + 2], "=")
        && tokens[i + 3].kind == TokenKind::Identifier
        && is_other(&tokens[i + 4], ")")
    {
        Some(i)
    } else {
        None
    }
}

/// Parses the full significant-token stream into a [`Grammar`].
pub fn parse_grammar(tokens: &[Token]) -> Result<Grammar, StructuralError> {
    let n = tokens.len();
    let mut grammar = Grammar::default();

    let chapter_bounds = split_at(tokens, 0, n, |toks, s, e| {
        if e > s && (e == n || chapter_header_at(toks, e).is_some()) {
            Some((s, e))
        } else {
            None
        }
    });

    for (cs, ce) in chapter_bounds {
        let (chapter_name, body_start) = match chapter_header_at(tokens, cs) {
            Some(_) => (tokens[cs + 3].text.clone(), cs + 5),
            None => ("Unknown".to_owned(), cs),
        };

        let prod_bounds = split_at(tokens, body_start, ce, |toks, s, e| {
            if e > s && (e == ce || production_header_at(toks, e).is_some()) {
                Some((s, e))
            } else {
                None
            }
        });

        let mut production_names = Vec::new();
        for (ps, pe) in prod_bounds {
            if ps >= pe {
                continue;
            }
            let (prod_name, header_end) = match production_header_at(tokens, ps) {
                Some(_) => (tokens[ps].text.clone(), ps + 2),
                None => ("Unknown".to_owned(), ps),
            };

            // Header-line annotations: any annotation tokens between the
            // ':' and end of the header's own line.
            let mut annotations = Vec::new();
            let mut body_start = header_end;
            while body_start < pe
                && header_end < pe
                && same_line(&tokens[header_end], &tokens[body_start])
                && tokens[body_start].kind == TokenKind::Annotation
            {
                annotations.push(Annotation::from_token(&tokens[body_start]).unwrap());
                body_start += 1;
            }

            let variant_bounds = split_at(tokens, body_start, pe, |toks, s, e| {
                if e > s && (e == pe || !same_line(&toks[s], &toks[e])) {
                    Some((s, e))
                } else {
                    None
                }
            });

            let mut namer = VariantNamer::new();
            let mut variants = Vec::new();
            for (vs, ve) in variant_bounds {
                let variant = build_variant(tokens, vs, ve, &mut namer, &prod_name)?;
                variants.push(variant);
            }

            production_names.push(prod_name.clone());
            grammar.productions.insert(
                prod_name.clone(),
                Production {
                    name: prod_name,
                    chapter: chapter_name.clone(),
                    variants,
                    annotations,
                },
            );
        }

        grammar.chapters.push(Chapter {
            name: chapter_name,
            production_names,
        });
    }

    Ok(grammar)
}

fn build_variant(
    tokens: &[Token],
    start: usize,
    end: usize,
    namer: &mut VariantNamer,
    production: &str,
) -> Result<Variant, StructuralError> {
    let slice = &tokens[start..end];
    let (ptree, consumed) = parse_nodes(slice, 0, None)?;
    let mut annotations = Vec::new();
    let mut explicit_name: Option<String> = None;
    for tok in &slice[consumed..] {
        if let Some(annotation) = Annotation::from_token(tok) {
            if annotation.name == well_known::NAME {
                explicit_name = annotation.value.clone();
            }
            annotations.push(annotation);
        }
    }

    let name = namer.name_for(slice, explicit_name.as_deref(), production)?;
    Ok(Variant {
        name,
        ptree,
        annotations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{lex, significant};

    fn grammar_of(source: &str) -> Grammar {
        let tokens = lex(source).unwrap();
        let sig = significant(&tokens);
        parse_grammar(&sig).unwrap()
    }

    #[test]
    fn trivial_literal_scenario() {
        let g = grammar_of("(chapter=A)\nX:\n  \"k\"\n");
        assert_eq!(g.chapters.len(), 1);
        assert_eq!(g.chapters[0].name, "A");
        let x = g.production("X").unwrap();
        assert_eq!(x.variants.len(), 1);
        assert_eq!(x.variants[0].name, "K");
        match &x.variants[0].ptree[..] {
            [Pt::Literal { text, .. }] => assert_eq!(text, "k"),
            other => panic!("unexpected ptree: {other:?}"),
        }
    }

    #[test]
    fn productions_without_chapter_marker_default_to_unknown() {
        let g = grammar_of("X:\n  \"k\"\n");
        assert_eq!(g.chapters[0].name, "Unknown");
    }

    #[test]
    fn optional_then_literal() {
        let g = grammar_of("X:\n  [ \"a\" ] \"b\"\n");
        let x = g.production("X").unwrap();
        assert_eq!(x.variants.len(), 1);
        match &x.variants[0].ptree[..] {
            [Pt::Optional(_), Pt::Literal { text, .. }] => assert_eq!(text, "b"),
            other => panic!("unexpected ptree: {other:?}"),
        }
    }

    #[test]
    fn two_variants_on_separate_lines() {
        let g = grammar_of("E:\n  E \"+\" E\n  \"n\"\n");
        let e = g.production("E").unwrap();
        assert_eq!(e.variants.len(), 2);
    }

    #[test]
    fn intermediate_annotation_is_collected() {
        let g = grammar_of("P:\n  Q            (@intermediate)\nQ:\n  \"q\"\n");
        let p = g.production("P").unwrap();
        assert!(p.variants[0].has_annotation(well_known::INTERMEDIATE));
    }

    #[test]
    fn unbalanced_bracket_is_an_error() {
        let tokens = lex("X:\n  ( \"a\"\n").unwrap();
        let sig = significant(&tokens);
        assert!(parse_grammar(&sig).is_err());
    }

    #[test]
    fn mismatched_closing_bracket_reports_the_open_bracket() {
        let tokens = lex("X:\n  ( \"a\" ]\n").unwrap();
        let sig = significant(&tokens);
        let err = parse_grammar(&sig).unwrap_err();
        match err {
            StructuralError::UnbalancedBracket { open, .. } => assert_eq!(open, '('),
            other => panic!("expected UnbalancedBracket, got {other:?}"),
        }
    }

    #[test]
    fn bang_without_operand_is_an_error() {
        let tokens = lex("X:\n  !\n").unwrap();
        let sig = significant(&tokens);
        assert!(parse_grammar(&sig).is_err());
    }
}
