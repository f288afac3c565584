//! Static analysis compiler for the chaptered grammar DSL: lexer, structural
//! parser, grammar model, analysis passes, and artifact emission.
//!
//! Parsing and executing the *target* grammar described by a `.grammar`
//! file is out of scope; this crate only analyzes the grammar's own
//! structure and reports on it.

pub mod analyze;
pub mod customizations;
pub mod diagnostics;
pub mod dot;
pub mod emit;
pub mod lexer;
pub mod model;
pub mod parser;

use std::path::Path;

use analyze::Analysis;
use customizations::{Customizations, CustomizationsError};
use diagnostics::Diagnostics;
use emit::ArtifactSink;
use model::Grammar;

/// Top-level failure of a compilation run. Each fallible stage keeps its own
/// `thiserror`-derived error type; this enum just wraps whichever one fired,
/// per the "Error type structure" convention: a pass's non-fatal findings
/// travel in [`Diagnostics`], its fatal failure travels here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lexer(#[from] lexer::LexerInvariantViolation),
    #[error(transparent)]
    Structural(#[from] parser::StructuralError),
    #[error(transparent)]
    Intermediate(#[from] analyze::NoDelegateError),
    #[error(transparent)]
    Customizations(#[from] CustomizationsError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The result of a fallible pass: its value alongside whatever non-fatal
/// diagnostics it accumulated along the way, or a fatal [`Error`].
pub type PassResult<T> = Result<(T, Diagnostics), Error>;

/// A fully compiled grammar: the pruned, delegate-resolved model plus every
/// analysis result table it was compiled against.
#[derive(Debug)]
pub struct Compiled {
    pub grammar: Grammar,
    pub analysis: Analysis,
}

/// Runs the full pipeline: lex, structurally parse, then analyze (prune
/// unreachable productions, resolve `@intermediate` delegates, compute
/// nullability / left-recursion / lookahead).
pub fn compile(source: &str) -> PassResult<Compiled> {
    let mut diagnostics = Diagnostics::new();

    let tokens = lexer::lex(source)?;
    let significant = lexer::significant(&tokens);
    let mut grammar = parser::parse_grammar(&significant)?;

    let analysis = analyze::analyze(&mut grammar, &mut diagnostics)?;

    Ok((Compiled { grammar, analysis }, diagnostics))
}

/// Compiles `source` and writes one artifact per surviving production to
/// `sink`, skipping names for which `sink.exists` already reports a
/// hand-written file. Returns the diagnostics from compilation alongside the
/// list of artifact names actually written.
pub fn compile_and_emit(
    source: &str,
    customizations_path: Option<&Path>,
    sink: &mut dyn ArtifactSink,
) -> PassResult<Vec<String>> {
    let (compiled, diagnostics) = compile(source)?;
    let customizations = Customizations::load(customizations_path)?;
    let emitted = emit::emit_all(&compiled.grammar, &compiled.analysis, &customizations, sink)?;
    Ok((emitted, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use emit::InMemoryArtifactSink;

    #[test]
    fn compiles_a_small_grammar_end_to_end() {
        let (compiled, diagnostics) = compile("E: (@toplevel)\n  E \"+\" E\n  \"n\"\nOrphan:\n  \"o\"\n").unwrap();
        assert!(compiled.grammar.production("Orphan").is_none());
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn malformed_source_reports_a_fatal_error() {
        let err = compile("X: (@toplevel)\n  (\"a\"\n").unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn compile_and_emit_writes_an_artifact_per_production() {
        let mut sink = InMemoryArtifactSink::new();
        let (emitted, _diagnostics) =
            compile_and_emit("E: (@toplevel)\n  \"n\"\n", None, &mut sink).unwrap();
        assert_eq!(emitted, vec!["E.artifact".to_owned()]);
    }
}
