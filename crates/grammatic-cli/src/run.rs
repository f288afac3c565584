use std::path::PathBuf;

use grammatic_compiler::customizations::Customizations;
use grammatic_compiler::diagnostics::Diagnostics;
use grammatic_compiler::emit::FsArtifactSink;
use grammatic_compiler::{analyze, dot, emit, lexer, parser};

pub struct RunArgs {
    pub grammar_path: PathBuf,
    pub grammar_name: Option<String>,
    pub grammar_customizations: Option<PathBuf>,
    pub srcdir: Option<PathBuf>,
    pub outdir: PathBuf,
    pub dotout: Option<PathBuf>,
    pub verbose: bool,
    pub color: bool,
}

pub fn run(args: RunArgs) {
    let source = match std::fs::read_to_string(&args.grammar_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: failed to read {}: {}", args.grammar_path.display(), e);
            std::process::exit(1);
        }
    };

    let tokens = match lexer::lex(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let significant = lexer::significant(&tokens);

    if args.verbose {
        eprintln!("-- tokens: {} total, {} significant", tokens.len(), significant.len());
        if let Some(name) = &args.grammar_name {
            eprintln!("-- grammar_name: {name}");
        }
    }

    let mut grammar = match parser::parse_grammar(&significant) {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if args.verbose {
        eprintln!("-- productions before pruning: {}", grammar.productions.len());
    }

    let mut diagnostics = Diagnostics::new();
    let analysis = match analyze::analyze(&mut grammar, &mut diagnostics) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if args.verbose {
        print_verbose_dump(&grammar, &analysis);
    }

    eprint!(
        "{}",
        diagnostics
            .printer(&source)
            .path(&args.grammar_path.display().to_string())
            .colored(args.color)
            .render()
    );

    let customizations = match Customizations::load(args.grammar_customizations.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let mut sink = match &args.srcdir {
        Some(srcdir) => FsArtifactSink::with_srcdir(&args.outdir, srcdir),
        None => FsArtifactSink::new(&args.outdir),
    };

    let emitted = match emit::emit_all(&grammar, &analysis, &customizations, &mut sink) {
        Ok(emitted) => emitted,
        Err(e) => {
            eprintln!("error: failed to write artifacts: {e}");
            std::process::exit(1);
        }
    };

    if args.verbose {
        eprintln!("-- emitted {} artifact(s)", emitted.len());
    }

    if let Some(dotout) = &args.dotout {
        let rendered = dot::render_dot(&grammar, &analysis.left_calls);
        if let Err(e) = std::fs::write(dotout, rendered) {
            eprintln!("error: failed to write {}: {}", dotout.display(), e);
            std::process::exit(1);
        }
    }

    if diagnostics.has_errors() {
        std::process::exit(1);
    }
}

fn print_verbose_dump(grammar: &grammatic_compiler::model::Grammar, analysis: &analyze::Analysis) {
    eprintln!("-- productions after pruning: {}", grammar.productions.len());
    eprintln!("-- nullable: {:?}", analysis.nullable);
    for production in grammar.productions.values() {
        for variant in &production.variants {
            if analysis.left_calls.is_lr(&production.name, &variant.name) {
                eprintln!("-- LR variant: {}::{}", production.name, variant.name);
            }
        }
    }
    for chapter in &grammar.chapters {
        let public: Vec<&str> = chapter
            .production_names
            .iter()
            .filter(|name| grammar.production(name.as_str()).is_some_and(|p| p.is_toplevel()))
            .map(|name| name.as_str())
            .collect();
        if !public.is_empty() {
            eprintln!("-- chapter '{}' public API: {:?}", chapter.name, public);
        }
    }
}
