//! Extracts the single `RunParams` struct from clap's `ArgMatches` and
//! converts it into `run::RunArgs`.

use std::path::PathBuf;

use clap::ArgMatches;

use crate::run::RunArgs;
use crate::ColorChoice;

pub struct RunParams {
    pub grammar_path: PathBuf,
    pub grammar_name: Option<String>,
    pub grammar_customizations: Option<PathBuf>,
    pub srcdir: Option<PathBuf>,
    pub outdir: PathBuf,
    pub dotout: Option<PathBuf>,
    pub verbose: bool,
    pub color: ColorChoice,
}

impl RunParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: m.get_one::<PathBuf>("grammar_path").cloned().expect("required"),
            grammar_name: m.get_one::<String>("grammar_name").cloned(),
            grammar_customizations: m.get_one::<PathBuf>("grammar_customizations").cloned(),
            srcdir: m.get_one::<PathBuf>("srcdir").cloned(),
            outdir: m.get_one::<PathBuf>("outdir").cloned().expect("required"),
            dotout: m.get_one::<PathBuf>("dotout").cloned(),
            verbose: m.get_flag("verbose"),
            color: parse_color(m),
        }
    }
}

impl From<RunParams> for RunArgs {
    fn from(p: RunParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            grammar_name: p.grammar_name,
            grammar_customizations: p.grammar_customizations,
            srcdir: p.srcdir,
            outdir: p.outdir,
            dotout: p.dotout,
            verbose: p.verbose,
            color: p.color.should_colorize(),
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(String::as_str) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
