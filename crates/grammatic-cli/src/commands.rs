//! Builds the single top-level `grammatic` command from the shared arg
//! builders in `args.rs`.

use clap::Command;

use super::args::*;

pub fn build_cli() -> Command {
    Command::new("grammatic")
        .about("Static analysis compiler for the chaptered grammar DSL")
        .arg(grammar_path_arg())
        .arg(grammar_name_arg())
        .arg(grammar_customizations_arg())
        .arg(srcdir_arg())
        .arg(outdir_arg())
        .arg(dotout_arg())
        .arg(verbose_arg())
        .arg(color_arg())
}
