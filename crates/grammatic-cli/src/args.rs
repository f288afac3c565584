//! Argument builders for the `grammatic` command.
//!
//! Each function returns a `clap::Arg`; `commands::build_cli` composes them
//! into the single top-level command (§6: this CLI has no subcommands, just
//! one grammar-file positional plus a handful of flags).

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Grammar file to compile (positional).
pub fn grammar_path_arg() -> Arg {
    Arg::new("grammar_path")
        .value_name("GRAMMAR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Grammar file to compile")
}

/// Subpackage/prefix key used to namespace generated artifacts (--grammar_name).
pub fn grammar_name_arg() -> Arg {
    Arg::new("grammar_name")
        .long("grammar_name")
        .value_name("IDENT")
        .help("Subpackage/prefix key for generated artifacts")
}

/// Customizations file (--grammar_customizations).
pub fn grammar_customizations_arg() -> Arg {
    Arg::new("grammar_customizations")
        .long("grammar_customizations")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("JSON file of token/postcond/mixin/custom-node-content overrides")
}

/// Hand-written source root, checked before overwriting a generated artifact (--srcdir).
pub fn srcdir_arg() -> Arg {
    Arg::new("srcdir")
        .long("srcdir")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("Hand-written source root; existing files here are never overwritten")
}

/// Artifact-sink output root (--outdir).
pub fn outdir_arg() -> Arg {
    Arg::new("outdir")
        .long("outdir")
        .value_name("PATH")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Output directory for generated artifacts")
}

/// Optional DOT graph output path (--dotout).
pub fn dotout_arg() -> Arg {
    Arg::new("dotout")
        .long("dotout")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("Write a DOT graph of the nonterminal reference graph to this path")
}

/// Verbosity level (-v).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Dump tokens, structured grammar, and every analysis table")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostic output")
}
