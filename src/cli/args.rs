//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Inline marked svg/png images into built HTML files
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// HTML files to process
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Config file path (default: inline.toml, if present)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory asset `src` values resolve against (overrides config `root`)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Write results into this directory instead of overwriting the inputs
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Show every skipped asset and the reason
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
