//! Strata CLI: flattens a design and reports its combinational dependencies.
//!
//! `strata analyze` runs the whole engine and writes a JSON dependency
//! report; `strata check` only builds the hierarchical model and reports
//! structural errors.

#![warn(missing_docs)]

mod analyze;
mod check;
mod output;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Strata, a design flattening and dependency analysis engine.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Design flattening and dependency analysis")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every pass and write the dependency report.
    Analyze(AnalyzeArgs),
    /// Build the model and report structural errors only.
    Check(CheckArgs),
}

/// Arguments for `strata analyze`.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// JSON design file.
    pub design: PathBuf,

    /// TOML design hints.
    #[arg(long)]
    pub hints: Option<PathBuf>,

    /// Where to write the JSON report (stdout if omitted).
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Run the self-consistency checks.
    #[arg(long)]
    pub verify: bool,

    /// Analyze independent modules in parallel.
    #[arg(long)]
    pub parallel: bool,
}

/// Arguments for `strata check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// JSON design file.
    pub design: PathBuf,

    /// TOML design hints.
    #[arg(long)]
    pub hints: Option<PathBuf>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var("TERM").is_ok(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
    };
    output::init_logging(&global);

    let result = match cli.command {
        Command::Analyze(ref args) => analyze::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
