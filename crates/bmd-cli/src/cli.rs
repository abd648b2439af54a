//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use bmd_core::TargetNamesPolicy;

/// Markdown build report generator.
///
/// Replays a build engine's lifecycle event stream and writes a single
/// Markdown document summarizing what ran, how long it took, and whether
/// it succeeded.
#[derive(Debug, Parser)]
#[command(name = "bmd", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a Markdown report from a build event stream.
    Report {
        /// JSONL file of build engine events.
        #[arg(long)]
        input: PathBuf,

        /// Where to write the report.
        #[arg(long)]
        logfile: Option<PathBuf>,

        /// Verbosity level name or abbreviation (quiet, minimal, normal,
        /// detailed, diagnostic).
        #[arg(long)]
        verbosity: Option<String>,

        /// Semicolon-delimited key=value logger parameters
        /// (e.g. "LOGFILE=build.md;V=detailed").
        #[arg(long)]
        params: Option<String>,

        /// Which invocation's requested targets a re-entrant project keeps
        /// in the table of contents.
        #[arg(long, value_enum, default_value_t = TargetNamesArg::First)]
        target_names: TargetNamesArg,

        /// Print the report to stdout instead of writing the logfile.
        #[arg(long)]
        stdout: bool,
    },

    /// Validate an event stream without writing a report.
    Check {
        /// JSONL file of build engine events.
        #[arg(long)]
        input: PathBuf,
    },
}

/// CLI surface for the re-entrant project target-names policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetNamesArg {
    /// Keep the first completed invocation's requested targets.
    First,
    /// Keep the most recently completed invocation's requested targets.
    Last,
}

impl From<TargetNamesArg> for TargetNamesPolicy {
    fn from(arg: TargetNamesArg) -> Self {
        match arg {
            TargetNamesArg::First => Self::FirstRequested,
            TargetNamesArg::Last => Self::LastRequested,
        }
    }
}
