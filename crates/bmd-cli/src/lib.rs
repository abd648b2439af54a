//! Build report CLI library.
//!
//! This crate provides the command-line interface around the aggregation
//! engine: configuration, logger parameter parsing, event stream replay,
//! and file output.

mod cli;
pub mod commands;
mod config;
mod params;

pub use cli::{Cli, Commands, TargetNamesArg};
pub use config::Config;
pub use params::LoggerParams;
