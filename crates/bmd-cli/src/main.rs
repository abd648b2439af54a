use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bmd_cli::commands::{check, report};
use bmd_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Report {
            input,
            logfile,
            verbosity,
            params,
            target_names,
            stdout,
        }) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            tracing::debug!(?config, "loaded configuration");
            report::run(
                &config,
                input,
                logfile.as_deref(),
                verbosity.as_deref(),
                params.as_deref(),
                (*target_names).into(),
                *stdout,
            )?;
        }
        Some(Commands::Check { input }) => {
            let mut stdout = std::io::stdout();
            check::run(&mut stdout, input)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
