//! Report command: replay an event stream into a Markdown document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use bmd_core::{SessionConfig, TargetNamesPolicy, Verbosity, assemble_report};

use crate::{Config, LoggerParams};
use crate::commands::read_events;

/// Runs the report command.
///
/// Output settings resolve in precedence order: logger parameter string,
/// then CLI flags, then configuration. On any fatal error nothing is
/// written — a partial document must never masquerade as a complete one.
pub fn run(
    config: &Config,
    input: &Path,
    logfile: Option<&Path>,
    verbosity: Option<&str>,
    params: Option<&str>,
    target_names: TargetNamesPolicy,
    to_stdout: bool,
) -> Result<()> {
    let params = params
        .map(LoggerParams::parse)
        .transpose()
        .context("failed to parse logger parameters")?
        .unwrap_or_default();

    let verbosity: Verbosity = match (params.verbosity, verbosity) {
        (Some(v), _) => v,
        (None, Some(s)) => s.parse().context("failed to parse --verbosity")?,
        (None, None) => config.verbosity,
    };
    let logfile: PathBuf = params
        .logfile
        .clone()
        .or_else(|| logfile.map(Path::to_path_buf))
        .unwrap_or_else(|| config.logfile.clone());

    let events = read_events(input)?;
    tracing::debug!(count = events.len(), %verbosity, "replaying event stream");

    let session_config = SessionConfig {
        verbosity,
        target_names,
    };
    let document =
        assemble_report(session_config, events).context("event stream violates the logging protocol")?;
    let rendered = bmd_render::render_document(&document);

    if to_stdout {
        print!("{rendered}");
        return Ok(());
    }

    if let Some(parent) = logfile.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&logfile, &rendered)
        .with_context(|| format!("failed to write {}", logfile.display()))?;
    tracing::info!(path = %logfile.display(), "report written");

    Ok(())
}
