//! CLI subcommand implementations.

pub mod check;
pub mod report;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use bmd_core::BuildEvent;

/// Reads a JSONL build event stream.
///
/// Blank lines are ignored. A line that does not decode as a build event is
/// fatal — the event source and this tool have desynchronized and any
/// report built from the rest of the stream would lie.
pub(crate) fn read_events(path: &Path) -> Result<Vec<BuildEvent>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: BuildEvent = serde_json::from_str(&line)
            .with_context(|| format!("malformed event at {}:{}", path.display(), index + 1))?;
        events.push(event);
    }
    Ok(events)
}
