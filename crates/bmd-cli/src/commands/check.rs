//! Check command: validate an event stream without writing a report.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use bmd_core::{BuildEvent, SessionConfig, assemble_report};

use crate::commands::read_events;

/// Runs the check command.
///
/// Replays the stream through a session at default settings so every
/// nesting, state machine, and importance rule is exercised, then prints
/// what the stream contained.
pub fn run<W: Write>(writer: &mut W, input: &Path) -> Result<()> {
    let events = read_events(input)?;

    let projects = count(&events, |e| matches!(e, BuildEvent::ProjectStarted(_)));
    let targets = count(&events, |e| matches!(e, BuildEvent::TargetStarted(_)));
    let tasks = count(&events, |e| matches!(e, BuildEvent::TaskStarted(_)));
    let errors = count(&events, |e| matches!(e, BuildEvent::ErrorRaised(_)));
    let warnings = count(&events, |e| matches!(e, BuildEvent::WarningRaised(_)));
    let total = events.len();

    let document = assemble_report(SessionConfig::default(), events)
        .context("event stream violates the logging protocol")?;

    writeln!(writer, "stream OK: {total} events")?;
    writeln!(writer, "- projects: {projects}")?;
    writeln!(writer, "- targets: {targets}")?;
    writeln!(writer, "- tasks: {tasks}")?;
    writeln!(writer, "- errors: {errors}")?;
    writeln!(writer, "- warnings: {warnings}")?;
    writeln!(
        writer,
        "report would contain {} elements",
        document.elements().count()
    )?;

    Ok(())
}

fn count(events: &[BuildEvent], predicate: impl Fn(&&BuildEvent) -> bool) -> usize {
    events.iter().filter(predicate).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use std::io::Write as _;

    fn write_stream(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn check_prints_stream_summary() {
        let file = write_stream(&[
            r#"{"type":"build_started","timestamp":"2025-06-01T12:00:00Z","message":"Build started."}"#,
            r#"{"type":"project_started","project_file":"src/A.proj","target_names":"Build","timestamp":"2025-06-01T12:00:00Z","message":"Project started."}"#,
            r#"{"type":"target_started","target_name":"Build","timestamp":"2025-06-01T12:00:00Z","message":"Target started."}"#,
            r#"{"type":"target_finished","target_name":"Build","timestamp":"2025-06-01T12:00:02Z","message":"Target finished.","succeeded":true}"#,
            r#"{"type":"project_finished","project_file":"src/A.proj","timestamp":"2025-06-01T12:00:03Z","message":"Project finished.","succeeded":true}"#,
            r#"{"type":"build_finished","timestamp":"2025-06-01T12:00:03Z","message":"Build succeeded.","succeeded":true}"#,
        ]);

        let mut output = Vec::new();
        run(&mut output, file.path()).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        stream OK: 6 events
        - projects: 1
        - targets: 1
        - tasks: 0
        - errors: 0
        - warnings: 0
        report would contain 17 elements
        ");
    }

    #[test]
    fn check_rejects_unbalanced_stream() {
        let file = write_stream(&[
            r#"{"type":"build_started","timestamp":"2025-06-01T12:00:00Z","message":"Build started."}"#,
            r#"{"type":"target_finished","target_name":"Build","timestamp":"2025-06-01T12:00:02Z","message":"Target finished.","succeeded":true}"#,
        ]);

        let mut output = Vec::new();
        let error = run(&mut output, file.path()).unwrap_err();
        assert!(
            format!("{error:#}").contains("no matching start"),
            "error: {error:#}"
        );
    }
}
