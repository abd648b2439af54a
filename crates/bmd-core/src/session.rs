//! Report session: the event-to-document state machine.
//!
//! A [`ReportSession`] is an explicit value with the lifetime of one build:
//! constructed before the first event, threaded through every event as a
//! function of (session, event) -> session, and consumed by the terminal
//! build-finished event, which is the only point where the document is
//! assembled. There is no ambient state; dropping the session before the
//! terminal event means no document was produced.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

use crate::accumulator::DurationAccumulator;
use crate::anchor::anchor_id;
use crate::element::{ReportElement, TocRow, Tone};
use crate::error::ProtocolError;
use crate::event::{
    BuildEvent, BuildFinished, BuildMessage, BuildStarted, Diagnostic, EntityKind,
    MessageImportance, ProjectFinished, ProjectStarted, TargetFinished, TargetStarted,
    TaskFinished, TaskStarted,
};
use crate::sequencer::NestingSequencer;
use crate::verbosity::Verbosity;

/// Which invocation's requested targets a re-entrant project keeps in its
/// table-of-contents row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetNamesPolicy {
    /// Keep the targets requested by the first completed invocation.
    #[default]
    FirstRequested,
    /// Keep the targets requested by the most recently completed invocation.
    LastRequested,
}

/// Per-session configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub verbosity: Verbosity,
    pub target_names: TargetNamesPolicy,
}

/// Lifecycle of a report session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Finished,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The assembled report: a table of contents prepended to the body.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub toc: Vec<ReportElement>,
    pub body: Vec<ReportElement>,
}

impl ReportDocument {
    /// All elements in output order, table of contents first.
    pub fn elements(&self) -> impl Iterator<Item = &ReportElement> {
        self.toc.iter().chain(self.body.iter())
    }
}

/// Result of applying one event.
#[derive(Debug)]
pub enum Applied {
    Running(ReportSession),
    Finished(ReportDocument),
}

/// Summary of one project accumulated for the table of contents.
///
/// Keyed by project path in [`ReportSession::projects`]; a re-entrant
/// project merges into its existing entry so the table of contents holds
/// exactly one row per distinct project, ordered by earliest start.
#[derive(Debug, Clone)]
struct ProjectSummary {
    anchor: String,
    succeeded: bool,
    cumulative: TimeDelta,
    started_at: DateTime<Utc>,
    target_names: Option<String>,
    first_seen: usize,
}

/// Aggregates one build session's events into a [`ReportDocument`].
#[derive(Debug)]
pub struct ReportSession {
    config: SessionConfig,
    state: SessionState,
    sequencer: NestingSequencer,
    durations: DurationAccumulator,
    body: Vec<ReportElement>,
    projects: HashMap<String, ProjectSummary>,
}

fn fmt_ts(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn success_tone(succeeded: bool) -> Tone {
    if succeeded { Tone::Success } else { Tone::Failure }
}

fn diagnostic_text(diag: &Diagnostic) -> String {
    let mut text = match &diag.code {
        Some(code) => format!("{code}: {}", diag.message),
        None => diag.message.clone(),
    };
    if let Some(location) = diag.location() {
        text.push_str(&format!(" ({location})"));
    }
    text
}

/// The targets a project invocation was asked to run, `None` when the
/// engine fell back to the project's defaults.
fn requested_targets(started: &ProjectStarted) -> Option<String> {
    let names = started.target_names.trim();
    if names.is_empty() {
        None
    } else {
        Some(names.to_string())
    }
}

impl ReportSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::NotStarted,
            sequencer: NestingSequencer::new(),
            durations: DurationAccumulator::new(),
            body: Vec::new(),
            projects: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Applies one event, consuming the session.
    ///
    /// Returns the advanced session, or the finished document when `event`
    /// is the terminal build-finished notification. Any event outside its
    /// legal state is a protocol violation.
    pub fn apply(mut self, event: &BuildEvent) -> Result<Applied, ProtocolError> {
        match (self.state, event) {
            (SessionState::NotStarted, BuildEvent::BuildStarted(e)) => {
                self.on_build_started(e);
                self.state = SessionState::Running;
                Ok(Applied::Running(self))
            }
            (SessionState::Running, BuildEvent::BuildFinished(e)) => {
                Ok(Applied::Finished(self.finish(e)?))
            }
            (SessionState::Running, BuildEvent::BuildStarted(_)) => {
                Err(ProtocolError::UnexpectedEvent {
                    state: self.state,
                    event: event.kind_name(),
                })
            }
            (SessionState::Running, event) => {
                self.on_event(event)?;
                Ok(Applied::Running(self))
            }
            (state, event) => Err(ProtocolError::UnexpectedEvent {
                state,
                event: event.kind_name(),
            }),
        }
    }

    fn at_least(&self, level: Verbosity) -> bool {
        self.config.verbosity.is_at_least(level)
    }

    fn on_event(&mut self, event: &BuildEvent) -> Result<(), ProtocolError> {
        match event {
            BuildEvent::ProjectStarted(e) => self.on_project_started(e),
            BuildEvent::ProjectFinished(e) => self.on_project_finished(e)?,
            BuildEvent::TargetStarted(e) => self.on_target_started(e),
            BuildEvent::TargetFinished(e) => self.on_target_finished(e)?,
            BuildEvent::TaskStarted(e) => self.on_task_started(e),
            BuildEvent::TaskFinished(e) => self.on_task_finished(e)?,
            BuildEvent::ErrorRaised(e) => self.on_error(e),
            BuildEvent::WarningRaised(e) => self.on_warning(e),
            BuildEvent::MessageRaised(e) => self.on_message(e),
            BuildEvent::BuildStarted(_) | BuildEvent::BuildFinished(_) => {
                unreachable!("routed by apply")
            }
        }
        Ok(())
    }

    fn on_build_started(&mut self, e: &BuildStarted) {
        self.body.push(ReportElement::Heading {
            level: 1,
            text: format!("Build started {}", fmt_ts(e.timestamp)),
        });
        if self.at_least(Verbosity::Detailed) {
            self.body.push(ReportElement::Heading {
                level: 3,
                text: "Build environment".to_string(),
            });
            self.body.push(ReportElement::name_value_table(&e.environment));
            self.body.push(ReportElement::Heading {
                level: 3,
                text: "Build properties".to_string(),
            });
            self.body.push(ReportElement::name_value_table(&e.properties));
        }
    }

    fn on_project_started(&mut self, e: &ProjectStarted) {
        self.body.push(ReportElement::Anchor {
            id: anchor_id(&e.project_file, e.timestamp),
        });
        self.body.push(ReportElement::Heading {
            level: 2,
            text: format!("Project started: {}", e.project_file),
        });
        self.body.push(ReportElement::Paragraph {
            text: e.message.clone(),
        });
        self.body.push(ReportElement::Status {
            text: format!(
                "{} | targets=({}) | {}",
                fmt_ts(e.timestamp),
                e.target_names,
                e.project_file
            ),
            tone: Tone::Neutral,
        });
        if self.at_least(Verbosity::Detailed) {
            self.body.push(ReportElement::Heading {
                level: 3,
                text: "Global properties".to_string(),
            });
            self.body
                .push(ReportElement::name_value_table(&e.global_properties));
            self.body.push(ReportElement::Heading {
                level: 4,
                text: "Initial properties".to_string(),
            });
            self.body
                .push(ReportElement::name_value_table(&e.initial_properties));
        }
        self.sequencer.project_started(e.clone());
    }

    fn on_project_finished(&mut self, e: &ProjectFinished) -> Result<(), ProtocolError> {
        let started = self.sequencer.project_finished()?;
        let cumulative = self
            .durations
            .record_completion(
                EntityKind::Project,
                &e.project_file,
                started.timestamp,
                e.timestamp,
                e.succeeded,
            )
            .cumulative;

        let first_seen = self.projects.len();
        match self.projects.entry(e.project_file.clone()) {
            Entry::Occupied(mut occupied) => {
                let summary = occupied.get_mut();
                summary.cumulative = cumulative;
                summary.succeeded &= e.succeeded;
                // A nested re-entrant start can pair its finish before the
                // outer one; keep the earliest start and its anchor.
                if started.timestamp < summary.started_at {
                    summary.started_at = started.timestamp;
                    summary.anchor = anchor_id(&e.project_file, started.timestamp);
                }
                if self.config.target_names == TargetNamesPolicy::LastRequested {
                    summary.target_names = requested_targets(&started);
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(ProjectSummary {
                    anchor: anchor_id(&e.project_file, started.timestamp),
                    succeeded: e.succeeded,
                    cumulative,
                    started_at: started.timestamp,
                    target_names: requested_targets(&started),
                    first_seen,
                });
            }
        }

        self.body.push(ReportElement::Status {
            text: format!("Project finished: {}", e.message),
            tone: success_tone(e.succeeded),
        });
        Ok(())
    }

    fn on_target_started(&mut self, e: &TargetStarted) {
        self.body.push(ReportElement::Heading {
            level: 4,
            text: e.target_name.clone(),
        });
        self.sequencer.target_started(e.clone());
    }

    fn on_target_finished(&mut self, e: &TargetFinished) -> Result<(), ProtocolError> {
        let started = self.sequencer.target_finished()?;
        self.durations.record_completion(
            EntityKind::Target,
            &e.target_name,
            started.timestamp,
            e.timestamp,
            e.succeeded,
        );
        self.body.push(ReportElement::Status {
            text: format!("Target finished: {}", e.target_name),
            tone: success_tone(e.succeeded),
        });
        self.body.push(ReportElement::Paragraph {
            text: e.message.clone(),
        });
        Ok(())
    }

    fn on_task_started(&mut self, e: &TaskStarted) {
        self.sequencer.task_started(e.clone());
        if self.at_least(Verbosity::Detailed) {
            self.body.push(ReportElement::Status {
                text: format!("Task started: {}", e.message),
                tone: Tone::Neutral,
            });
        }
    }

    fn on_task_finished(&mut self, e: &TaskFinished) -> Result<(), ProtocolError> {
        let started = self.sequencer.task_finished()?;
        self.durations.record_completion(
            EntityKind::Task,
            &e.task_name,
            started.timestamp,
            e.timestamp,
            e.succeeded,
        );
        // Failures surface at every verbosity.
        if !e.succeeded {
            self.body.push(ReportElement::Status {
                text: format!("Task failed: {}", e.message),
                tone: Tone::Failure,
            });
        } else if self.at_least(Verbosity::Detailed) {
            self.body.push(ReportElement::Status {
                text: format!("Task finished: {}", e.message),
                tone: Tone::Neutral,
            });
        }
        Ok(())
    }

    fn on_error(&mut self, e: &Diagnostic) {
        self.body.push(ReportElement::Status {
            text: format!("Error: {}", diagnostic_text(e)),
            tone: Tone::Error,
        });
    }

    fn on_warning(&mut self, e: &Diagnostic) {
        self.body.push(ReportElement::Status {
            text: format!("Warning: {}", diagnostic_text(e)),
            tone: Tone::Warning,
        });
    }

    fn on_message(&mut self, e: &BuildMessage) {
        if e.importance != MessageImportance::Low || self.at_least(Verbosity::Detailed) {
            self.body.push(ReportElement::Message {
                text: e.message.clone(),
                timestamp: e.timestamp,
                emphasized: e.importance == MessageImportance::High,
            });
        }
    }

    /// Finalizes the session into the ordered document.
    ///
    /// Runs once, on the terminal event only; an aborted session never
    /// produces a partial document.
    fn finish(mut self, e: &BuildFinished) -> Result<ReportDocument, ProtocolError> {
        for kind in [EntityKind::Project, EntityKind::Target, EntityKind::Task] {
            let count = self.sequencer.pending(kind);
            if count > 0 {
                return Err(ProtocolError::UnfinishedStarts { kind, count });
            }
        }
        self.state = SessionState::Finished;

        self.body.push(ReportElement::Heading {
            level: 1,
            text: format!("Build finished {}", fmt_ts(e.timestamp)),
        });
        self.body.push(ReportElement::Status {
            text: e.message.clone(),
            tone: success_tone(e.succeeded),
        });

        self.body.push(ReportElement::Heading {
            level: 2,
            text: "Target summary".to_string(),
        });
        self.body.push(Self::summary_chart(
            self.durations.store(EntityKind::Target),
        ));
        self.body.push(ReportElement::Heading {
            level: 2,
            text: "Task summary".to_string(),
        });
        self.body
            .push(Self::summary_chart(self.durations.store(EntityKind::Task)));

        let mut summaries: Vec<(String, ProjectSummary)> = self.projects.drain().collect();
        summaries.sort_by_key(|(_, summary)| (summary.started_at, summary.first_seen));
        let rows: Vec<TocRow> = summaries
            .into_iter()
            .map(|(name, summary)| TocRow {
                name,
                anchor: summary.anchor,
                succeeded: summary.succeeded,
                cumulative: summary.cumulative,
                started_at: summary.started_at,
                target_names: summary.target_names,
            })
            .collect();
        let toc = if rows.is_empty() {
            Vec::new()
        } else {
            vec![
                ReportElement::Heading {
                    level: 1,
                    text: "Projects".to_string(),
                },
                ReportElement::ProjectIndex { rows },
            ]
        };

        Ok(ReportDocument {
            toc,
            body: self.body,
        })
    }

    fn summary_chart(store: &crate::accumulator::DurationStore) -> ReportElement {
        ReportElement::BarChart {
            entries: store
                .ranked()
                .into_iter()
                .map(|record| (record.name.clone(), record.cumulative))
                .collect(),
        }
    }
}

/// Drives a whole event stream through one session.
///
/// The stream must begin with build-started and end with build-finished;
/// a stream that runs dry while the session is still running yields
/// [`ProtocolError::TruncatedStream`] and no document.
pub fn assemble_report(
    config: SessionConfig,
    events: impl IntoIterator<Item = BuildEvent>,
) -> Result<ReportDocument, ProtocolError> {
    let mut events = events.into_iter();
    let mut session = ReportSession::new(config);
    loop {
        let Some(event) = events.next() else {
            return Err(ProtocolError::TruncatedStream);
        };
        match session.apply(&event)? {
            Applied::Running(next) => session = next,
            Applied::Finished(document) => {
                if let Some(extra) = events.next() {
                    return Err(ProtocolError::UnexpectedEvent {
                        state: SessionState::Finished,
                        event: extra.kind_name(),
                    });
                }
                return Ok(document);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid test timestamp")
            + TimeDelta::seconds(seconds)
    }

    fn build_started(at: i64) -> BuildEvent {
        BuildEvent::BuildStarted(BuildStarted {
            timestamp: ts(at),
            message: "Build started.".to_string(),
            environment: Vec::new(),
            properties: Vec::new(),
        })
    }

    fn build_finished(at: i64, succeeded: bool) -> BuildEvent {
        BuildEvent::BuildFinished(BuildFinished {
            timestamp: ts(at),
            message: if succeeded {
                "Build succeeded.".to_string()
            } else {
                "Build failed.".to_string()
            },
            succeeded,
        })
    }

    fn project_started(file: &str, targets: &str, at: i64) -> BuildEvent {
        BuildEvent::ProjectStarted(ProjectStarted {
            project_file: file.to_string(),
            target_names: targets.to_string(),
            timestamp: ts(at),
            message: format!("Project \"{file}\" started."),
            global_properties: Vec::new(),
            initial_properties: Vec::new(),
        })
    }

    fn project_finished(file: &str, at: i64, succeeded: bool) -> BuildEvent {
        BuildEvent::ProjectFinished(ProjectFinished {
            project_file: file.to_string(),
            timestamp: ts(at),
            message: format!("Done building project \"{file}\"."),
            succeeded,
        })
    }

    fn target_started(name: &str, at: i64) -> BuildEvent {
        BuildEvent::TargetStarted(TargetStarted {
            target_name: name.to_string(),
            timestamp: ts(at),
            message: format!("Target \"{name}\" started."),
        })
    }

    fn target_finished(name: &str, at: i64, succeeded: bool) -> BuildEvent {
        BuildEvent::TargetFinished(TargetFinished {
            target_name: name.to_string(),
            timestamp: ts(at),
            message: format!("Done building target \"{name}\"."),
            succeeded,
        })
    }

    fn task_started(name: &str, at: i64) -> BuildEvent {
        BuildEvent::TaskStarted(TaskStarted {
            task_name: name.to_string(),
            timestamp: ts(at),
            message: format!("Task \"{name}\" started."),
        })
    }

    fn task_finished(name: &str, at: i64, succeeded: bool) -> BuildEvent {
        BuildEvent::TaskFinished(TaskFinished {
            task_name: name.to_string(),
            timestamp: ts(at),
            message: format!("Task \"{name}\" finished."),
            succeeded,
        })
    }

    fn message(text: &str, importance: MessageImportance, at: i64) -> BuildEvent {
        BuildEvent::MessageRaised(BuildMessage {
            timestamp: ts(at),
            message: text.to_string(),
            importance,
        })
    }

    fn chart_after_heading<'a>(
        document: &'a ReportDocument,
        heading: &str,
    ) -> &'a [(String, TimeDelta)] {
        let mut elements = document.elements();
        while let Some(el) = elements.next() {
            if matches!(el, ReportElement::Heading { text, .. } if text == heading) {
                match elements.next() {
                    Some(ReportElement::BarChart { entries }) => return entries,
                    other => panic!("expected chart after {heading:?}, got {other:?}"),
                }
            }
        }
        panic!("missing heading {heading:?}");
    }

    fn toc_rows(document: &ReportDocument) -> &[TocRow] {
        document
            .toc
            .iter()
            .find_map(|el| match el {
                ReportElement::ProjectIndex { rows } => Some(rows.as_slice()),
                _ => None,
            })
            .expect("document has no project index")
    }

    #[test]
    fn repeated_target_accumulates_and_project_gets_one_toc_row() {
        let events = vec![
            build_started(0),
            project_started("src/A.proj", "Build", 0),
            target_started("Build", 0),
            target_finished("Build", 2, true),
            target_started("Build", 3),
            target_finished("Build", 5, true),
            project_finished("src/A.proj", 6, true),
            build_finished(6, true),
        ];

        let document = assemble_report(SessionConfig::default(), events).unwrap();

        let targets = chart_after_heading(&document, "Target summary");
        assert_eq!(targets, &[("Build".to_string(), TimeDelta::seconds(4))]);

        let rows = toc_rows(&document);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "src/A.proj");
        assert!(rows[0].succeeded);
        assert_eq!(rows[0].cumulative, TimeDelta::seconds(6));
        assert_eq!(rows[0].started_at, ts(0));
        assert_eq!(rows[0].target_names.as_deref(), Some("Build"));
    }

    #[test]
    fn summary_charts_rank_by_cumulative_duration() {
        let events = vec![
            build_started(0),
            target_started("Restore", 0),
            target_finished("Restore", 1, true),
            target_started("Compile", 1),
            target_finished("Compile", 8, true),
            target_started("Pack", 8),
            target_finished("Pack", 11, true),
            build_finished(11, true),
        ];

        let document = assemble_report(SessionConfig::default(), events).unwrap();
        let names: Vec<_> = chart_after_heading(&document, "Target summary")
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["Compile", "Pack", "Restore"]);
    }

    #[test]
    fn reentrant_project_merges_into_earliest_position() {
        let events = vec![
            build_started(0),
            project_started("src/A.proj", "Build", 0),
            project_finished("src/A.proj", 2, true),
            project_started("src/B.proj", "", 3),
            project_finished("src/B.proj", 5, true),
            project_started("src/A.proj", "Test", 6),
            project_finished("src/A.proj", 9, false),
            build_finished(9, false),
        ];

        let document = assemble_report(SessionConfig::default(), events).unwrap();
        let rows = toc_rows(&document);

        assert_eq!(rows.len(), 2);
        // A keeps its first-start position even though it finished last.
        assert_eq!(rows[0].name, "src/A.proj");
        assert_eq!(rows[0].cumulative, TimeDelta::seconds(5));
        assert!(!rows[0].succeeded, "one failed invocation fails the row");
        assert_eq!(rows[0].started_at, ts(0));
        // Default policy keeps the first invocation's requested targets.
        assert_eq!(rows[0].target_names.as_deref(), Some("Build"));

        assert_eq!(rows[1].name, "src/B.proj");
        assert_eq!(rows[1].target_names, None, "no targets requested");
    }

    #[test]
    fn last_requested_policy_takes_later_target_names() {
        let config = SessionConfig {
            target_names: TargetNamesPolicy::LastRequested,
            ..SessionConfig::default()
        };
        let events = vec![
            build_started(0),
            project_started("src/A.proj", "Build", 0),
            project_finished("src/A.proj", 2, true),
            project_started("src/A.proj", "Test", 3),
            project_finished("src/A.proj", 5, true),
            build_finished(5, true),
        ];

        let document = assemble_report(config, events).unwrap();
        assert_eq!(toc_rows(&document)[0].target_names.as_deref(), Some("Test"));
    }

    #[test]
    fn finish_without_start_fails_the_session() {
        let session = ReportSession::new(SessionConfig::default());
        let Applied::Running(session) = session.apply(&build_started(0)).unwrap() else {
            panic!("expected running session");
        };

        let result = session.apply(&target_finished("Build", 1, true));
        assert_eq!(
            result.unwrap_err(),
            ProtocolError::FinishWithoutStart {
                kind: EntityKind::Target
            }
        );
    }

    #[test]
    fn unfinished_start_at_build_finish_fails_the_session() {
        let events = vec![
            build_started(0),
            target_started("Build", 0),
            build_finished(1, true),
        ];
        let result = assemble_report(SessionConfig::default(), events);
        assert_eq!(
            result.unwrap_err(),
            ProtocolError::UnfinishedStarts {
                kind: EntityKind::Target,
                count: 1
            }
        );
    }

    #[test]
    fn first_event_must_be_build_started() {
        let session = ReportSession::new(SessionConfig::default());
        let result = session.apply(&target_started("Build", 0));
        assert!(matches!(
            result,
            Err(ProtocolError::UnexpectedEvent {
                state: SessionState::NotStarted,
                event: "target_started"
            })
        ));
    }

    #[test]
    fn second_build_started_is_rejected() {
        let session = ReportSession::new(SessionConfig::default());
        let Applied::Running(session) = session.apply(&build_started(0)).unwrap() else {
            panic!("expected running session");
        };
        let result = session.apply(&build_started(1));
        assert!(matches!(
            result,
            Err(ProtocolError::UnexpectedEvent {
                state: SessionState::Running,
                event: "build_started"
            })
        ));
    }

    #[test]
    fn stream_without_terminal_event_produces_no_document() {
        let events = vec![build_started(0), target_started("Build", 0)];
        let result = assemble_report(SessionConfig::default(), events);
        assert_eq!(result.unwrap_err(), ProtocolError::TruncatedStream);
    }

    #[test]
    fn events_after_build_finished_are_rejected() {
        let events = vec![
            build_started(0),
            build_finished(1, true),
            message("late", MessageImportance::High, 2),
        ];
        let result = assemble_report(SessionConfig::default(), events);
        assert!(matches!(
            result,
            Err(ProtocolError::UnexpectedEvent {
                state: SessionState::Finished,
                event: "message_raised"
            })
        ));
    }

    #[test]
    fn task_failure_surfaces_even_at_quiet() {
        let config = SessionConfig {
            verbosity: Verbosity::Quiet,
            ..SessionConfig::default()
        };
        let events = vec![
            build_started(0),
            task_started("Csc", 0),
            task_finished("Csc", 1, false),
            build_finished(2, false),
        ];

        let document = assemble_report(config, events).unwrap();
        assert!(
            document.body.iter().any(|el| matches!(
                el,
                ReportElement::Status { tone: Tone::Failure, text } if text.contains("Task failed")
            )),
            "failure marker must be emitted regardless of verbosity"
        );
    }

    #[test]
    fn successful_task_marker_needs_detailed_verbosity() {
        let events = vec![
            build_started(0),
            task_started("Copy", 0),
            task_finished("Copy", 1, true),
            build_finished(2, true),
        ];

        let normal = assemble_report(SessionConfig::default(), events.clone()).unwrap();
        assert!(!normal.body.iter().any(
            |el| matches!(el, ReportElement::Status { text, .. } if text.contains("Task finished"))
        ));

        let config = SessionConfig {
            verbosity: Verbosity::Detailed,
            ..SessionConfig::default()
        };
        let detailed = assemble_report(config, events).unwrap();
        assert!(detailed.body.iter().any(
            |el| matches!(el, ReportElement::Status { text, .. } if text.contains("Task finished"))
        ));
    }

    #[test]
    fn low_importance_message_suppressed_below_detailed() {
        let events = vec![
            build_started(0),
            message("noise", MessageImportance::Low, 1),
            message("headline", MessageImportance::High, 2),
            build_finished(3, true),
        ];

        let config = SessionConfig {
            verbosity: Verbosity::Quiet,
            ..SessionConfig::default()
        };
        let document = assemble_report(config, events.clone()).unwrap();
        let messages: Vec<_> = document
            .body
            .iter()
            .filter_map(|el| match el {
                ReportElement::Message {
                    text, emphasized, ..
                } => Some((text.as_str(), *emphasized)),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec![("headline", true)]);

        let config = SessionConfig {
            verbosity: Verbosity::Detailed,
            ..SessionConfig::default()
        };
        let document = assemble_report(config, events).unwrap();
        assert!(
            document
                .body
                .iter()
                .any(|el| matches!(el, ReportElement::Message { text, .. } if text == "noise"))
        );
    }

    #[test]
    fn errors_and_warnings_emit_at_every_verbosity() {
        let config = SessionConfig {
            verbosity: Verbosity::Quiet,
            ..SessionConfig::default()
        };
        let events = vec![
            build_started(0),
            BuildEvent::ErrorRaised(Diagnostic {
                timestamp: ts(1),
                message: "name does not exist".to_string(),
                code: Some("CS0103".to_string()),
                file: Some("src/main.cs".to_string()),
                line: Some(7),
            }),
            BuildEvent::WarningRaised(Diagnostic {
                timestamp: ts(2),
                message: "unused variable".to_string(),
                code: None,
                file: None,
                line: None,
            }),
            build_finished(3, false),
        ];

        let document = assemble_report(config, events).unwrap();
        assert!(document.body.iter().any(|el| matches!(
            el,
            ReportElement::Status { tone: Tone::Error, text }
                if text.contains("CS0103") && text.contains("src/main.cs:7")
        )));
        assert!(document.body.iter().any(|el| matches!(
            el,
            ReportElement::Status { tone: Tone::Warning, text } if text.contains("unused variable")
        )));
    }

    #[test]
    fn detailed_verbosity_emits_property_tables() {
        let config = SessionConfig {
            verbosity: Verbosity::Detailed,
            ..SessionConfig::default()
        };
        let events = vec![
            BuildEvent::BuildStarted(BuildStarted {
                timestamp: ts(0),
                message: "Build started.".to_string(),
                environment: vec![("MSBUILDDIR".to_string(), "/opt/msbuild".to_string())],
                properties: Vec::new(),
            }),
            build_finished(1, true),
        ];

        let document = assemble_report(config, events.clone()).unwrap();
        assert!(document.body.iter().any(|el| matches!(
            el,
            ReportElement::Table { rows, .. }
                if rows.iter().any(|row| row.first().is_some_and(|c| c == "MSBUILDDIR"))
        )));

        let quiet = assemble_report(SessionConfig::default(), events).unwrap();
        assert!(
            !quiet
                .body
                .iter()
                .any(|el| matches!(el, ReportElement::Table { .. }))
        );
    }

    #[test]
    fn body_anchor_matches_toc_anchor() {
        let events = vec![
            build_started(0),
            project_started("src/A.proj", "Build", 1),
            project_finished("src/A.proj", 4, true),
            build_finished(4, true),
        ];

        let document = assemble_report(SessionConfig::default(), events).unwrap();
        let toc_anchor = toc_rows(&document)[0].anchor.clone();
        assert!(
            document
                .body
                .iter()
                .any(|el| matches!(el, ReportElement::Anchor { id } if *id == toc_anchor)),
            "table of contents must link to an anchor present in the body"
        );
    }

    #[test]
    fn nested_tasks_pair_lifo_and_both_accumulate() {
        let events = vec![
            build_started(0),
            task_started("Outer", 0),
            task_started("Inner", 1),
            task_finished("Inner", 3, true),
            task_finished("Outer", 6, true),
            build_finished(6, true),
        ];

        let document = assemble_report(SessionConfig::default(), events).unwrap();
        let tasks = chart_after_heading(&document, "Task summary");
        assert_eq!(
            tasks,
            &[
                ("Outer".to_string(), TimeDelta::seconds(6)),
                ("Inner".to_string(), TimeDelta::seconds(2)),
            ]
        );
    }
}
