//! Pairing of started/finished events via per-kind pending stacks.

use crate::error::ProtocolError;
use crate::event::{EntityKind, ProjectStarted, TargetStarted, TaskStarted};

/// Matches each finished event to its corresponding started event.
///
/// Nesting is not globally ordered (tasks nest inside targets inside
/// projects), but within one kind starts and finishes are well-nested, so
/// one LIFO stack per kind suffices. A finish with an empty stack for its
/// kind means the event source violated the nesting contract; finishes are
/// never speculative.
#[derive(Debug, Default)]
pub struct NestingSequencer {
    projects: Vec<ProjectStarted>,
    targets: Vec<TargetStarted>,
    tasks: Vec<TaskStarted>,
}

fn pop_pending<T>(stack: &mut Vec<T>, kind: EntityKind) -> Result<T, ProtocolError> {
    stack
        .pop()
        .ok_or(ProtocolError::FinishWithoutStart { kind })
}

impl NestingSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_started(&mut self, started: ProjectStarted) {
        self.projects.push(started);
    }

    /// Pops the innermost pending project start.
    pub fn project_finished(&mut self) -> Result<ProjectStarted, ProtocolError> {
        pop_pending(&mut self.projects, EntityKind::Project)
    }

    pub fn target_started(&mut self, started: TargetStarted) {
        self.targets.push(started);
    }

    pub fn target_finished(&mut self) -> Result<TargetStarted, ProtocolError> {
        pop_pending(&mut self.targets, EntityKind::Target)
    }

    pub fn task_started(&mut self, started: TaskStarted) {
        self.tasks.push(started);
    }

    pub fn task_finished(&mut self) -> Result<TaskStarted, ProtocolError> {
        pop_pending(&mut self.tasks, EntityKind::Task)
    }

    /// Number of starts of `kind` still awaiting their finish.
    #[must_use]
    pub fn pending(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Project => self.projects.len(),
            EntityKind::Target => self.targets.len(),
            EntityKind::Task => self.tasks.len(),
        }
    }

    /// True when every start has been paired with a finish.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.projects.is_empty() && self.targets.is_empty() && self.tasks.is_empty()
    }
}
