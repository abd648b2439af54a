//! Lifecycle events delivered by the build engine.
//!
//! The engine emits paired started/finished notifications for the build
//! itself and for every project, target, and task it runs, plus unpaired
//! error/warning/message notifications. Within one kind, finished events
//! arrive in strict reverse order of their starts (proper nesting).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// The entity kinds tracked across a build session.
///
/// The kind selects which pending-start stack and which duration store an
/// event applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Target,
    Task,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Target => "target",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Importance tier attached to message events.
///
/// An unknown importance string is a protocol violation, not a default:
/// the event source and the aggregator have desynchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageImportance {
    High,
    Normal,
    Low,
}

impl MessageImportance {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for MessageImportance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageImportance {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            _ => Err(ProtocolError::UnknownImportance {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for MessageImportance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageImportance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Name/value pairs carried by start events (engine environment, project
/// properties). Ordering is preserved as delivered.
pub type Properties = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStarted {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildFinished {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStarted {
    /// Path of the project file. Project identity for aggregation.
    pub project_file: String,
    /// The targets the engine was asked to run, comma separated. Empty when
    /// the engine runs the project's default targets.
    #[serde(default)]
    pub target_names: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFinished {
    pub project_file: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStarted {
    pub target_name: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFinished {
    pub target_name: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStarted {
    pub task_name: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFinished {
    pub task_name: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub succeeded: bool,
}

/// Payload of error and warning events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Diagnostic {
    /// `file:line` when the event carries a source location.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref()?;
        Some(match self.line {
            Some(line) => format!("{file}:{line}"),
            None => file.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildMessage {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub importance: MessageImportance,
}

/// One lifecycle notification from the build engine.
///
/// The ten variants mirror the engine's callback surface. Delivery is
/// synchronous and in emission order; the aggregator consumes them as a
/// message stream instead of registering delegates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildEvent {
    BuildStarted(BuildStarted),
    BuildFinished(BuildFinished),
    ProjectStarted(ProjectStarted),
    ProjectFinished(ProjectFinished),
    TargetStarted(TargetStarted),
    TargetFinished(TargetFinished),
    TaskStarted(TaskStarted),
    TaskFinished(TaskFinished),
    ErrorRaised(Diagnostic),
    WarningRaised(Diagnostic),
    MessageRaised(BuildMessage),
}

impl BuildEvent {
    /// The wire name of this event, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::BuildStarted(_) => "build_started",
            Self::BuildFinished(_) => "build_finished",
            Self::ProjectStarted(_) => "project_started",
            Self::ProjectFinished(_) => "project_finished",
            Self::TargetStarted(_) => "target_started",
            Self::TargetFinished(_) => "target_finished",
            Self::TaskStarted(_) => "task_started",
            Self::TaskFinished(_) => "task_finished",
            Self::ErrorRaised(_) => "error_raised",
            Self::WarningRaised(_) => "warning_raised",
            Self::MessageRaised(_) => "message_raised",
        }
    }

    /// When the event occurred.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::BuildStarted(e) => e.timestamp,
            Self::BuildFinished(e) => e.timestamp,
            Self::ProjectStarted(e) => e.timestamp,
            Self::ProjectFinished(e) => e.timestamp,
            Self::TargetStarted(e) => e.timestamp,
            Self::TargetFinished(e) => e.timestamp,
            Self::TaskStarted(e) => e.timestamp,
            Self::TaskFinished(e) => e.timestamp,
            Self::ErrorRaised(e) | Self::WarningRaised(e) => e.timestamp,
            Self::MessageRaised(e) => e.timestamp,
        }
    }
}
