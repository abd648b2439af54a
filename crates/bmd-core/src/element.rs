//! Typed report elements.
//!
//! Elements are opaque, immutable units of output content. The aggregation
//! engine appends them in order; a rendering collaborator turns them into a
//! textual document. Nothing here knows what the rendered form looks like.

use chrono::{DateTime, TimeDelta, Utc};

/// Visual tone of a status marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Success,
    Failure,
    Warning,
    Error,
}

/// One row of the project table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocRow {
    pub name: String,
    /// Anchor id of the project's body heading.
    pub anchor: String,
    /// False if any invocation of the project failed.
    pub succeeded: bool,
    pub cumulative: TimeDelta,
    /// Earliest start across all invocations; determines row order.
    pub started_at: DateTime<Utc>,
    /// Targets requested of the project, `None` when the engine ran the
    /// project's default targets.
    pub target_names: Option<String>,
}

/// An ordered unit of report content.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportElement {
    Heading { level: u8, text: String },
    /// An in-document link target.
    Anchor { id: String },
    /// A one-line lifecycle or diagnostic marker.
    Status { text: String, tone: Tone },
    /// A build engine message, optionally emphasized.
    Message {
        text: String,
        timestamp: DateTime<Utc>,
        emphasized: bool,
    },
    Paragraph { text: String },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// A ranked duration chart; entries arrive already ordered.
    BarChart { entries: Vec<(String, TimeDelta)> },
    /// The project table of contents; rows arrive already ordered.
    ProjectIndex { rows: Vec<TocRow> },
}

impl ReportElement {
    /// Convenience constructor for name/value tables.
    #[must_use]
    pub fn name_value_table(pairs: &[(String, String)]) -> Self {
        Self::Table {
            headers: vec!["Name".to_string(), "Value".to_string()],
            rows: pairs
                .iter()
                .map(|(name, value)| vec![name.clone(), value.clone()])
                .collect(),
        }
    }
}
