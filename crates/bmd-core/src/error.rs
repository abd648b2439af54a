//! Session-fatal protocol errors.

use thiserror::Error;

use crate::event::EntityKind;
use crate::session::SessionState;

/// A violation of the event source contract.
///
/// Every variant is fatal to the report session: the event source and the
/// aggregator have desynchronized, so no document is produced. The host
/// decides whether to abort the build or continue without a report.
/// Malformed configuration entries are deliberately absent here; those are
/// recovered locally by the parameter parser.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A finished event arrived with no pending start of its kind.
    #[error("{kind} finished with no matching start")]
    FinishWithoutStart { kind: EntityKind },

    /// Starts of a kind were still pending when the build finished.
    #[error("build finished with {count} unfinished {kind} start(s)")]
    UnfinishedStarts { kind: EntityKind, count: usize },

    /// An event arrived in a session state that does not accept it.
    #[error("unexpected {event} event while session is {state}")]
    UnexpectedEvent {
        state: SessionState,
        event: &'static str,
    },

    /// A message event carried an importance outside the known tiers.
    #[error("unknown message importance: {value}")]
    UnknownImportance { value: String },

    /// A verbosity name was not one of the known levels or abbreviations.
    #[error("unrecognized verbosity: {value}")]
    InvalidVerbosity { value: String },

    /// The event stream ended before the build-finished event.
    #[error("event stream ended before the build finished")]
    TruncatedStream,
}
