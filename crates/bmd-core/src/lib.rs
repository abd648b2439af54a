//! Event aggregation engine for build report generation.
//!
//! This crate turns a stream of build engine lifecycle events into a single
//! structured report document:
//! - Pairing: each finished event is matched to its start via per-kind
//!   LIFO stacks ([`NestingSequencer`])
//! - Aggregation: repeated invocations of the same named entity merge into
//!   one cumulative record ([`DurationAccumulator`])
//! - Assembly: an append-only body plus a prepended, cross-linked project
//!   table of contents ([`ReportSession`])
//!
//! Everything is single-threaded and synchronous; the engine performs no
//! I/O and never formats output itself — it emits [`ReportElement`] values
//! for a rendering collaborator.

pub mod accumulator;
pub mod anchor;
pub mod element;
pub mod error;
pub mod event;
pub mod sequencer;
pub mod session;
pub mod verbosity;

pub use accumulator::{DurationAccumulator, DurationStore, ExecutionRecord};
pub use anchor::anchor_id;
pub use element::{ReportElement, TocRow, Tone};
pub use error::ProtocolError;
pub use event::{BuildEvent, EntityKind, MessageImportance};
pub use sequencer::NestingSequencer;
pub use session::{
    Applied, ReportDocument, ReportSession, SessionConfig, SessionState, TargetNamesPolicy,
    assemble_report,
};
pub use verbosity::Verbosity;
