//! Domain types for the audit recorder.
//!
//! This module contains the core data structures:
//! - Events: the record schema written to the audit log
//! - Notification: engine payloads and their capability traits
//! - Run: lifecycle state of one recorded run

pub mod events;
pub mod notification;
pub mod run;

// Re-export commonly used types
pub use events::{EventRecord, EventType, Phase, Status};
pub use notification::{
    HostEntry, HostOutcome, HostSummary, HostVars, ImportResult, Notification, PlayContext,
    PlayStart, RunStats, TaskOutcome, TaskResult,
};
pub use run::RunState;
