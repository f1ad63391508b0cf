//! audit-trail - Audit recorder for automation pipeline runs
//!
//! Observes the lifecycle notifications an orchestration engine emits while
//! it runs a pipeline against a set of hosts, and appends one self-contained
//! JSON record per notification to a durable log.
//!
//! # Architecture
//!
//! - Every notification becomes exactly one immutable record
//! - Records are appended, one line each, and never rewritten
//! - A per-run context correlates records by session and tallies failures
//!   so the finish record can report the run's outcome
//!
//! # Modules
//!
//! - `core`: Recording logic (RunContext, translator, LogSink, HookAdapter)
//! - `domain`: Data structures (EventRecord, notifications, RunState)
//! - `config`: Log location and identity settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Record a run from captured notifications
//! audit-trail feed --input notifications.jsonl
//!
//! # Show where records go
//! audit-trail config
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::config::RecorderSettings;
pub use crate::core::{AuditError, HookAdapter, LogSink, RunContext};
pub use crate::domain::{EventRecord, EventType, Notification, Phase, RunState, Status};
