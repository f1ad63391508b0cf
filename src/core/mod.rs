//! Core recording logic.
//!
//! This module contains:
//! - RunContext: identity, timing and error tally of one run
//! - Translator: notification to record mapping
//! - LogSink: append-only JSONL writer
//! - HookAdapter: entry points called by the orchestration engine

pub mod context;
pub mod error;
pub mod hooks;
pub mod identity;
pub mod log_sink;
pub mod translator;

// Re-export commonly used types
pub use context::{playbook_id_from_path, RunContext};
pub use error::AuditError;
pub use hooks::HookAdapter;
pub use identity::{os_user_name, resolve_user, resolve_user_with};
pub use log_sink::LogSink;
pub use translator::{translate, EventPayload};
