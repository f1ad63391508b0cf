//! Payloads delivered by the orchestration engine.
//!
//! Entry points depend only on the capability traits ([`HostOutcome`],
//! [`TaskOutcome`], [`PlayContext`]); the concrete structs here are what the
//! `feed` command decodes from JSON lines, and what tests construct.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolved variables of one host
pub type HostVars = Map<String, Value>;

/// A result tied to a target host
pub trait HostOutcome {
    fn host_name(&self) -> &str;
}

/// A per-host task result
pub trait TaskOutcome: HostOutcome {
    fn task_name(&self) -> &str;

    /// `None` when the engine did not report a change flag
    fn changed(&self) -> Option<bool>;
}

/// Host metadata available when a play begins
pub trait PlayContext {
    /// Play name, when the engine reports one
    fn play_name(&self) -> Option<&str> {
        None
    }

    /// Name of the first host the play targets
    fn first_host_name(&self) -> Option<&str> {
        None
    }

    /// Variables of the first host the play targets, if any host resolved
    fn first_host_vars(&self) -> Option<&HostVars>;
}

/// Outcome of one task on one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub host: String,
    pub task: String,
    #[serde(default)]
    pub changed: Option<bool>,
}

impl TaskResult {
    pub fn new(host: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            task: task.into(),
            changed: None,
        }
    }

    pub fn with_changed(mut self, changed: bool) -> Self {
        self.changed = Some(changed);
        self
    }
}

impl HostOutcome for TaskResult {
    fn host_name(&self) -> &str {
        &self.host
    }
}

impl TaskOutcome for TaskResult {
    fn task_name(&self) -> &str {
        &self.task
    }

    fn changed(&self) -> Option<bool> {
        self.changed
    }
}

/// A file import attempted for one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub host: String,
    pub file: String,
}

impl HostOutcome for ImportResult {
    fn host_name(&self) -> &str {
        &self.host
    }
}

/// A host targeted by a play, with its resolved variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostEntry {
    pub name: String,
    #[serde(default)]
    pub vars: HostVars,
}

/// A play beginning, in host order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayStart {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}

impl PlayStart {
    /// Play with a single host carrying one variable
    pub fn single_host(host: impl Into<String>, variable: &str, value: impl Into<String>) -> Self {
        let mut vars = HostVars::new();
        vars.insert(variable.to_string(), Value::String(value.into()));

        Self {
            name: None,
            hosts: vec![HostEntry {
                name: host.into(),
                vars,
            }],
        }
    }
}

impl PlayContext for PlayStart {
    fn play_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn first_host_name(&self) -> Option<&str> {
        self.hosts.first().map(|h| h.name.as_str())
    }

    fn first_host_vars(&self) -> Option<&HostVars> {
        self.hosts.first().map(|h| &h.vars)
    }
}

/// Per-host counters as tallied by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSummary {
    pub ok: u32,
    pub changed: u32,
    pub failures: u32,
    pub unreachable: u32,
    pub skipped: u32,
}

/// End-of-run summary reported by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStats {
    pub hosts: BTreeMap<String, HostSummary>,
}

impl RunStats {
    /// Failures plus unreachable hosts across all hosts, saturating
    pub fn failure_total(&self) -> u64 {
        self.hosts.values().fold(0u64, |total, s| {
            total
                .saturating_add(u64::from(s.failures))
                .saturating_add(u64::from(s.unreachable))
        })
    }
}

/// One engine notification, as decoded from a JSON line.
///
/// The `kind` field selects the variant; payload fields sit alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    PipelineStart { path: PathBuf },
    PlayStart(PlayStart),
    PipelineComplete(RunStats),
    TaskOk(TaskResult),
    TaskSkipped(TaskResult),
    TaskFailed(TaskResult),
    TaskUnreachable(TaskResult),
    AsyncTaskFailed(TaskResult),
    FileImported(ImportResult),
    FileImportMissing(ImportResult),
}

impl Notification {
    /// Short label for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PipelineStart { .. } => "pipeline_start",
            Self::PlayStart(_) => "play_start",
            Self::PipelineComplete(_) => "pipeline_complete",
            Self::TaskOk(_) => "task_ok",
            Self::TaskSkipped(_) => "task_skipped",
            Self::TaskFailed(_) => "task_failed",
            Self::TaskUnreachable(_) => "task_unreachable",
            Self::AsyncTaskFailed(_) => "async_task_failed",
            Self::FileImported(_) => "file_imported",
            Self::FileImportMissing(_) => "file_import_missing",
        }
    }
}
