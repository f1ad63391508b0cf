//! Entry points invoked by the orchestration engine.
//!
//! Each entry point updates the run context where needed, builds the record
//! through [`translate`] and appends it to the sink. Errors from any of those
//! steps go straight back to the engine.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::RecorderSettings;
use crate::domain::{HostOutcome, Notification, PlayContext, RunState, RunStats, TaskOutcome};

use super::context::RunContext;
use super::error::AuditError;
use super::log_sink::LogSink;
use super::translator::{translate, EventPayload};

/// Receives the lifecycle notifications of one run and records them
pub struct HookAdapter {
    /// State of the run being recorded
    context: RunContext,

    /// Where records go
    sink: LogSink,

    /// Host variable holding the environment label
    environment_var: String,

    state: RunState,
}

impl HookAdapter {
    /// Start recording a new run with the given settings
    pub fn create(settings: &RecorderSettings) -> Result<Self, AuditError> {
        let sink = LogSink::from_settings(settings);
        let context = RunContext::create(settings, &sink)?;

        info!(
            session = %context.session_id(),
            user = %context.user_id(),
            log = %sink.log_path().display(),
            "Audit session opened"
        );

        Ok(Self::new(context, sink, settings.environment_var.clone()))
    }

    /// Adapter over an existing context and sink
    pub fn new(context: RunContext, sink: LogSink, environment_var: impl Into<String>) -> Self {
        Self {
            context,
            sink,
            environment_var: environment_var.into(),
            state: RunState::NotStarted,
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Pipeline definition resolved. Records its identity; writes nothing.
    pub fn on_pipeline_start(&mut self, path: &Path) -> Result<(), AuditError> {
        if self.ignored_after_finish("pipeline_start") {
            return Ok(());
        }

        self.context.record_playbook_start(path);
        self.state = self.state.on_pipeline_start();
        Ok(())
    }

    /// A play began. Resolves the environment on the first play and writes
    /// the start record once per run.
    #[instrument(
        skip_all,
        fields(session = %self.context.session_id(), play = play.play_name().unwrap_or("-"))
    )]
    pub fn on_play_start(&mut self, play: &dyn PlayContext) -> Result<(), AuditError> {
        if self.ignored_after_finish("play_start") {
            return Ok(());
        }

        let label = play
            .first_host_vars()
            .and_then(|vars| vars.get(&self.environment_var))
            .and_then(environment_label);
        let resolving = self.context.environment_name().is_none();
        self.context
            .record_environment(label.as_deref(), &self.environment_var)?;
        if resolving {
            debug!(
                host = play.first_host_name().unwrap_or("-"),
                environment = self.context.environment_name().unwrap_or("-"),
                "Environment resolved from first host"
            );
        }

        if self.context.start_logged() {
            return Ok(());
        }

        let record = translate(EventPayload::RunStart, &self.context);
        self.sink.append(&record)?;
        // Only a start record that reached the log counts
        self.context.mark_start_logged();

        info!(
            playbook = self.context.playbook_id().unwrap_or("-"),
            environment = self.context.environment_name().unwrap_or("-"),
            "Run start recorded"
        );
        Ok(())
    }

    /// The whole run finished
    pub fn on_pipeline_complete(&mut self, stats: &RunStats) -> Result<(), AuditError> {
        self.on_pipeline_complete_at(stats, Utc::now())
    }

    /// The whole run finished, as of `now`
    #[instrument(skip_all, fields(session = %self.context.session_id()))]
    pub fn on_pipeline_complete_at(
        &mut self,
        stats: &RunStats,
        now: DateTime<Utc>,
    ) -> Result<(), AuditError> {
        if self.ignored_after_finish("pipeline_complete") {
            return Ok(());
        }

        let observed = self.context.error_count();
        let reported = stats.failure_total();
        if !stats.hosts.is_empty() && reported != u64::from(observed) {
            warn!(
                observed,
                reported,
                "Engine failure count differs from failures recorded in this session"
            );
        }

        self.record(EventPayload::RunComplete { now })?;
        self.state = RunState::Finished;

        let (status, duration) = self.context.finish_summary(now);
        info!(?status, duration_seconds = duration, errors = observed, "Run finish recorded");
        Ok(())
    }

    pub fn on_task_ok(&mut self, result: &dyn TaskOutcome) -> Result<(), AuditError> {
        self.record(EventPayload::TaskOk(result))
    }

    pub fn on_task_skipped(&mut self, result: &dyn TaskOutcome) -> Result<(), AuditError> {
        self.record(EventPayload::TaskSkipped(result))
    }

    pub fn on_task_failed(&mut self, result: &dyn TaskOutcome) -> Result<(), AuditError> {
        self.record(EventPayload::TaskFailed(result))
    }

    pub fn on_task_unreachable(&mut self, result: &dyn TaskOutcome) -> Result<(), AuditError> {
        self.record(EventPayload::TaskUnreachable(result))
    }

    pub fn on_async_task_failed(&mut self, result: &dyn TaskOutcome) -> Result<(), AuditError> {
        self.record(EventPayload::AsyncTaskFailed(result))
    }

    pub fn on_file_imported(
        &mut self,
        result: &dyn HostOutcome,
        file: &str,
    ) -> Result<(), AuditError> {
        self.record(EventPayload::FileImported { result, file })
    }

    pub fn on_file_import_missing(
        &mut self,
        result: &dyn HostOutcome,
        file: &str,
    ) -> Result<(), AuditError> {
        self.record(EventPayload::FileImportMissing { result, file })
    }

    /// Route a decoded notification to its entry point
    pub fn dispatch(&mut self, notification: &Notification) -> Result<(), AuditError> {
        match notification {
            Notification::PipelineStart { path } => self.on_pipeline_start(path),
            Notification::PlayStart(play) => self.on_play_start(play),
            Notification::PipelineComplete(stats) => self.on_pipeline_complete(stats),
            Notification::TaskOk(result) => self.on_task_ok(result),
            Notification::TaskSkipped(result) => self.on_task_skipped(result),
            Notification::TaskFailed(result) => self.on_task_failed(result),
            Notification::TaskUnreachable(result) => self.on_task_unreachable(result),
            Notification::AsyncTaskFailed(result) => self.on_async_task_failed(result),
            Notification::FileImported(result) => self.on_file_imported(result, &result.file),
            Notification::FileImportMissing(result) => {
                self.on_file_import_missing(result, &result.file)
            }
        }
    }

    /// Count failures, build the record and append it
    fn record(&mut self, payload: EventPayload<'_>) -> Result<(), AuditError> {
        if self.ignored_after_finish(payload.kind()) {
            return Ok(());
        }

        if payload.is_failure() {
            self.context.increment_error();
        }

        let record = translate(payload, &self.context);
        self.sink.append(&record)
    }

    fn ignored_after_finish(&self, kind: &str) -> bool {
        if self.state.is_finished() {
            warn!(
                session = %self.context.session_id(),
                kind,
                "Notification after run completion ignored"
            );
            return true;
        }
        false
    }
}

/// Label text for a host variable; null means unresolved
fn environment_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
