//! Per-run state shared by every entry point of one recorded run.

use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::RecorderSettings;
use crate::domain::Status;

use super::error::AuditError;
use super::identity::resolve_user;
use super::log_sink::LogSink;

/// Identity, timing and aggregate outcome of one pipeline execution.
///
/// Created once when the run begins and passed by reference into every
/// entry point; never shared between runs or threads.
#[derive(Debug, Clone)]
pub struct RunContext {
    session_id: Uuid,
    user_id: String,
    start_time: DateTime<Utc>,
    playbook_id: Option<String>,
    environment_name: Option<String>,
    error_count: u32,
    start_logged: bool,
}

impl RunContext {
    /// Resolve the invoking user, open a new session and make sure the log
    /// directory exists.
    pub fn create(settings: &RecorderSettings, sink: &LogSink) -> Result<Self, AuditError> {
        let user_id = resolve_user(&settings.user_override_var)?;
        let context = Self::new(user_id);
        sink.provision()?;
        Ok(context)
    }

    /// Fresh context for a known user, starting now
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::now_v7(),
            user_id: user_id.into(),
            start_time: Utc::now(),
            playbook_id: None,
            environment_name: None,
            error_count: 0,
            start_logged: false,
        }
    }

    /// Backdate the run start
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn playbook_id(&self) -> Option<&str> {
        self.playbook_id.as_deref()
    }

    pub fn environment_name(&self) -> Option<&str> {
        self.environment_name.as_deref()
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn start_logged(&self) -> bool {
        self.start_logged
    }

    /// Set the playbook identity as `<parent-dir>/<file>` of `path`
    pub fn record_playbook_start(&mut self, path: &Path) {
        self.playbook_id = Some(playbook_id_from_path(path));
    }

    /// Set the environment label on first resolution.
    ///
    /// Once a label is held, later calls keep it and never fail.
    pub fn record_environment(
        &mut self,
        name: Option<&str>,
        variable: &str,
    ) -> Result<(), AuditError> {
        if self.environment_name.is_some() {
            return Ok(());
        }

        let name = name.ok_or_else(|| AuditError::MissingEnvironmentMetadata {
            variable: variable.to_string(),
        })?;
        self.environment_name = Some(name.to_string());
        Ok(())
    }

    /// Count one failure-class notification
    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }

    /// Note that the start record is on disk
    pub fn mark_start_logged(&mut self) {
        self.start_logged = true;
    }

    /// Aggregate status and elapsed seconds as of `now`.
    ///
    /// A clock that went backwards yields a zero duration.
    pub fn finish_summary(&self, now: DateTime<Utc>) -> (Status, f64) {
        let status = if self.error_count == 0 {
            Status::Ok
        } else {
            Status::Failed
        };

        let duration = (now - self.start_time)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        (status, duration)
    }
}

/// `<parent-dir>/<file>` of a pipeline path; bare file names stay as they are
pub fn playbook_id_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let parent = path
        .parent()
        .and_then(Path::file_name)
        .map(|p| p.to_string_lossy().into_owned());

    match parent {
        Some(parent) => format!("{}/{}", parent, file_name),
        None => file_name,
    }
}
