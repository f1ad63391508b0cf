//! Mapping from engine notifications to audit records.
//!
//! Translation is pure: it reads the run context but never changes it.
//! Error counting and the start-once flag are handled by the hook adapter
//! around the call.

use chrono::{DateTime, Utc};

use crate::domain::{EventRecord, EventType, HostOutcome, Phase, Status, TaskOutcome};

use super::context::RunContext;

/// A notification reduced to what the record needs
#[derive(Clone, Copy)]
pub enum EventPayload<'a> {
    RunStart,
    RunComplete { now: DateTime<Utc> },
    TaskOk(&'a dyn TaskOutcome),
    TaskSkipped(&'a dyn TaskOutcome),
    TaskFailed(&'a dyn TaskOutcome),
    TaskUnreachable(&'a dyn TaskOutcome),
    AsyncTaskFailed(&'a dyn TaskOutcome),
    FileImported {
        result: &'a dyn HostOutcome,
        file: &'a str,
    },
    FileImportMissing {
        result: &'a dyn HostOutcome,
        file: &'a str,
    },
}

impl EventPayload<'_> {
    /// Short label for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunStart => "run_start",
            Self::RunComplete { .. } => "pipeline_complete",
            Self::TaskOk(_) => "task_ok",
            Self::TaskSkipped(_) => "task_skipped",
            Self::TaskFailed(_) => "task_failed",
            Self::TaskUnreachable(_) => "task_unreachable",
            Self::AsyncTaskFailed(_) => "async_task_failed",
            Self::FileImported { .. } => "file_imported",
            Self::FileImportMissing { .. } => "file_import_missing",
        }
    }

    /// Whether this notification counts toward the run's error total
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::TaskFailed(_) | Self::TaskUnreachable(_) | Self::AsyncTaskFailed(_)
        )
    }
}

/// Build the record for one notification
pub fn translate(payload: EventPayload<'_>, context: &RunContext) -> EventRecord {
    let base = |event_type: EventType, status: Status, phase: Phase| {
        let mut record = EventRecord::new(
            event_type,
            status,
            phase,
            context.user_id().to_string(),
            context.session_id().to_string(),
        );
        record.playbook_id = context.playbook_id().map(str::to_string);
        record.environment_name = context.environment_name().map(str::to_string);
        record
    };

    let task = |event_type: EventType, status: Status, outcome: &dyn TaskOutcome| {
        base(event_type, status, Phase::Task)
            .with_host(outcome.host_name())
            .with_task(outcome.task_name())
    };

    match payload {
        EventPayload::RunStart => base(EventType::Start, Status::Ok, Phase::Start),
        EventPayload::RunComplete { now } => {
            let (status, duration) = context.finish_summary(now);
            let mut record = base(EventType::Stats, status, Phase::Finish).with_duration(duration);
            record.timestamp = now;
            record
        }
        EventPayload::TaskOk(outcome) => {
            task(EventType::Ok, Status::Ok, outcome).with_changed(outcome.changed())
        }
        EventPayload::TaskSkipped(outcome) => task(EventType::Skipped, Status::Skipped, outcome),
        EventPayload::TaskFailed(outcome) => task(EventType::Failed, Status::Failed, outcome),
        EventPayload::TaskUnreachable(outcome) => {
            task(EventType::Unreachable, Status::Unreachable, outcome)
        }
        EventPayload::AsyncTaskFailed(outcome) => {
            task(EventType::AsyncFailed, Status::Failed, outcome)
        }
        EventPayload::FileImported { result, file } => {
            base(EventType::Import, Status::Imported, Phase::Import)
                .with_host(result.host_name())
                .with_imported_file(file)
        }
        EventPayload::FileImportMissing { result, file } => {
            base(EventType::NotImport, Status::NotImported, Phase::Import)
                .with_host(result.host_name())
                .with_missing_file(file)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::{ImportResult, TaskResult};
    use chrono::Duration;

    fn context() -> RunContext {
        let mut ctx = RunContext::new("alice");
        ctx.record_playbook_start(Path::new("/deploy/site.yml"));
        ctx.record_environment(Some("prod"), "environment_name").unwrap();
        ctx
    }

    #[test]
    fn test_start_record() {
        let ctx = context();
        let record = translate(EventPayload::RunStart, &ctx);

        assert_eq!(record.event_type, EventType::Start);
        assert_eq!(record.phase, Phase::Start);
        assert_eq!(record.status, Status::Ok);
        assert_eq!(record.playbook_id.as_deref(), Some("deploy/site.yml"));
        assert_eq!(record.environment_name.as_deref(), Some("prod"));
        assert_eq!(record.session_id, ctx.session_id().to_string());
        assert_eq!(record.user_id, "alice");
        assert!(record.host.is_none());
        assert!(record.duration_seconds.is_none());
    }

    #[test]
    fn test_task_ok_carries_changed() {
        let ctx = context();
        let result = TaskResult::new("a", "install").with_changed(true);

        let record = translate(EventPayload::TaskOk(&result), &ctx);

        assert_eq!(record.event_type, EventType::Ok);
        assert_eq!(record.phase, Phase::Task);
        assert_eq!(record.status, Status::Ok);
        assert_eq!(record.host.as_deref(), Some("a"));
        assert_eq!(record.task_name.as_deref(), Some("install"));
        assert_eq!(record.changed, Some(true));
    }

    #[test]
    fn test_failure_class_mapping() {
        let ctx = context();
        let result = TaskResult::new("b", "deploy").with_changed(false);

        let cases: [(EventPayload<'_>, EventType, Status); 3] = [
            (EventPayload::TaskFailed(&result), EventType::Failed, Status::Failed),
            (
                EventPayload::TaskUnreachable(&result),
                EventType::Unreachable,
                Status::Unreachable,
            ),
            (
                EventPayload::AsyncTaskFailed(&result),
                EventType::AsyncFailed,
                Status::Failed,
            ),
        ];

        for (payload, event_type, status) in cases {
            assert!(payload.is_failure());
            let record = translate(payload, &ctx);
            assert_eq!(record.event_type, event_type);
            assert_eq!(record.status, status);
            assert_eq!(record.phase, Phase::Task);
            assert_eq!(record.host.as_deref(), Some("b"));
            // Only successful tasks report a change flag
            assert_eq!(record.changed, None);
        }
    }

    #[test]
    fn test_skipped_is_not_a_failure() {
        let ctx = context();
        let result = TaskResult::new("a", "optional");
        let payload = EventPayload::TaskSkipped(&result);

        assert!(!payload.is_failure());
        let record = translate(payload, &ctx);
        assert_eq!(record.status, Status::Skipped);
        assert_eq!(record.event_type, EventType::Skipped);
    }

    #[test]
    fn test_import_records() {
        let ctx = context();
        let result = ImportResult {
            host: "c".to_string(),
            file: "vars/secret.yml".to_string(),
        };

        let missing = translate(
            EventPayload::FileImportMissing {
                result: &result,
                file: &result.file,
            },
            &ctx,
        );
        assert_eq!(missing.phase, Phase::Import);
        assert_eq!(missing.status, Status::NotImported);
        assert_eq!(missing.event_type, EventType::NotImport);
        assert_eq!(missing.missing_file.as_deref(), Some("vars/secret.yml"));
        assert!(missing.imported_file.is_none());

        let imported = translate(
            EventPayload::FileImported {
                result: &result,
                file: &result.file,
            },
            &ctx,
        );
        assert_eq!(imported.status, Status::Imported);
        assert_eq!(imported.imported_file.as_deref(), Some("vars/secret.yml"));
        assert!(imported.missing_file.is_none());
        assert_eq!(imported.host.as_deref(), Some("c"));
    }

    #[test]
    fn test_finish_record() {
        let start = Utc::now();
        let mut ctx = context().with_start_time(start);
        let now = start + Duration::milliseconds(5_000);

        let record = translate(EventPayload::RunComplete { now }, &ctx);
        assert_eq!(record.phase, Phase::Finish);
        assert_eq!(record.event_type, EventType::Stats);
        assert_eq!(record.status, Status::Ok);
        assert_eq!(record.duration_seconds, Some(5.0));
        assert_eq!(record.timestamp, now);

        ctx.increment_error();
        let record = translate(EventPayload::RunComplete { now }, &ctx);
        assert_eq!(record.status, Status::Failed);
    }

    #[test]
    fn test_absent_context_fields_stay_null() {
        let ctx = RunContext::new("alice");
        let record = translate(EventPayload::RunStart, &ctx);

        assert!(record.playbook_id.is_none());
        assert!(record.environment_name.is_none());
    }
}
