//! Log Format Integration Tests
//!
//! Every line of the audit log must stand on its own as a complete JSON
//! document carrying the full record schema.

use std::fs;
use std::io::Cursor;

use audit_trail::cli::feed_lines;
use audit_trail::core::{HookAdapter, LogSink, RunContext};
use serde_json::Value;
use tempfile::TempDir;

const SCHEMA_KEYS: [&str; 14] = [
    "event_type",
    "user_id",
    "session_id",
    "status",
    "phase",
    "playbook_id",
    "duration_seconds",
    "host",
    "task_name",
    "changed",
    "imported_file",
    "missing_file",
    "environment_name",
    "timestamp",
];

const NOTIFICATIONS: &str = r#"{"kind":"pipeline_start","path":"/srv/playbooks/web.yml"}
{"kind":"play_start","name":"web","hosts":[{"name":"web-1","vars":{"environment_name":"staging"}}]}
{"kind":"task_ok","host":"web-1","task":"Gather \"facts\"\n(multi-line)","changed":false}
{"kind":"task_skipped","host":"web-1","task":"optional"}
{"kind":"file_imported","host":"web-1","file":"vars/common.yml"}
{"kind":"task_unreachable","host":"web-2","task":"ping"}
{"kind":"play_start","name":"db","hosts":[{"name":"db-1","vars":{}}]}
{"kind":"async_task_failed","host":"db-1","task":"backup"}
{"kind":"pipeline_complete","hosts":{"web-2":{"unreachable":1},"db-1":{"failures":1}}}
"#;

fn run_feed(temp: &TempDir) -> String {
    let sink = LogSink::new(temp.path(), "audit.log");
    sink.provision().unwrap();
    let mut hooks = HookAdapter::new(RunContext::new("ci-bot"), sink, "environment_name");

    let count = feed_lines(&mut hooks, Cursor::new(NOTIFICATIONS)).unwrap();
    assert_eq!(count, 9);

    fs::read_to_string(temp.path().join("audit.log")).unwrap()
}

#[test]
fn test_every_line_is_a_complete_record() {
    let temp = TempDir::new().unwrap();
    let content = run_feed(&temp);

    assert!(content.ends_with('\n'));

    let lines: Vec<&str> = content.lines().collect();
    // pipeline_start writes nothing; the second play_start adds no start record
    assert_eq!(lines.len(), 7);

    for line in lines {
        let value: Value = serde_json::from_str(line).unwrap();
        let object = value.as_object().expect("record is a JSON object");

        for key in SCHEMA_KEYS {
            assert!(object.contains_key(key), "missing {key} in {line}");
        }
        assert_eq!(object.len(), SCHEMA_KEYS.len());
    }
}

#[test]
fn test_field_values_on_the_wire() {
    let temp = TempDir::new().unwrap();
    let content = run_feed(&temp);

    let values: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(values[0]["event_type"], "start");
    assert_eq!(values[0]["playbook_id"], "playbooks/web.yml");
    assert_eq!(values[0]["environment_name"], "staging");

    assert_eq!(values[1]["task_name"], "Gather \"facts\"\n(multi-line)");
    assert_eq!(values[1]["changed"], false);

    assert_eq!(values[2]["status"], "SKIPPED");
    assert_eq!(values[3]["status"], "IMPORTED");
    assert_eq!(values[3]["imported_file"], "vars/common.yml");
    assert_eq!(values[4]["status"], "UNREACHABLE");
    assert_eq!(values[5]["event_type"], "async_failed");

    let finish = &values[6];
    assert_eq!(finish["event_type"], "stats");
    assert_eq!(finish["phase"], "finish");
    assert_eq!(finish["status"], "FAILED");
    assert!(finish["duration_seconds"].as_f64().unwrap() >= 0.0);
    assert_eq!(finish["host"], Value::Null);
}
