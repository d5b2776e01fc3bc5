//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use gtd_ingest::SchemaValidator;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route log output through the test harness so `RUST_LOG` works in
/// test runs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// The schema documents shipped with the crate.
pub fn schemas_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schemas")
}

pub fn validator() -> SchemaValidator {
    SchemaValidator::new(schemas_dir())
}

pub fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A nested export with one root project ("Inbox") holding task "A"
/// (priority 4) with sub-task "A1" (priority 1), a sectioned project
/// with two tasks, and a nested child project with one task.
pub fn sample_todoist_export() -> Value {
    json!({
        "projects": [
            {
                "id": "p-inbox",
                "name": "Inbox",
                "tasks": [
                    {
                        "id": "t-a",
                        "content": "A",
                        "priority": 4,
                        "sub_tasks": [
                            { "id": "t-a1", "content": "A1", "priority": 1 }
                        ]
                    }
                ]
            },
            {
                "id": "p-house",
                "name": "House move",
                "sections": [
                    {
                        "id": "s-1",
                        "name": "Packing",
                        "tasks": [
                            { "id": "t-b", "content": "Pack books", "priority": 2 },
                            { "id": "t-c", "content": "Order boxes" }
                        ]
                    }
                ],
                "child_projects": [
                    {
                        "id": "p-garage",
                        "name": "Garage",
                        "tasks": [ { "id": "t-d", "content": "Sort tools" } ]
                    }
                ]
            }
        ],
        "labels": [ { "id": "l-1", "name": "phone" } ]
    })
}

/// An events export in the calendar-name map shape: two live events
/// (one actionable by keyword) and one cancelled.
pub fn sample_events_export() -> Value {
    json!({
        "Work": [
            {
                "id": "e-standup",
                "summary": "daily standup",
                "status": "confirmed",
                "start": { "dateTime": "2024-06-03T09:00:00Z", "timeZone": "UTC" },
                "end": { "dateTime": "2024-06-03T09:15:00Z", "timeZone": "UTC" }
            },
            {
                "id": "e-cancelled",
                "summary": "old meeting",
                "status": "cancelled"
            }
        ],
        "Home": [
            {
                "id": "e-expenses",
                "summary": "Submit expense report",
                "description": "last day!",
                "status": "confirmed",
                "start": { "date": "2024-06-05" },
                "end": { "date": "2024-06-06" }
            }
        ]
    })
}

/// A native tasks export covering the 0-10 priority spread.
pub fn sample_calendar_tasks() -> Value {
    json!([
        { "id": "ct-1", "title": "renew passport", "priority": 9, "status": "active",
          "due_date": "2024-07-01" },
        { "id": "ct-2", "title": "water plants", "priority": 3 },
        { "id": "ct-3", "title": "old chore", "priority": 6, "status": "completed" }
    ])
}
