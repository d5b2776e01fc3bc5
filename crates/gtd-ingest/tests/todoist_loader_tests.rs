//! Integration tests for the nested-export loader.

mod common;

use gtd_ingest::{EisenhowerQuadrant, IngestError, TodoistLoader};
use serde_json::json;
use tempfile::TempDir;

fn loader_for(value: &serde_json::Value) -> (TempDir, TodoistLoader) {
    common::init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todoist_export.json");
    common::write_json(&path, value);
    (dir, TodoistLoader::new(path, common::validator()))
}

#[tokio::test]
async fn flattens_every_reachable_task() {
    let (_dir, loader) = loader_for(&common::sample_todoist_export());
    let data = loader.load().await.unwrap();

    // 1 top-level + 1 sub-task + 2 section tasks + 1 child-project task
    assert_eq!(data.tasks.len(), 5);
    // 2 root projects + 1 child project, all flat
    assert_eq!(data.projects.len(), 3);
}

#[tokio::test]
async fn inbox_scenario_maps_priorities_and_membership() {
    let (_dir, loader) = loader_for(&common::sample_todoist_export());
    let data = loader.load().await.unwrap();

    let a = data.tasks.iter().find(|t| t.id == "t-a").unwrap();
    let a1 = data.tasks.iter().find(|t| t.id == "t-a1").unwrap();
    assert_eq!(a.quadrant, EisenhowerQuadrant::UrgentImportant);
    assert_eq!(a1.quadrant, EisenhowerQuadrant::UrgentNotImportant);

    let inbox = data.projects.iter().find(|p| p.id == "p-inbox").unwrap();
    let inbox_tasks: Vec<&str> = data
        .tasks
        .iter()
        .filter(|t| t.project.as_deref() == Some("p-inbox"))
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(inbox_tasks, vec!["t-a", "t-a1"]);
    assert!(inbox.tasks.contains(&"t-a".to_string()));
    assert!(inbox.tasks.contains(&"t-a1".to_string()));
}

#[tokio::test]
async fn both_relation_directions_are_set_for_every_task() {
    let (_dir, loader) = loader_for(&common::sample_todoist_export());
    let data = loader.load().await.unwrap();

    for task in &data.tasks {
        let pid = task.project.as_deref().expect("loader tags every task");
        let project = data.projects.iter().find(|p| p.id == pid).unwrap();
        assert!(project.tasks.contains(&task.id));
    }
}

#[tokio::test]
async fn child_projects_become_flat_entities_without_hierarchy() {
    let (_dir, loader) = loader_for(&common::sample_todoist_export());
    let data = loader.load().await.unwrap();

    let garage = data.projects.iter().find(|p| p.id == "p-garage").unwrap();
    assert_eq!(garage.name, "Garage");
    assert!(garage.tasks.contains(&"t-d".to_string()));
}

#[tokio::test]
async fn schema_violation_fails_fast_with_every_location() {
    let export = json!({
        "projects": [
            { "id": "p1" },
            { "name": "no id here" }
        ]
    });
    let (_dir, loader) = loader_for(&export);

    let err = loader.load().await.unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, IngestError::Validation { .. }));
    assert!(msg.contains("todoist_export.json"));
    assert!(msg.contains("$.projects[0]: missing required property 'name'"));
    assert!(msg.contains("$.projects[1]: missing required property 'id'"));
}

#[tokio::test]
async fn missing_file_is_its_own_error() {
    let dir = TempDir::new().unwrap();
    let loader = TodoistLoader::new(dir.path().join("absent.json"), common::validator());

    assert!(matches!(
        loader.load().await,
        Err(IngestError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn unparseable_file_is_its_own_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todoist_export.json");
    std::fs::write(&path, "{ definitely not json").unwrap();
    let loader = TodoistLoader::new(path, common::validator());

    assert!(matches!(
        loader.load().await,
        Err(IngestError::FileParse { .. })
    ));
}
