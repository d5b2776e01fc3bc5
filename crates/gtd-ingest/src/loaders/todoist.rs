//! Loader for the nested Todoist-style export.
//!
//! The export is tree-shaped: projects hold sections and tasks, tasks
//! hold sub-tasks to unbounded depth, and projects may nest through
//! `child_projects`. The loader flattens all of it: every project
//! record becomes one flat [`Project`] (the hierarchy is read but not
//! rebuilt) and every reachable task becomes one flat [`Task`] tagged
//! with the project it was found under. This file is a required input,
//! so any schema violation fails the whole load.

use crate::domain::{parse_export_date, EisenhowerQuadrant, Project, Task, TaskStatus};
use crate::errors::IngestError;
use crate::loaders::LoadedData;
use crate::schema::SchemaValidator;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Schema the nested export must conform to.
pub const TODOIST_SCHEMA: &str = "todoist_denormalized_schema";

/// Top-level shape of the nested export document.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoistExport {
    /// Root project records
    #[serde(default)]
    pub projects: Vec<RawProject>,
    /// Flat label list accompanying the tree
    #[serde(default)]
    pub labels: Vec<RawLabel>,
}

/// A project record as exported, children inline.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub sections: Vec<RawSection>,
    #[serde(default)]
    pub tasks: Vec<RawTask>,
    #[serde(default)]
    pub child_projects: Vec<RawProject>,
}

/// A section inside a project, holding its own task list.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

/// A task record; `sub_tasks` recurses to unbounded depth.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Source priority, 1 (normal) to 4 (urgent)
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub due: Option<RawDue>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sub_tasks: Vec<RawTask>,
}

/// Due-date object: a bare date or a full datetime.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDue {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
}

/// A label from the export's flat label list.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLabel {
    pub id: String,
    pub name: String,
}

/// Reads and normalizes the nested export.
#[derive(Debug, Clone)]
pub struct TodoistLoader {
    path: PathBuf,
    validator: SchemaValidator,
}

impl TodoistLoader {
    /// Create a loader for the export at `path`.
    pub fn new(path: impl AsRef<Path>, validator: SchemaValidator) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            validator,
        }
    }

    /// Read, parse, and schema-validate the raw export.
    ///
    /// Fail-fast policy: this file is required, so a validation failure
    /// is an error whose message carries every reported location.
    pub async fn load_raw(&self) -> Result<TodoistExport, IngestError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(IngestError::FileNotFound {
                    path: self.path.clone(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        let document: Value =
            serde_json::from_str(&contents).map_err(|source| IngestError::FileParse {
                path: self.path.clone(),
                source,
            })?;

        let report = self.validator.validate_data(&document, TODOIST_SCHEMA);
        if !report.valid {
            return Err(IngestError::Validation {
                path: self.path.clone(),
                errors: report.errors,
            });
        }

        serde_json::from_value(document).map_err(|source| IngestError::FileParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Normalize the export into flat tasks and projects.
    ///
    /// Two passes: project records first (flat, no hierarchy), then a
    /// recursive flatten of every task reachable from each project.
    /// Both directions of the task<->project relation are set here
    /// explicitly; entity construction alone does not link anything.
    pub async fn load(&self) -> Result<LoadedData, IngestError> {
        let export = self.load_raw().await?;

        let mut records: Vec<&RawProject> = Vec::new();
        for project in &export.projects {
            flatten_project_records(project, &mut records);
        }

        let mut projects: BTreeMap<String, Project> = records
            .iter()
            .map(|record| (record.id.clone(), Project::new(&record.id, &record.name)))
            .collect();

        let mut tasks: Vec<Task> = Vec::new();
        for record in &records {
            let direct = record.tasks.iter();
            let sectioned = record.sections.iter().flat_map(|s| s.tasks.iter());
            for raw in direct.chain(sectioned) {
                flatten_task(raw, &record.id, &mut tasks);
            }
        }

        for task in &mut tasks {
            match task.project.as_deref().and_then(|pid| projects.get_mut(pid)) {
                Some(project) => project.add_task(&task.id),
                None => task.project = None,
            }
        }

        debug!(
            tasks = tasks.len(),
            projects = projects.len(),
            labels = export.labels.len(),
            "normalized nested export"
        );

        Ok(LoadedData {
            tasks,
            projects: projects.into_values().collect(),
        })
    }
}

/// Collect every project record in the tree. Nesting is walked but the
/// parent/child structure is deliberately not rebuilt into the model.
fn flatten_project_records<'a>(record: &'a RawProject, out: &mut Vec<&'a RawProject>) {
    out.push(record);
    for child in &record.child_projects {
        flatten_project_records(child, out);
    }
}

/// Emit `raw` and all its sub-tasks, tagged with the owning project.
fn flatten_task(raw: &RawTask, project_id: &str, out: &mut Vec<Task>) {
    out.push(map_task(raw, project_id));
    for sub in &raw.sub_tasks {
        flatten_task(sub, project_id, out);
    }
}

fn map_task(raw: &RawTask, project_id: &str) -> Task {
    let status = if raw.is_completed.unwrap_or(false) {
        TaskStatus::Done
    } else {
        TaskStatus::Inbox
    };
    let due_date = raw
        .due
        .as_ref()
        .and_then(|due| due.datetime.as_deref().or(due.date.as_deref()))
        .and_then(parse_export_date);
    let creation_date = raw
        .created_at
        .as_deref()
        .and_then(parse_export_date)
        .unwrap_or_else(Utc::now);

    Task {
        id: raw.id.clone(),
        description: raw.content.clone(),
        notes: raw.description.clone().unwrap_or_default(),
        status,
        context: raw.labels.first().cloned(),
        due_date,
        quadrant: quadrant_from_priority(raw.priority),
        is_actionable: status != TaskStatus::Done,
        creation_date,
        project: Some(project_id.to_string()),
        next_action_for: Vec::new(),
    }
}

/// Map the export's 1-4 priority scale onto quadrants: 4 and 3 are
/// urgent and important, 2 is important but can wait, 1 is urgent
/// busywork, and no priority means neither. The calendar loader keeps
/// its own 0-10 table; the two scales are not interchangeable.
fn quadrant_from_priority(priority: Option<u8>) -> EisenhowerQuadrant {
    match priority {
        Some(3..=4) => EisenhowerQuadrant::UrgentImportant,
        Some(2) => EisenhowerQuadrant::NotUrgentImportant,
        Some(1) => EisenhowerQuadrant::UrgentNotImportant,
        _ => EisenhowerQuadrant::NotUrgentNotImportant,
    }
}
