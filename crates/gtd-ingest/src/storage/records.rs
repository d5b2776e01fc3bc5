//! Serialized forms of tasks and projects.
//!
//! Date fields are persisted as RFC3339 strings and re-parsed on load,
//! keeping the on-disk documents readable by the other consumers of the
//! store. An unparseable date degrades the field instead of failing the
//! collection.

use crate::domain::{
    parse_export_date, EisenhowerQuadrant, Project, ProjectStatus, Task, TaskStatus,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// On-disk form of a [`Task`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub notes: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    pub quadrant: EisenhowerQuadrant,
    pub is_actionable: bool,
    pub creation_date: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub next_action_for: Vec<String>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            description: task.description.clone(),
            notes: task.notes.clone(),
            status: task.status,
            context: task.context.clone(),
            due_date: task.due_date.map(|d| d.to_rfc3339()),
            quadrant: task.quadrant,
            is_actionable: task.is_actionable,
            creation_date: task.creation_date.to_rfc3339(),
            project: task.project.clone(),
            next_action_for: task.next_action_for.clone(),
        }
    }
}

impl TaskRecord {
    /// Rebuild the typed task, re-parsing the stored date strings.
    pub fn into_task(self) -> Task {
        let creation_date = parse_export_date(&self.creation_date).unwrap_or_else(|| {
            warn!(task = %self.id, "unparseable creation date in store, defaulting to now");
            Utc::now()
        });
        let due_date = match self.due_date.as_deref() {
            Some(raw) => {
                let parsed = parse_export_date(raw);
                if parsed.is_none() {
                    warn!(task = %self.id, value = raw, "dropping unparseable due date");
                }
                parsed
            }
            None => None,
        };

        Task {
            id: self.id,
            description: self.description,
            notes: self.notes,
            status: self.status,
            context: self.context,
            due_date,
            quadrant: self.quadrant,
            is_actionable: self.is_actionable,
            creation_date,
            project: self.project,
            next_action_for: self.next_action_for,
        }
    }
}

/// On-disk form of a [`Project`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub outcome: String,
    pub status: ProjectStatus,
    pub creation_date: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            outcome: project.outcome.clone(),
            status: project.status,
            creation_date: project.creation_date.to_rfc3339(),
            tasks: project.tasks.clone(),
        }
    }
}

impl ProjectRecord {
    /// Rebuild the typed project, re-parsing the stored date string.
    pub fn into_project(self) -> Project {
        let creation_date = parse_export_date(&self.creation_date).unwrap_or_else(|| {
            warn!(project = %self.id, "unparseable creation date in store, defaulting to now");
            Utc::now()
        });
        Project {
            id: self.id,
            name: self.name,
            outcome: self.outcome,
            status: self.status,
            creation_date,
            tasks: self.tasks,
        }
    }
}
