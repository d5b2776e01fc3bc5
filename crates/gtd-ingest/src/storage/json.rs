//! JSON file-backed keyed store.
//!
//! One document per key, stored as `<key>.json` under a configurable
//! root directory that is created recursively on first write.

use crate::domain::DataSet;
use crate::errors::IngestError;
use crate::storage::records::{ProjectRecord, TaskRecord};
use crate::storage::{DocumentStore, PROJECTS_KEY, TASKS_KEY};
use crate::{Project, Task};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Keyed JSON store plus typed task/project persistence.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at `root`. Nothing is touched on disk
    /// until the first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn write_json<T: Serialize>(&self, key: &str, data: &T) -> Result<(), IngestError> {
        fs::create_dir_all(&self.root)?;
        let json =
            serde_json::to_string_pretty(data).map_err(|source| IngestError::Serialize {
                key: key.to_string(),
                source,
            })?;

        // Atomic write: write to temp file, then rename.
        let path = self.key_path(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Total read: absent, unreadable, and unparseable documents all
    /// come back as `None` (the latter two logged).
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.key_path(key);
        if !path.exists() {
            return None;
        }
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                error!(key, error = %err, "failed to read store document");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(key, error = %err, "failed to parse store document");
                None
            }
        }
    }

    /// Persist the full task collection under its well-known key.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), IngestError> {
        let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
        self.write_json(TASKS_KEY, &records)
    }

    /// Persist the full project collection under its well-known key.
    pub fn save_projects(&self, projects: &[Project]) -> Result<(), IngestError> {
        let records: Vec<ProjectRecord> = projects.iter().map(ProjectRecord::from).collect();
        self.write_json(PROJECTS_KEY, &records)
    }

    /// Load the task collection, re-hydrating date fields. Empty on any
    /// failure.
    pub fn load_tasks(&self) -> Vec<Task> {
        self.read_json::<Vec<TaskRecord>>(TASKS_KEY)
            .map(|records| records.into_iter().map(TaskRecord::into_task).collect())
            .unwrap_or_default()
    }

    /// Load the project collection, re-hydrating date fields. Empty on
    /// any failure.
    pub fn load_projects(&self) -> Vec<Project> {
        self.read_json::<Vec<ProjectRecord>>(PROJECTS_KEY)
            .map(|records| records.into_iter().map(ProjectRecord::into_project).collect())
            .unwrap_or_default()
    }

    /// Persist both collections of a data set.
    pub fn save_all(&self, set: &DataSet) -> Result<(), IngestError> {
        let tasks: Vec<Task> = set.tasks.values().cloned().collect();
        let projects: Vec<Project> = set.projects.values().cloned().collect();
        self.save_tasks(&tasks)?;
        self.save_projects(&projects)
    }

    /// Load both collections independently and resolve every
    /// cross-reference over the fully materialized maps.
    ///
    /// Total and idempotent: dangling references are logged and
    /// dropped, never surfaced as failures, no matter how many there
    /// are.
    pub fn load_all(&self) -> DataSet {
        let mut set = DataSet::from_parts(self.load_tasks(), self.load_projects());
        for gap in set.reconcile() {
            warn!(
                from = %gap.from,
                to = %gap.to,
                field = gap.field,
                "dropping dangling reference"
            );
        }
        set
    }
}

impl DocumentStore for JsonStore {
    async fn save(&self, key: &str, value: &Value) -> Result<(), IngestError> {
        self.write_json(key, value)
    }

    async fn load(&self, key: &str) -> Option<Value> {
        self.read_json(key)
    }

    async fn delete(&self, key: &str) -> Result<(), IngestError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_keys(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "failed to list store directory");
                return Vec::new();
            }
        };
        let mut keys: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        keys.sort();
        keys
    }
}
