//! Read-only caching facade over both source loaders.
//!
//! The first access to any accessor triggers one combined load: both
//! loaders run concurrently, each branch guarded so that a failing
//! source contributes nothing instead of aborting the other. The merged
//! result is cached for the life of the process; this is a single-shot
//! batch read, not a live sync.

use crate::errors::IngestError;
use crate::loaders::{CalendarLoader, LoadedData, TodoistLoader};
use crate::storage::{DocumentStore, PROJECTS_KEY, TASKS_KEY};
use crate::{Project, Task};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, warn};

/// Combined, cached view over the nested and calendar sources.
#[derive(Debug)]
pub struct SourceAggregator {
    todoist: TodoistLoader,
    calendar: CalendarLoader,
    cache: OnceCell<LoadedData>,
}

impl SourceAggregator {
    /// Create the facade over the two loaders. Nothing is read until
    /// the first accessor call.
    pub fn new(todoist: TodoistLoader, calendar: CalendarLoader) -> Self {
        Self {
            todoist,
            calendar,
            cache: OnceCell::new(),
        }
    }

    /// Run both loaders once, concurrently, and cache the merged
    /// result. A failed source logs and contributes an empty slice.
    async fn combined(&self) -> &LoadedData {
        self.cache
            .get_or_init(|| async {
                let (todoist, calendar) =
                    tokio::join!(self.todoist.load(), self.calendar.load());
                let mut merged = LoadedData::default();
                match todoist {
                    Ok(data) => merged.merge(data),
                    Err(err) => {
                        error!(error = %err, "nested export load failed, continuing without it")
                    }
                }
                match calendar {
                    Ok(data) => merged.merge(data),
                    Err(err) => {
                        error!(error = %err, "calendar export load failed, continuing without it")
                    }
                }
                merged
            })
            .await
    }

    /// All tasks from both sources, loading on first call.
    pub async fn tasks(&self) -> &[Task] {
        &self.combined().await.tasks
    }

    /// All projects (the calendar source contributes none).
    pub async fn projects(&self) -> &[Project] {
        &self.combined().await.projects
    }
}

impl DocumentStore for SourceAggregator {
    /// Rejected: the facade never writes. Logged, not an error.
    async fn save(&self, key: &str, _value: &Value) -> Result<(), IngestError> {
        warn!(key, "source aggregator is read-only, ignoring save");
        Ok(())
    }

    async fn load(&self, key: &str) -> Option<Value> {
        let data = self.combined().await;
        match key {
            TASKS_KEY => serde_json::to_value(&data.tasks).ok(),
            PROJECTS_KEY => serde_json::to_value(&data.projects).ok(),
            _ => None,
        }
    }

    /// Rejected for the same reason as `save`.
    async fn delete(&self, key: &str) -> Result<(), IngestError> {
        warn!(key, "source aggregator is read-only, ignoring delete");
        Ok(())
    }

    async fn list_keys(&self) -> Vec<String> {
        vec![TASKS_KEY.to_string(), PROJECTS_KEY.to_string()]
    }
}
