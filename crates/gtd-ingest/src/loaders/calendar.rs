//! Loader for the calendar events/tasks export pair.
//!
//! Two independently optional-on-disk files are read concurrently, but
//! their failure policy differs on purpose: the events file is required
//! (its errors propagate), while the native tasks file degrades to an
//! empty list with a logged warning. This loader never produces
//! projects.

use crate::domain::{parse_export_date, EisenhowerQuadrant, Task, TaskStatus};
use crate::errors::IngestError;
use crate::loaders::LoadedData;
use crate::schema::SchemaValidator;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Schema for the events document.
pub const EVENTS_SCHEMA: &str = "gcal_events_schema";
/// Schema for the native tasks document.
pub const TASKS_SCHEMA: &str = "gcal_tasks_schema";

/// Substrings that mark an event as something to act on rather than
/// just attend. Matched case-insensitively against title+description.
const ACTION_KEYWORDS: &[&str] = &[
    "todo", "task", "action", "call", "email", "review", "prepare", "submit", "pay", "buy", "fix",
    "book",
];

/// A calendar event as exported.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    /// confirmed, tentative, or cancelled
    #[serde(default = "default_event_status")]
    pub status: String,
    #[serde(default)]
    pub start: Option<RawEventTime>,
    #[serde(default)]
    pub end: Option<RawEventTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    /// RRULE/EXDATE strings when the event recurs
    #[serde(default)]
    pub recurrence: Option<Vec<String>>,
}

fn default_event_status() -> String {
    "confirmed".to_string()
}

/// Start/end marker: a bare date for all-day events, or a datetime with
/// timezone.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEventTime {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "dateTime")]
    pub date_time: Option<String>,
    #[serde(default, rename = "timeZone")]
    pub time_zone: Option<String>,
}

impl RawEventTime {
    fn as_export_date(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// A native calendar task, with its own 0-10 priority scale.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCalendarTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 0 (none) to 10 (highest)
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Reads and normalizes the events and native-tasks exports.
#[derive(Debug, Clone)]
pub struct CalendarLoader {
    events_path: PathBuf,
    tasks_path: PathBuf,
    validator: SchemaValidator,
}

impl CalendarLoader {
    /// Create a loader over the two export files.
    pub fn new(
        events_path: impl AsRef<Path>,
        tasks_path: impl AsRef<Path>,
        validator: SchemaValidator,
    ) -> Self {
        Self {
            events_path: events_path.as_ref().to_path_buf(),
            tasks_path: tasks_path.as_ref().to_path_buf(),
            validator,
        }
    }

    /// Load both files concurrently and merge their task lists.
    ///
    /// The events branch propagates its error; the native-tasks branch
    /// never does. Neither branch can abort the other.
    pub async fn load(&self) -> Result<LoadedData, IngestError> {
        let (events, native) = tokio::join!(self.load_events(), self.load_native_tasks());
        let mut tasks = events?;
        tasks.extend(native);
        Ok(LoadedData {
            tasks,
            // This source has no notion of projects.
            projects: Vec::new(),
        })
    }

    async fn load_events(&self) -> Result<Vec<Task>, IngestError> {
        let document = self.read_document(&self.events_path).await?;
        let report = self.validator.validate_data(&document, EVENTS_SCHEMA);
        if !report.valid {
            return Err(IngestError::Validation {
                path: self.events_path.clone(),
                errors: report.errors,
            });
        }

        let events = collect_events(document).map_err(|source| IngestError::FileParse {
            path: self.events_path.clone(),
            source,
        })?;

        let tasks: Vec<Task> = events
            .iter()
            .filter(|event| event.status != "cancelled")
            .map(task_from_event)
            .collect();
        debug!(events = events.len(), tasks = tasks.len(), "normalized events export");
        Ok(tasks)
    }

    /// Optional input: every failure becomes an empty list.
    async fn load_native_tasks(&self) -> Vec<Task> {
        match self.try_load_native_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    path = %self.tasks_path.display(),
                    error = %err,
                    "calendar tasks unavailable, continuing without them"
                );
                Vec::new()
            }
        }
    }

    async fn try_load_native_tasks(&self) -> Result<Vec<Task>, IngestError> {
        let document = self.read_document(&self.tasks_path).await?;
        let report = self.validator.validate_data(&document, TASKS_SCHEMA);
        if !report.valid {
            return Err(IngestError::Validation {
                path: self.tasks_path.clone(),
                errors: report.errors,
            });
        }
        let raw: Vec<RawCalendarTask> =
            serde_json::from_value(document).map_err(|source| IngestError::FileParse {
                path: self.tasks_path.clone(),
                source,
            })?;
        Ok(raw.iter().map(task_from_native).collect())
    }

    async fn read_document(&self, path: &Path) -> Result<Value, IngestError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(IngestError::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&contents).map_err(|source| IngestError::FileParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The events export comes in two shapes: a calendar-name -> event
/// array map, or a bare event array.
fn collect_events(document: Value) -> Result<Vec<RawEvent>, serde_json::Error> {
    match document {
        Value::Object(map) => {
            let mut events = Vec::new();
            for (_, value) in map {
                events.extend(serde_json::from_value::<Vec<RawEvent>>(value)?);
            }
            Ok(events)
        }
        other => serde_json::from_value(other),
    }
}

fn task_from_event(event: &RawEvent) -> Task {
    let notes = event.description.clone().unwrap_or_default();
    let due_date = event
        .end
        .as_ref()
        .or(event.start.as_ref())
        .and_then(RawEventTime::as_export_date)
        .and_then(parse_export_date);
    let creation_date = event
        .created
        .as_deref()
        .and_then(parse_export_date)
        .unwrap_or_else(Utc::now);

    Task {
        id: event.id.clone(),
        description: event.summary.clone(),
        notes: notes.clone(),
        status: TaskStatus::Inbox,
        context: event.location.clone(),
        due_date,
        // Every event lands in the same bucket on purpose; content-based
        // scoring belongs to the downstream pipeline, not the loader.
        quadrant: EisenhowerQuadrant::NotUrgentImportant,
        is_actionable: looks_actionable(&event.summary, &notes),
        creation_date,
        project: None,
        next_action_for: Vec::new(),
    }
}

fn task_from_native(raw: &RawCalendarTask) -> Task {
    let status = match raw.status.as_deref() {
        Some("completed") => TaskStatus::Done,
        Some("cancelled") => TaskStatus::Cancelled,
        _ => TaskStatus::Inbox,
    };
    let due_date = raw.due_date.as_deref().and_then(parse_export_date);
    let creation_date = raw
        .start_date
        .as_deref()
        .and_then(parse_export_date)
        .unwrap_or_else(Utc::now);

    Task {
        id: raw.id.clone(),
        description: raw.title.clone(),
        notes: raw.description.clone().unwrap_or_default(),
        status,
        context: raw.location.clone().or_else(|| raw.tags.first().cloned()),
        due_date,
        quadrant: quadrant_from_native_priority(raw.priority),
        is_actionable: !matches!(status, TaskStatus::Done | TaskStatus::Cancelled),
        creation_date,
        project: None,
        next_action_for: Vec::new(),
    }
}

fn looks_actionable(title: &str, description: &str) -> bool {
    let haystack = format!("{} {}", title, description).to_lowercase();
    ACTION_KEYWORDS
        .iter()
        .any(|keyword| haystack.contains(keyword))
}

/// Map the 0-10 native priority scale onto quadrants: 8-10 urgent and
/// important, 5-7 important, 2-4 urgent busywork, 0-1 (or absent)
/// neither. Deliberately separate from the nested export's 1-4 table.
fn quadrant_from_native_priority(priority: Option<u8>) -> EisenhowerQuadrant {
    match priority {
        Some(8..=10) => EisenhowerQuadrant::UrgentImportant,
        Some(5..=7) => EisenhowerQuadrant::NotUrgentImportant,
        Some(2..=4) => EisenhowerQuadrant::UrgentNotImportant,
        _ => EisenhowerQuadrant::NotUrgentNotImportant,
    }
}
