//! Loaders that normalize external planning exports into the domain
//! model.
//!
//! Each loader validates its input against the matching schema first,
//! then maps the raw document into flat [`Task`]/[`Project`]
//! collections. Required files fail fast; optional files degrade to
//! empty output.

pub mod calendar;
pub mod todoist;

pub use calendar::CalendarLoader;
pub use todoist::TodoistLoader;

use crate::domain::{Project, Task};

/// Normalized output of one source loader.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    /// Flattened tasks from the source
    pub tasks: Vec<Task>,
    /// Projects from the source (empty for sources without projects)
    pub projects: Vec<Project>,
}

impl LoadedData {
    /// Append another source's output; both lists concatenate.
    pub fn merge(&mut self, other: LoadedData) {
        self.tasks.extend(other.tasks);
        self.projects.extend(other.projects);
    }
}
