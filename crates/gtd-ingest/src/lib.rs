//! Ingestion core for heterogeneous planning-tool exports.
//!
//! Validates a nested Todoist-style project/task export and a Google
//! Calendar events/tasks export against their JSON schemas, normalizes
//! both into one task/project model, and persists that model as keyed
//! JSON documents with referential integrity restored on reload.
//!
//! The downstream classification/routing pipeline consumes the
//! [`Task`]/[`Project`] values this crate produces; the exporter
//! processes that write the input files live elsewhere.

pub mod aggregator;
pub mod config;
pub mod domain;
pub mod errors;
pub mod loaders;
pub mod schema;
pub mod storage;

// Re-export commonly used types
pub use aggregator::SourceAggregator;
pub use config::IngestConfig;
pub use domain::{
    DataSet, EisenhowerQuadrant, Project, ProjectStatus, ReferenceGap, Task, TaskStatus,
};
pub use errors::IngestError;
pub use loaders::{CalendarLoader, LoadedData, TodoistLoader};
pub use schema::{SchemaValidator, ValidationReport};
pub use storage::{DocumentStore, JsonStore, PROJECTS_KEY, TASKS_KEY};
