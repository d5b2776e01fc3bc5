//! Persistence for the normalized model.
//!
//! A generic keyed JSON store plus typed task/project persistence.
//! Read paths are total: any failure degrades to an empty result and a
//! log line, so a corrupt store never takes the process down. Writes
//! are atomic (temp file then rename).

pub mod json;
pub mod records;

pub use json::JsonStore;
pub use records::{ProjectRecord, TaskRecord};

use crate::errors::IngestError;
use serde_json::Value;

/// Well-known key for the persisted task collection.
pub const TASKS_KEY: &str = "tasks";
/// Well-known key for the persisted project collection.
pub const PROJECTS_KEY: &str = "projects";

/// Generic keyed JSON document access, shared by the storage service
/// and the read-only source aggregator.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Serialize and overwrite the document stored under `key`.
    async fn save(&self, key: &str, value: &Value) -> Result<(), IngestError>;

    /// Load the document under `key`. `None` when absent, or on any
    /// read/parse failure, which is logged rather than surfaced.
    async fn load(&self, key: &str) -> Option<Value>;

    /// Remove the document under `key`; a missing document is a no-op.
    async fn delete(&self, key: &str) -> Result<(), IngestError>;

    /// Base names (no extension) of every stored document. Empty when
    /// the backing directory cannot be read.
    async fn list_keys(&self) -> Vec<String>;
}
