//! Typed errors for the ingestion core.
//!
//! The boundary contract is uniform: entry points that read a *required*
//! input return `Result<_, IngestError>` and fail fast, while operations
//! documented as total (schema validation, persistence reads, optional
//! files) swallow failures into empty results and log them instead of
//! surfacing an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the schema validator, the loaders, and the
/// storage layer's write paths.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The named schema file does not exist in the schema directory.
    #[error("schema file not found: {}", path.display())]
    SchemaNotFound {
        /// Full path that was probed
        path: PathBuf,
    },

    /// The schema file exists but is not valid JSON.
    #[error("schema '{name}' is not valid JSON: {source}")]
    SchemaParse {
        /// Schema name as requested by the caller
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A required export file failed schema validation.
    ///
    /// The display form concatenates every field-level message so a
    /// single log line is enough to diagnose the rejected file.
    #[error("validation failed for {}: {}", path.display(), errors.join("; "))]
    Validation {
        /// The file that was rejected
        path: PathBuf,
        /// One entry per validator finding, each carrying its location
        errors: Vec<String>,
    },

    /// A required input file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// The missing file
        path: PathBuf,
    },

    /// A required input file exists but could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    FileParse {
        /// The unparseable file
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file exists but is not valid TOML.
    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        /// The configuration file
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value could not be serialized for persistence.
    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        /// Store key the value was headed for
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Underlying filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
