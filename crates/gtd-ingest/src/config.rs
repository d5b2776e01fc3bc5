//! Configuration for the ingestion pipeline.
//!
//! Loaded from a TOML file when one exists, with defaults matching the
//! exporter layout otherwise. Every component receives its paths
//! explicitly through a constructor; nothing here is global state.

use crate::aggregator::SourceAggregator;
use crate::errors::IngestError;
use crate::loaders::{CalendarLoader, TodoistLoader};
use crate::schema::SchemaValidator;
use crate::storage::JsonStore;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File paths the pipeline operates on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory holding the JSON schema documents.
    pub schema_dir: PathBuf,
    /// Nested project/task export (required input).
    pub todoist_export: PathBuf,
    /// Calendar events export (required input).
    pub calendar_events: PathBuf,
    /// Native calendar tasks export (optional input).
    pub calendar_tasks: PathBuf,
    /// Root directory of the keyed JSON store.
    pub data_dir: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schemas"),
            todoist_export: PathBuf::from("exports/todoist_export.json"),
            calendar_events: PathBuf::from("exports/calendar_events.json"),
            calendar_tasks: PathBuf::from("exports/calendar_tasks.json"),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl IngestConfig {
    /// Load configuration from a TOML file, falling back to defaults
    /// when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|source| IngestError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Schema validator over the configured schema directory.
    pub fn validator(&self) -> SchemaValidator {
        SchemaValidator::new(&self.schema_dir)
    }

    /// Loader for the nested export.
    pub fn todoist_loader(&self) -> TodoistLoader {
        TodoistLoader::new(&self.todoist_export, self.validator())
    }

    /// Loader for the calendar export pair.
    pub fn calendar_loader(&self) -> CalendarLoader {
        CalendarLoader::new(&self.calendar_events, &self.calendar_tasks, self.validator())
    }

    /// Keyed store over the configured data directory.
    pub fn store(&self) -> JsonStore {
        JsonStore::new(&self.data_dir)
    }

    /// Combined read-only view over both sources.
    pub fn aggregator(&self) -> SourceAggregator {
        SourceAggregator::new(self.todoist_loader(), self.calendar_loader())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = IngestConfig::load("/nonexistent/ingest.toml").unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("schemas"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ingest.toml");
        fs::write(&path, "data_dir = \"/var/lib/gtd\"\n").unwrap();

        let config = IngestConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/gtd"));
        assert_eq!(config.schema_dir, PathBuf::from("schemas"));
    }

    #[test]
    fn invalid_toml_is_a_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ingest.toml");
        fs::write(&path, "data_dir = [broken").unwrap();

        assert!(matches!(
            IngestConfig::load(&path),
            Err(IngestError::ConfigParse { .. })
        ));
    }
}
