//! Project persistence.
//!
//! Projects are stored one per file as pretty JSON under
//! `<data_dir>/projects/<id>.json`. A file is validated in full before it is
//! handed out, so a corrupt project is rejected whole and never partially
//! applied.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::document::{Phase, Project, ValidationError};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to save or load a project.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Project file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Project {id} is inconsistent: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ValidationError,
    },

    #[error("No project with id {0}")]
    NotFound(String),

    #[error("Invalid project id: {0}")]
    InvalidId(String),

    #[error("Failed to encode project: {0}")]
    Encode(String),
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

/// Listing entry for a saved project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub phase: Phase,
    pub activity_timestamp: DateTime<Utc>,
}

impl ProjectSummary {
    fn of(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title().to_string(),
            phase: project.phase,
            activity_timestamp: project.activity_timestamp,
        }
    }
}

/// File-backed project store.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    /// A store rooted at `data_dir`. Nothing is created until the first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { root: data_dir.into().join("projects") }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> StoreResult<PathBuf> {
        let safe = !id.is_empty()
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }

    /// Write the full project.
    pub fn save(&self, project: &Project) -> StoreResult<PathBuf> {
        let path = self.path_for(&project.id)?;
        let content = serde_json::to_string_pretty(project)
            .map_err(|e| StoreError::Encode(e.to_string()))?;

        fs::create_dir_all(&self.root)
            .map_err(|source| StoreError::Io { path: self.root.clone(), source })?;
        fs::write(&path, content).map_err(|source| StoreError::Io { path: path.clone(), source })?;

        tracing::debug!(id = %project.id, path = %path.display(), "Saved project");
        Ok(path)
    }

    /// Load and validate a project.
    pub fn load(&self, id: &str) -> StoreResult<Project> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let project = Self::read_file(&path)?;
        tracing::debug!(id = %project.id, phase = %project.phase, "Loaded project");
        Ok(project)
    }

    /// Parse and validate one project file.
    pub fn read_file(path: &Path) -> StoreResult<Project> {
        let content = fs::read_to_string(path)
            .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        let project: Project = serde_json::from_str(&content)
            .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })?;
        project
            .validate()
            .map_err(|source| StoreError::Invalid { id: project.id.clone(), source })?;
        Ok(project)
    }

    /// Delete a saved project.
    pub fn remove(&self, id: &str) -> StoreResult<()> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(&path).map_err(|source| StoreError::Io { path, source })
    }

    /// Most recently active projects first. Unreadable files are skipped.
    pub fn recent(&self, limit: usize) -> StoreResult<Vec<ProjectSummary>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: self.root.clone(), source }),
        };

        let mut summaries: Vec<ProjectSummary> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| match Self::read_file(&path) {
                Ok(project) => Some(ProjectSummary::of(&project)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable project");
                    None
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.activity_timestamp.cmp(&a.activity_timestamp).then_with(|| a.id.cmp(&b.id))
        });
        summaries.truncate(limit);
        Ok(summaries)
    }
}

/// Render a project in an export format.
pub fn export(project: &Project, format: ExportFormat) -> StoreResult<String> {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(project).map_err(|e| StoreError::Encode(e.to_string()))
        }
        ExportFormat::Yaml => {
            serde_yaml::to_string(project).map_err(|e| StoreError::Encode(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn store() -> (TempDir, ProjectStore) {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = store();
        let mut project = Project::default();
        project.profile.business_name = "Acme".into();
        project.set_departments(vec!["Sales".into()]).unwrap();

        store.save(&project).unwrap();
        let loaded = store.load(&project.id).unwrap();
        assert_eq!(loaded, project);
    }

    #[test]
    fn test_missing_project() {
        let (_dir, store) = store();
        assert!(matches!(store.load("nope"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.load("../etc"), Err(StoreError::InvalidId(_))));
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let (_dir, store) = store();
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.root().join("bad.json"), "{ not json").unwrap();
        assert!(matches!(store.load("bad"), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_inconsistent_project_is_rejected() {
        let (_dir, store) = store();
        let mut project = Project::default();
        project.set_departments(vec!["Sales".into()]).unwrap();
        project.departments.push(project.departments[0].clone());
        store.save(&project).unwrap();

        assert!(matches!(store.load(&project.id), Err(StoreError::Invalid { .. })));
    }

    #[test]
    fn test_recent_orders_by_activity() {
        let (_dir, store) = store();
        let now = Utc::now();
        let mut ids = Vec::new();
        for age in [3, 1, 2, 5] {
            let mut project = Project::default();
            project.activity_timestamp = now - Duration::minutes(age);
            store.save(&project).unwrap();
            ids.push((age, project.id));
        }
        fs::write(store.root().join("junk.json"), "[]").unwrap();

        let recent = store.recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        ids.sort();
        let expected: Vec<_> = ids.iter().take(3).map(|(_, id)| id.clone()).collect();
        let actual: Vec<_> = recent.into_iter().map(|s| s.id).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_recent_without_directory() {
        let (_dir, store) = store();
        assert!(store.recent(3).unwrap().is_empty());
    }

    #[test]
    fn test_export_yaml() {
        let mut project = Project::default();
        project.profile.business_name = "Acme".into();
        let yaml = export(&project, ExportFormat::Yaml).unwrap();
        assert!(yaml.contains("businessName: Acme"));
    }
}
