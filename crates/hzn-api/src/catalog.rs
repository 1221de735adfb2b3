use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use hzn_common::{Project, ProjectId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory view of the merged project metadata table. The core ranks by
/// id only; this catalog supplies the display columns the dashboard joins
/// against, and is read once at startup.
pub struct ProjectCatalog {
    by_id: HashMap<ProjectId, Project>,
}

impl ProjectCatalog {
    /// Load from a JSON array of project rows (`project_merged.json`).
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        let projects: Vec<Project> = serde_json::from_str(&raw)?;
        Ok(Self::from_projects(projects))
    }

    pub fn from_projects(projects: Vec<Project>) -> Self {
        let mut by_id = HashMap::with_capacity(projects.len());
        for project in projects {
            if let Some(previous) = by_id.insert(project.project_id, project) {
                warn!(
                    project_id = previous.project_id,
                    "duplicate project row in metadata catalog; keeping the later one"
                );
            }
        }
        Self { by_id }
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: ProjectId, title: &str) -> Project {
        Project {
            project_id: id,
            title: Some(title.into()),
            ..Project::default()
        }
    }

    #[test]
    fn lookup_by_id() {
        let catalog =
            ProjectCatalog::from_projects(vec![project(1, "alpha"), project(2, "beta")]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(2).unwrap().title.as_deref(), Some("beta"));
        assert!(catalog.get(3).is_none());
    }

    #[test]
    fn later_duplicate_rows_win() {
        let catalog =
            ProjectCatalog::from_projects(vec![project(1, "old"), project(1, "new")]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(1).unwrap().title.as_deref(), Some("new"));
    }

    #[test]
    fn parses_dataset_column_names() {
        let raw = r#"[{"projectID": 101069207, "title": "T", "fundingScheme": "HORIZON-RIA", "totalCost": 1000.0}]"#;
        let projects: Vec<Project> = serde_json::from_str(raw).unwrap();
        let catalog = ProjectCatalog::from_projects(projects);

        let row = catalog.get(101069207).unwrap();
        assert_eq!(row.funding_scheme.as_deref(), Some("HORIZON-RIA"));
        assert_eq!(row.total_cost, Some(1000.0));
    }
}
