use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CiboardError, Result};
use crate::providers::gitlab::{PipelineGateway, Project, ProjectRef};

const REGISTRY_FILE: &str = "projects.yaml";

/// Tracked GitLab project ids, persisted as a YAML document:
///
/// ```yaml
/// projects:
///   - 1234
///   - 5678
/// ```
///
/// The file is always rewritten as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub projects: Vec<u64>,
}

/// `<config dir>/ciboard/projects.yaml`, e.g. `~/.config/ciboard/projects.yaml` on Linux.
pub fn default_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| CiboardError::Config("No configuration directory found".into()))?;
    Ok(dir.join("ciboard").join(REGISTRY_FILE))
}

impl Registry {
    /// Loads the registry; a missing or empty file is an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No registry at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        debug!("Registry written to {}", path.display());
        Ok(())
    }

    /// Appends `id`; returns `false` when it was already tracked.
    pub fn add(&mut self, id: u64) -> bool {
        if self.projects.contains(&id) {
            return false;
        }
        self.projects.push(id);
        true
    }

    /// Removes the first entry equal to `id`; returns `false` when absent.
    pub fn remove(&mut self, id: u64) -> bool {
        match self.projects.iter().position(|p| *p == id) {
            Some(index) => {
                self.projects.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn project_refs(&self) -> Vec<ProjectRef> {
        self.projects.iter().copied().map(ProjectRef::Id).collect()
    }
}

/// Resolves a search string to exactly one project.
///
/// A single search hit is taken as is. With several hits, the one whose
/// name or full path equals `query` wins; otherwise the search is reported
/// as ambiguous.
pub async fn resolve_project<G: PipelineGateway>(gateway: &G, query: &str) -> Result<Project> {
    let matches = gateway.search_projects(query).await?;

    match matches.as_slice() {
        [] => Err(CiboardError::ProjectNotFound(query.to_string())),
        [only] => Ok(only.clone()),
        _ => {
            let exact: Vec<&Project> = matches
                .iter()
                .filter(|p| p.name == query || p.path_with_namespace == query)
                .collect();

            match exact.as_slice() {
                [one] => Ok((*one).clone()),
                _ => Err(CiboardError::AmbiguousProject {
                    query: query.to_string(),
                    candidates: matches
                        .iter()
                        .map(|p| format!("{} ({})", p.path_with_namespace, p.id))
                        .collect(),
                }),
            }
        }
    }
}

pub async fn add_project<G: PipelineGateway>(
    gateway: &G,
    path: &Path,
    query: &str,
) -> Result<Project> {
    let project = resolve_project(gateway, query).await?;

    let mut registry = Registry::load(path)?;
    if registry.add(project.id) {
        registry.save(path)?;
        info!("Tracking {} ({})", project.name, project.id);
    } else {
        warn!("{} ({}) is already tracked", project.name, project.id);
    }

    Ok(project)
}

pub async fn remove_project<G: PipelineGateway>(
    gateway: &G,
    path: &Path,
    query: &str,
) -> Result<Project> {
    let project = resolve_project(gateway, query).await?;

    let mut registry = Registry::load(path)?;
    if registry.remove(project.id) {
        info!("No longer tracking {} ({})", project.name, project.id);
    } else {
        warn!("{} ({}) was not tracked", project.name, project.id);
    }
    registry.save(path)?;

    Ok(project)
}
