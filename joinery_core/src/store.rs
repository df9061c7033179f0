//! Project storage.
//!
//! [`ProjectStore`] is the seam a persistence backend plugs into. The crate
//! ships an in-memory implementation; `.jnr` files are handled separately by
//! [`crate::file_io`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{JoineryError, JoineryResult};
use crate::module::Module;
use crate::project::{Project, ProjectSettings, ProjectStatus, RoomDimensions};

/// Fields needed to create a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub designer: String,
    #[serde(default)]
    pub room: Option<RoomDimensions>,
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, designer: impl Into<String>) -> Self {
        NewProject {
            name: name.into(),
            designer: designer.into(),
            ..NewProject::default()
        }
    }
}

/// Partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub designer: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub room: Option<RoomDimensions>,
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
    #[serde(default)]
    pub modules: Option<Vec<Module>>,
}

impl ProjectPatch {
    /// Checked before anything is applied, so a rejected patch changes nothing.
    fn validate(&self) -> JoineryResult<()> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(JoineryError::missing_field("name"));
        }
        if let Some(settings) = &self.settings {
            settings.pricing.validate()?;
        }
        Ok(())
    }

    fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.meta.name = name;
        }
        if let Some(designer) = self.designer {
            project.meta.designer = designer;
        }
        if let Some(status) = self.status {
            project.meta.status = status;
        }
        if let Some(room) = self.room {
            project.room = room;
        }
        if let Some(settings) = self.settings {
            project.settings = settings;
        }
        if let Some(modules) = self.modules {
            project.modules = modules;
        }
        project.touch();
    }
}

pub trait ProjectStore {
    fn get_project_by_id(&self, id: &Uuid) -> Option<Project>;

    /// # Errors
    ///
    /// `MissingField` for a blank name, `InvalidInput` for out-of-range
    /// pricing settings.
    fn create_project(&self, new: NewProject) -> JoineryResult<Project>;

    /// # Errors
    ///
    /// - `ProjectNotFound` when no project has this id
    /// - `MissingField` when the patch blanks the name
    /// - `InvalidInput` when the patched pricing settings are out of range
    fn update_project(&self, id: &Uuid, patch: ProjectPatch) -> JoineryResult<Project>;

    /// Returns false when nothing was deleted.
    fn delete_project(&self, id: &Uuid) -> bool;

    /// All projects, oldest first.
    fn list_projects(&self) -> Vec<Project>;
}

/// Process-local store, shareable across threads by cloning.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectStore {
    projects: Arc<Mutex<HashMap<Uuid, Project>>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A poisoned lock still guards consistent data: every write is a single insert or remove.
    fn guard(&self) -> MutexGuard<'_, HashMap<Uuid, Project>> {
        self.projects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn get_project_by_id(&self, id: &Uuid) -> Option<Project> {
        self.guard().get(id).cloned()
    }

    fn create_project(&self, new: NewProject) -> JoineryResult<Project> {
        if new.name.trim().is_empty() {
            return Err(JoineryError::missing_field("name"));
        }
        if let Some(settings) = &new.settings {
            settings.pricing.validate()?;
        }

        let mut project = Project::new(new.name, new.designer);
        if let Some(room) = new.room {
            project.room = room;
        }
        if let Some(settings) = new.settings {
            project.settings = settings;
        }

        debug!(project = %project.id(), "project created");
        self.guard().insert(project.id(), project.clone());
        Ok(project)
    }

    fn update_project(&self, id: &Uuid, patch: ProjectPatch) -> JoineryResult<Project> {
        let mut guard = self.guard();
        let project = guard.get_mut(id).ok_or_else(|| JoineryError::project_not_found(id))?;
        patch.validate()?;
        patch.apply(project);
        Ok(project.clone())
    }

    fn delete_project(&self, id: &Uuid) -> bool {
        self.guard().remove(id).is_some()
    }

    fn list_projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.guard().values().cloned().collect();
        projects.sort_by(|a, b| a.meta.created.cmp(&b.meta.created).then(a.id().cmp(&b.id())));
        projects
    }
}
