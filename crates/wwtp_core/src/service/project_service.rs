//! Project use-case service.
//!
//! # Responsibility
//! - Provide create/update/activate/delete entry points for projects.
//! - Log project lifecycle events.
//!
//! # Invariants
//! - At most one project is active; activation goes through the repository.
//! - The first project created into an empty store becomes active.

use crate::model::project::{Project, ProjectDraft, ProjectId};
use crate::repo::error::RepoResult;
use crate::repo::project_repo::ProjectRepository;
use crate::service::log_outcome;
use log::info;
use std::time::Instant;

const MODULE: &str = "project";

/// Project service facade over repository implementations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one project.
    ///
    /// # Errors
    /// - `Validation` when the name is blank.
    /// - `Conflict` when the job number is already used.
    pub fn create_project(&self, draft: &ProjectDraft) -> RepoResult<Project> {
        let started_at = Instant::now();
        let result = self.repo.create_project(draft);
        log_outcome("project_create", MODULE, started_at, &result);
        if let Ok(project) = &result {
            if project.is_active {
                info!(
                    "event=project_activate module={MODULE} status=ok reason=first_project project_id={}",
                    project.id
                );
            }
        }
        result
    }

    /// Replaces the editable fields of one project; the active flag is kept.
    pub fn update_project(&self, id: ProjectId, draft: &ProjectDraft) -> RepoResult<Project> {
        let started_at = Instant::now();
        let result = self.repo.update_project(id, draft);
        log_outcome("project_update", MODULE, started_at, &result);
        result
    }

    /// Makes `id` the only active project.
    pub fn set_active_project(&self, id: ProjectId) -> RepoResult<Project> {
        let started_at = Instant::now();
        let result = self.repo.set_active_project(id);
        log_outcome("project_activate", MODULE, started_at, &result);
        result
    }

    pub fn active_project(&self) -> RepoResult<Option<Project>> {
        self.repo.active_project()
    }

    pub fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        self.repo.get_project(id)
    }

    /// Lists projects in creation order.
    pub fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.repo.list_projects()
    }

    /// Deletes a project and its equipment instances.
    ///
    /// Returns how many instances were removed with it. Catalog rows and
    /// quotes are left alone. Deleting the active project leaves no project
    /// active.
    pub fn delete_project(&self, id: ProjectId) -> RepoResult<usize> {
        let started_at = Instant::now();
        let result = self.repo.delete_project(id);
        log_outcome("project_delete", MODULE, started_at, &result);
        if let Ok(removed) = &result {
            info!(
                "event=project_delete_cascade module={MODULE} status=ok instances_removed={removed}"
            );
        }
        result
    }
}
