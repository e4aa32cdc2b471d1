//! Project equipment use-case service.
//!
//! # Responsibility
//! - Add, classify, edit and remove tagged equipment inside a project.
//! - Link and unlink vendor quotes.
//! - Serve the instance + catalog + price join used by exports.
//!
//! # Invariants
//! - P&ID tags are unique per project, compared case-insensitively.
//! - Any status may move to any other status.
//! - Linking does not require the quote to belong to the same catalog item.

use crate::model::equipment::EquipmentId;
use crate::model::project::ProjectId;
use crate::model::project_equipment::{
    EquipmentStatus, NewProjectEquipment, ProjectEquipment, ProjectEquipmentEdit,
    ProjectEquipmentId,
};
use crate::model::quote::QuoteId;
use crate::repo::error::RepoResult;
use crate::repo::project_equipment_repo::{
    InstanceOrder, ProjectEquipmentDetail, ProjectEquipmentRepository,
};
use crate::service::log_outcome;
use std::time::Instant;

const MODULE: &str = "project_equipment";

/// Project equipment service facade over repository implementations.
pub struct ProjectEquipmentService<R: ProjectEquipmentRepository> {
    repo: R,
}

impl<R: ProjectEquipmentRepository> ProjectEquipmentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one tagged instance to a project.
    ///
    /// # Errors
    /// - `Validation` when the tag is blank or quantity is not positive.
    /// - `Conflict` when the tag already exists in the project.
    /// - `NotFound` when the project, catalog entry or quote is unknown.
    pub fn add_project_equipment(
        &self,
        draft: &NewProjectEquipment,
    ) -> RepoResult<ProjectEquipment> {
        let started_at = Instant::now();
        let result = self.repo.add(draft);
        log_outcome("project_equipment_add", MODULE, started_at, &result);
        result
    }

    pub fn update_project_equipment_status(
        &self,
        id: ProjectEquipmentId,
        status: EquipmentStatus,
    ) -> RepoResult<ProjectEquipment> {
        let started_at = Instant::now();
        let result = self.repo.set_status(id, status);
        log_outcome("project_equipment_status", MODULE, started_at, &result);
        result
    }

    /// Replaces tag, quantity, location and notes under the add rules.
    pub fn update_project_equipment(
        &self,
        id: ProjectEquipmentId,
        edit: &ProjectEquipmentEdit,
    ) -> RepoResult<ProjectEquipment> {
        let started_at = Instant::now();
        let result = self.repo.edit(id, edit);
        log_outcome("project_equipment_update", MODULE, started_at, &result);
        result
    }

    /// Points the instance at `quote_id`, replacing any previous link.
    pub fn link_quote(
        &self,
        id: ProjectEquipmentId,
        quote_id: QuoteId,
    ) -> RepoResult<ProjectEquipment> {
        let started_at = Instant::now();
        let result = self.repo.set_quote(id, Some(quote_id));
        log_outcome("quote_link", MODULE, started_at, &result);
        result
    }

    pub fn unlink_quote(&self, id: ProjectEquipmentId) -> RepoResult<ProjectEquipment> {
        let started_at = Instant::now();
        let result = self.repo.set_quote(id, None);
        log_outcome("quote_unlink", MODULE, started_at, &result);
        result
    }

    pub fn remove_project_equipment(&self, id: ProjectEquipmentId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.remove(id);
        log_outcome("project_equipment_remove", MODULE, started_at, &result);
        result
    }

    pub fn get_project_equipment(
        &self,
        id: ProjectEquipmentId,
    ) -> RepoResult<Option<ProjectEquipment>> {
        self.repo.get(id)
    }

    /// Lists a project's instances; `NotFound` for an unknown project.
    pub fn list_for_project(
        &self,
        project_id: ProjectId,
        order: InstanceOrder,
    ) -> RepoResult<Vec<ProjectEquipment>> {
        self.repo.list_for_project(project_id, order)
    }

    /// Lists instances joined with catalog summary and linked quote price.
    pub fn list_details_for_project(
        &self,
        project_id: ProjectId,
        order: InstanceOrder,
    ) -> RepoResult<Vec<ProjectEquipmentDetail>> {
        self.repo.list_details_for_project(project_id, order)
    }

    /// Every project instance of one catalog entry ("where used").
    pub fn list_for_equipment(&self, equipment_id: EquipmentId) -> RepoResult<Vec<ProjectEquipment>> {
        self.repo.list_for_equipment(equipment_id)
    }
}
