//! Equipment catalog use-case service.
//!
//! # Responsibility
//! - Provide catalog CRUD, type listing and lazy search.
//! - Apply the block-on-reference delete policy through the repository.

use crate::model::equipment::{EquipmentDraft, EquipmentId, EquipmentMaster, EquipmentType};
use crate::repo::equipment_repo::{EquipmentRemoval, EquipmentRepository};
use crate::repo::error::RepoResult;
use crate::search::catalog::EquipmentSearch;
use crate::service::log_outcome;
use log::{debug, info};
use std::time::Instant;

const MODULE: &str = "catalog";

/// Catalog service facade over repository implementations.
pub struct EquipmentService<R: EquipmentRepository> {
    repo: R,
}

impl<R: EquipmentRepository> EquipmentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one catalog entry.
    ///
    /// # Errors
    /// - `Validation` when manufacturer, model or type is blank, or a numeric
    ///   spec is not a finite non-negative decimal.
    pub fn create_equipment(&self, draft: &EquipmentDraft) -> RepoResult<EquipmentMaster> {
        let started_at = Instant::now();
        let result = self.repo.create_equipment(draft);
        log_outcome("equipment_create", MODULE, started_at, &result);
        result
    }

    pub fn update_equipment(
        &self,
        id: EquipmentId,
        draft: &EquipmentDraft,
    ) -> RepoResult<EquipmentMaster> {
        let started_at = Instant::now();
        let result = self.repo.update_equipment(id, draft);
        log_outcome("equipment_update", MODULE, started_at, &result);
        result
    }

    pub fn get_equipment(&self, id: EquipmentId) -> RepoResult<Option<EquipmentMaster>> {
        self.repo.get_equipment(id)
    }

    /// Lists the catalog in creation order, optionally for one type.
    pub fn list_equipment(&self, kind: Option<&EquipmentType>) -> RepoResult<Vec<EquipmentMaster>> {
        self.repo.list_equipment(kind)
    }

    /// Distinct type labels in use, sorted case-insensitively.
    pub fn equipment_types(&self) -> RepoResult<Vec<String>> {
        self.repo.equipment_types()
    }

    /// Deletes an unreferenced catalog entry with its quotes and documents.
    ///
    /// # Errors
    /// - `Conflict` naming every blocking P&ID tag when a project instance
    ///   references the entry or links one of its quotes.
    /// - `NotFound` when `id` is unknown.
    pub fn delete_equipment(&self, id: EquipmentId) -> RepoResult<EquipmentRemoval> {
        let started_at = Instant::now();
        let result = self.repo.delete_equipment(id);
        log_outcome("equipment_delete", MODULE, started_at, &result);
        if let Ok(removal) = &result {
            info!(
                "event=equipment_delete_cascade module={MODULE} status=ok quotes_removed={} documents_removed={}",
                removal.quotes_removed, removal.documents_removed
            );
        }
        result
    }
}

impl<R: EquipmentRepository + Clone> EquipmentService<R> {
    /// Returns a lazy search over manufacturer, model and type label.
    ///
    /// No rows are read until the result is iterated; every iteration starts
    /// over from the first catalog row.
    pub fn search_equipment(&self, query: &str) -> EquipmentSearch<R> {
        let search = EquipmentSearch::new(self.repo.clone(), query);
        debug!(
            "event=equipment_search module={MODULE} status=start query_len={}",
            search.needle().chars().count()
        );
        search
    }
}

#[cfg(test)]
mod tests {
    use super::EquipmentService;
    use crate::db::open_db_in_memory;
    use crate::model::equipment::{EquipmentDraft, EquipmentType};
    use crate::repo::equipment_repo::SqliteEquipmentRepository;

    #[test]
    fn types_are_distinct_and_sorted() {
        let conn = open_db_in_memory().expect("open db");
        let service = EquipmentService::new(SqliteEquipmentRepository::new(&conn));
        for (manufacturer, model, kind) in [
            ("Wilo", "EMU KPR 150", "Pump"),
            ("Aerzen", "Delta Blower GM 35S", "Blower"),
            ("Flygt", "NP 3153", "pump"),
        ] {
            service
                .create_equipment(&EquipmentDraft::new(manufacturer, model, kind))
                .expect("create equipment");
        }

        assert_eq!(
            service.equipment_types().expect("types"),
            vec!["Blower".to_string(), "Pump".to_string()]
        );
        let pumps = service
            .list_equipment(Some(&EquipmentType::Pump))
            .expect("list pumps");
        assert_eq!(pumps.len(), 2);
    }

    #[test]
    fn search_matches_type_label() {
        let conn = open_db_in_memory().expect("open db");
        let service = EquipmentService::new(SqliteEquipmentRepository::new(&conn));
        service
            .create_equipment(&EquipmentDraft::new("Aerzen", "GM 35S", "Blower"))
            .expect("create equipment");
        service
            .create_equipment(&EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump"))
            .expect("create equipment");

        let hits = service
            .search_equipment("BLOW")
            .collect_all()
            .expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].manufacturer, "Aerzen");
    }
}
