//! Store facade owning one SQLite connection.
//!
//! # Responsibility
//! - Open and migrate the database through `db`.
//! - Hand out services bound to the owned connection.
//! - Report row counts for status displays.
//!
//! # Invariants
//! - The connection is never handed out, so every write passes the service
//!   and repository checks.

use crate::config::StoreConfig;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::repo::document_repo::SqliteDocumentRepository;
use crate::repo::equipment_repo::SqliteEquipmentRepository;
use crate::repo::error::RepoResult;
use crate::repo::project_equipment_repo::SqliteProjectEquipmentRepository;
use crate::repo::project_repo::SqliteProjectRepository;
use crate::repo::quote_repo::SqliteQuoteRepository;
use crate::service::document_service::DocumentService;
use crate::service::equipment_service::EquipmentService;
use crate::service::project_equipment_service::ProjectEquipmentService;
use crate::service::project_service::ProjectService;
use crate::service::quote_service::QuoteService;
use rusqlite::Connection;
use std::path::Path;

/// Row counts across the five store tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub projects: u64,
    pub equipment: u64,
    pub project_equipment: u64,
    pub quotes: u64,
    pub documents: u64,
}

/// Equipment catalog and project data store.
pub struct EquipmentStore {
    conn: Connection,
}

impl EquipmentStore {
    /// Opens (or creates) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Opens the store at `config.db_path`.
    pub fn from_config(config: &StoreConfig) -> DbResult<Self> {
        Self::open(&config.db_path)
    }

    pub fn projects(&self) -> ProjectService<SqliteProjectRepository<'_>> {
        ProjectService::new(SqliteProjectRepository::new(&self.conn))
    }

    pub fn catalog(&self) -> EquipmentService<SqliteEquipmentRepository<'_>> {
        EquipmentService::new(SqliteEquipmentRepository::new(&self.conn))
    }

    pub fn project_equipment(
        &self,
    ) -> ProjectEquipmentService<SqliteProjectEquipmentRepository<'_>> {
        ProjectEquipmentService::new(SqliteProjectEquipmentRepository::new(&self.conn))
    }

    pub fn quotes(&self) -> QuoteService<SqliteQuoteRepository<'_>> {
        QuoteService::new(SqliteQuoteRepository::new(&self.conn))
    }

    pub fn documents(&self) -> DocumentService<SqliteDocumentRepository<'_>> {
        DocumentService::new(SqliteDocumentRepository::new(&self.conn))
    }

    pub fn stats(&self) -> RepoResult<StoreStats> {
        Ok(StoreStats {
            projects: count_rows(&self.conn, "projects")?,
            equipment: count_rows(&self.conn, "equipment_master")?,
            project_equipment: count_rows(&self.conn, "project_equipment")?,
            quotes: count_rows(&self.conn, "quotes")?,
            documents: count_rows(&self.conn, "documents")?,
        })
    }
}

fn count_rows(conn: &Connection, table: &str) -> RepoResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    Ok(u64::try_from(count).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{EquipmentStore, StoreStats};
    use crate::model::equipment::EquipmentDraft;
    use crate::model::project::ProjectDraft;

    #[test]
    fn fresh_store_is_empty() {
        let store = EquipmentStore::open_in_memory().expect("open store");
        assert_eq!(store.stats().expect("stats"), StoreStats::default());
        assert!(store.projects().active_project().expect("active").is_none());
    }

    #[test]
    fn stats_count_rows_per_table() {
        let store = EquipmentStore::open_in_memory().expect("open store");
        store
            .projects()
            .create_project(&ProjectDraft::new("Rio Del Oro WWTP Upgrade"))
            .expect("create project");
        store
            .catalog()
            .create_equipment(&EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump"))
            .expect("create equipment");

        let stats = store.stats().expect("stats");
        assert_eq!(stats.projects, 1);
        assert_eq!(stats.equipment, 1);
        assert_eq!(stats.project_equipment, 0);
    }
}
