//! Equipment catalog and project data store for WWTP design work.
//! This crate owns every persistence invariant; hosts talk to it through
//! [`EquipmentStore`].

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use config::StoreConfig;
pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{Document, DocumentDraft, DocumentId, DocumentType};
pub use model::equipment::{
    EquipmentDraft, EquipmentId, EquipmentMaster, EquipmentSpecs, EquipmentType,
};
pub use model::project::{Project, ProjectDraft, ProjectId};
pub use model::project_equipment::{
    EquipmentStatus, NewProjectEquipment, ProjectEquipment, ProjectEquipmentEdit,
    ProjectEquipmentId,
};
pub use model::quote::{Quote, QuoteDraft, QuoteId};
pub use model::validation::ValidationError;
pub use repo::equipment_repo::EquipmentRemoval;
pub use repo::error::{ConflictError, EntityKind, ErrorKind, RepoError, RepoResult, TagRef};
pub use repo::project_equipment_repo::{InstanceOrder, ProjectEquipmentDetail, QuotedPrice};
pub use search::catalog::EquipmentSearch;
pub use store::{EquipmentStore, StoreStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
