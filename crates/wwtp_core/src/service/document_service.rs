//! Equipment document use-case service.
//!
//! The store records document metadata and paths only; file bytes live with
//! the file-storage collaborator.

use crate::model::document::{Document, DocumentDraft, DocumentId, DocumentType};
use crate::model::equipment::EquipmentId;
use crate::repo::document_repo::DocumentRepository;
use crate::repo::error::RepoResult;
use crate::service::log_outcome;
use std::time::Instant;

const MODULE: &str = "document";

pub struct DocumentService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> DocumentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn register_document(&self, draft: &DocumentDraft) -> RepoResult<Document> {
        let started_at = Instant::now();
        let result = self.repo.create_document(draft);
        log_outcome("document_register", MODULE, started_at, &result);
        result
    }

    pub fn update_document(&self, id: DocumentId, draft: &DocumentDraft) -> RepoResult<Document> {
        let started_at = Instant::now();
        let result = self.repo.update_document(id, draft);
        log_outcome("document_update", MODULE, started_at, &result);
        result
    }

    pub fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>> {
        self.repo.get_document(id)
    }

    /// Lists documents in upload order, optionally for one type.
    pub fn list_documents_for_equipment(
        &self,
        equipment_id: EquipmentId,
        kind: Option<DocumentType>,
    ) -> RepoResult<Vec<Document>> {
        self.repo.list_for_equipment(equipment_id, kind)
    }

    pub fn delete_document(&self, id: DocumentId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.delete_document(id);
        log_outcome("document_delete", MODULE, started_at, &result);
        result
    }
}
