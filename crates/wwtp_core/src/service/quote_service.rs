//! Vendor quote use-case service.
//!
//! # Invariants
//! - At most one quote per catalog entry is current.
//! - A quote linked by any project instance cannot be deleted.

use crate::model::equipment::EquipmentId;
use crate::model::quote::{Quote, QuoteDraft, QuoteId};
use crate::repo::error::RepoResult;
use crate::repo::quote_repo::QuoteRepository;
use crate::service::log_outcome;
use std::time::Instant;

const MODULE: &str = "quote";

pub struct QuoteService<R: QuoteRepository> {
    repo: R,
}

impl<R: QuoteRepository> QuoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records a quote; a current quote demotes its siblings.
    pub fn create_quote(&self, draft: &QuoteDraft) -> RepoResult<Quote> {
        let started_at = Instant::now();
        let result = self.repo.create_quote(draft);
        log_outcome("quote_create", MODULE, started_at, &result);
        result
    }

    /// Rewrites a quote from a full draft; a current quote demotes its siblings.
    pub fn update_quote(&self, id: QuoteId, draft: &QuoteDraft) -> RepoResult<Quote> {
        let started_at = Instant::now();
        let result = self.repo.update_quote(id, draft);
        log_outcome("quote_update", MODULE, started_at, &result);
        result
    }

    pub fn get_quote(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        self.repo.get_quote(id)
    }

    pub fn list_quotes_for_equipment(&self, equipment_id: EquipmentId) -> RepoResult<Vec<Quote>> {
        self.repo.list_for_equipment(equipment_id)
    }

    pub fn current_quote(&self, equipment_id: EquipmentId) -> RepoResult<Option<Quote>> {
        self.repo.current_quote(equipment_id)
    }

    pub fn mark_current(&self, id: QuoteId) -> RepoResult<Quote> {
        let started_at = Instant::now();
        let result = self.repo.mark_current(id);
        log_outcome("quote_mark_current", MODULE, started_at, &result);
        result
    }

    pub fn delete_quote(&self, id: QuoteId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.delete_quote(id);
        log_outcome("quote_delete", MODULE, started_at, &result);
        result
    }
}
