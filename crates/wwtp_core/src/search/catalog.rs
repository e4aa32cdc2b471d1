//! Lazy substring search over the equipment catalog.
//!
//! # Responsibility
//! - Match manufacturer, model and type label against a query.
//! - Pull catalog rows page by page instead of loading the table up front.
//!
//! # Invariants
//! - Matching is case-insensitive using Unicode lowercase.
//! - Results come back in catalog insertion order.
//! - A blank query matches every row.
//! - Each call to [`EquipmentSearch::iter`] restarts from the first row.

use crate::model::equipment::EquipmentMaster;
use crate::repo::equipment_repo::EquipmentRepository;
use crate::repo::error::RepoResult;
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// Rows fetched per round trip.
pub const SEARCH_PAGE_SIZE: u32 = 64;

/// Restartable catalog search. Nothing is read until iteration starts.
#[derive(Debug, Clone)]
pub struct EquipmentSearch<R> {
    repo: R,
    needle: String,
    page_size: u32,
}

impl<R: EquipmentRepository + Clone> EquipmentSearch<R> {
    pub fn new(repo: R, query: &str) -> Self {
        Self {
            repo,
            needle: query.trim().to_lowercase(),
            page_size: SEARCH_PAGE_SIZE,
        }
    }

    /// Overrides the page size; zero is bumped to one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Normalized (trimmed, lowercased) query text.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Starts a fresh pass over the catalog.
    pub fn iter(&self) -> EquipmentSearchIter<R> {
        EquipmentSearchIter {
            repo: self.repo.clone(),
            needle: self.needle.clone(),
            page_size: self.page_size,
            cursor: None,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Drains one pass into a vector, stopping at the first error.
    pub fn collect_all(&self) -> RepoResult<Vec<EquipmentMaster>> {
        self.iter().collect()
    }
}

impl<'a, R: EquipmentRepository + Clone> IntoIterator for &'a EquipmentSearch<R> {
    type Item = RepoResult<EquipmentMaster>;
    type IntoIter = EquipmentSearchIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass of an [`EquipmentSearch`].
///
/// Yields `Err` at most once; iteration ends after a storage failure.
#[derive(Debug)]
pub struct EquipmentSearchIter<R> {
    repo: R,
    needle: String,
    page_size: u32,
    cursor: Option<i64>,
    buffer: VecDeque<EquipmentMaster>,
    done: bool,
}

impl<R: EquipmentRepository> EquipmentSearchIter<R> {
    fn fill_buffer(&mut self) -> RepoResult<()> {
        while self.buffer.is_empty() && !self.done {
            let page = self.repo.scan_equipment(self.cursor, self.page_size)?;
            if (page.len() as u64) < u64::from(self.page_size) {
                self.done = true;
            }
            if let Some(last) = page.last() {
                self.cursor = Some(last.seq);
            }
            self.buffer.extend(
                page.into_iter()
                    .map(|scanned| scanned.equipment)
                    .filter(|equipment| {
                        self.needle.is_empty() || equipment.matches_lowercase(&self.needle)
                    }),
            );
        }
        Ok(())
    }
}

impl<R: EquipmentRepository> Iterator for EquipmentSearchIter<R> {
    type Item = RepoResult<EquipmentMaster>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.fill_buffer() {
            self.done = true;
            self.buffer.clear();
            return Some(Err(err));
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl<R: EquipmentRepository> FusedIterator for EquipmentSearchIter<R> {}
