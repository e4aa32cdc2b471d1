//! Store use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Emit one metadata-only log event per mutating call.
//!
//! # Invariants
//! - Services never bypass repository validation or transactions.
//! - Log lines carry ids, counts and error kinds, never user text.

pub mod document_service;
pub mod equipment_service;
pub mod project_equipment_service;
pub mod project_service;
pub mod quote_service;

use crate::repo::error::{ErrorKind, RepoResult};
use log::{error, info, warn};
use std::time::Instant;

/// Logs `event=<event> module=<module> status=ok|error` for one call.
///
/// Caller errors (validation, not found, conflict) log at `warn`; storage
/// failures log at `error`.
pub(crate) fn log_outcome<T>(
    event: &str,
    module: &str,
    started_at: Instant,
    result: &RepoResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!("event={event} module={module} status=ok duration_ms={duration_ms}"),
        Err(err) => match err.kind() {
            ErrorKind::Storage => error!(
                "event={event} module={module} status=error duration_ms={duration_ms} error_kind={}",
                err.kind().as_str()
            ),
            kind => warn!(
                "event={event} module={module} status=rejected duration_ms={duration_ms} error_kind={}",
                kind.as_str()
            ),
        },
    }
}
