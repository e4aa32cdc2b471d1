//! Repository contracts and SQLite implementations for the five store tables.
//!
//! # Responsibility
//! - Keep SQL inside the persistence boundary.
//! - Enforce cross-row invariants (tag uniqueness, single active project,
//!   block-on-reference deletes) inside one transaction per mutation.
//!
//! # Invariants
//! - Write paths validate drafts before touching SQL.
//! - Multi-statement writes run in an `IMMEDIATE` transaction and either
//!   commit fully or roll back on drop.
//! - Listings are ordered by `rowid` (creation order) unless stated otherwise.

pub mod document_repo;
pub mod equipment_repo;
pub mod error;
pub mod project_equipment_repo;
pub mod project_repo;
pub mod quote_repo;

use crate::repo::error::{RepoError, RepoResult, TagRef};
use rusqlite::{Connection, ErrorCode};
use uuid::Uuid;

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>, column: &str) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn optional_u32(value: Option<i64>, column: &str) -> RepoResult<Option<u32>> {
    value
        .map(|number| {
            u32::try_from(number).map_err(|_| {
                RepoError::InvalidData(format!("value `{number}` out of range in {column}"))
            })
        })
        .transpose()
}

/// Runs `SELECT EXISTS(SELECT 1 FROM {table} WHERE uuid = ?1)`.
pub(crate) fn row_exists(conn: &Connection, table: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE uuid = ?1);"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Loads `(project uuid, project name, pid_tag)` triples for a query that
/// binds one uuid parameter and selects exactly those three columns.
pub(crate) fn query_tag_refs(conn: &Connection, sql: &str, id: Uuid) -> RepoResult<Vec<TagRef>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut refs = Vec::new();
    while let Some(row) = rows.next()? {
        let project_text: String = row.get(0)?;
        refs.push(TagRef {
            project_id: parse_uuid(&project_text, "project_equipment.project_uuid")?,
            project_name: row.get(1)?,
            pid_tag: row.get(2)?,
        });
    }
    Ok(refs)
}

/// Whether a write failed on a UNIQUE index.
///
/// Conflicts are checked before writing; this is the fallback when the
/// index wins anyway.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}
