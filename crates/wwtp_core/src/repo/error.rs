//! Error types shared by all repositories and services.
//!
//! Callers branch on [`RepoError::kind`]: validation errors are re-prompted,
//! not-found and conflict errors are shown verbatim, storage errors are
//! reported as failures.

use crate::db::DbError;
use crate::model::equipment::EquipmentId;
use crate::model::project::ProjectId;
use crate::model::quote::QuoteId;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Which table an unresolved identity was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Equipment,
    ProjectEquipment,
    Quote,
    Document,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Project => "project",
            Self::Equipment => "equipment",
            Self::ProjectEquipment => "project equipment",
            Self::Quote => "quote",
            Self::Document => "document",
        };
        f.write_str(label)
    }
}

/// One project equipment row that blocks a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub project_id: ProjectId,
    pub project_name: String,
    pub pid_tag: String,
}

impl Display for TagRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} in `{}`", self.pid_tag, self.project_name)
    }
}

/// Uniqueness or referential-integrity violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    DuplicateTag { project_id: ProjectId, tag: String },
    DuplicateJobNumber(String),
    EquipmentInUse {
        equipment_id: EquipmentId,
        references: Vec<TagRef>,
    },
    QuoteInUse {
        quote_id: QuoteId,
        references: Vec<TagRef>,
    },
}

impl Display for ConflictError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTag { project_id, tag } => {
                write!(f, "P&ID tag `{tag}` already exists in project {project_id}")
            }
            Self::DuplicateJobNumber(job_number) => {
                write!(f, "job number `{job_number}` is already used by another project")
            }
            Self::EquipmentInUse {
                equipment_id,
                references,
            } => write!(
                f,
                "equipment {equipment_id} is still used by: {}",
                join_refs(references)
            ),
            Self::QuoteInUse {
                quote_id,
                references,
            } => write!(
                f,
                "quote {quote_id} is still linked to: {}",
                join_refs(references)
            ),
        }
    }
}

fn join_refs(references: &[TagRef]) -> String {
    references
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Coarse classification for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    NotFound { entity: EntityKind, id: Uuid },
    Conflict(ConflictError),
    Db(DbError),
    /// A persisted row failed to decode.
    InvalidData(String),
}

impl RepoError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Db(_) | Self::InvalidData(_) => ErrorKind::Storage,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConflictError> for RepoError {
    fn from(value: ConflictError) -> Self {
        Self::Conflict(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
