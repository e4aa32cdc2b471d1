//! Project entity.
//!
//! # Invariants
//! - `name` is never blank.
//! - At most one project has `is_active = true`; the store enforces this,
//!   the model only carries the flag.

use crate::model::validation::{optional_text, required_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

/// A design/bid/construction job that consumes catalog equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client: Option<String>,
    /// Unique across projects when present.
    pub job_number: Option<String>,
    /// Free text such as `Design`, `Bid`, `Construction`.
    pub phase: Option<String>,
    pub notes: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub is_active: bool,
}

/// Editable project fields, used for create and full update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub client: Option<String>,
    pub job_number: Option<String>,
    pub phase: Option<String>,
    pub notes: Option<String>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn with_job_number(mut self, job_number: impl Into<String>) -> Self {
        self.job_number = Some(job_number.into());
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// Returns a trimmed copy, or the first validation failure.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("project name", &self.name)?,
            client: optional_text(self.client.as_deref()),
            job_number: optional_text(self.job_number.as_deref()),
            phase: optional_text(self.phase.as_deref()),
            notes: optional_text(self.notes.as_deref()),
        })
    }
}
