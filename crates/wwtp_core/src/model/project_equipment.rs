//! Project equipment instance: one tagged use of a catalog item in a project.
//!
//! # Invariants
//! - `pid_tag` is non-blank and unique per project (case-insensitive).
//! - `quantity` is at least one.
//! - `status` is a classification, not a workflow; any value may follow any other.

use crate::model::equipment::EquipmentId;
use crate::model::project::ProjectId;
use crate::model::quote::QuoteId;
use crate::model::validation::{optional_text, positive_quantity, required_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type ProjectEquipmentId = Uuid;

/// Scope classification of an instance on the P&ID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    #[default]
    New,
    Existing,
    Replace,
    Remove,
    #[serde(rename = "TBD")]
    Tbd,
}

impl EquipmentStatus {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Existing,
        Self::Replace,
        Self::Remove,
        Self::Tbd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Existing => "existing",
            Self::Replace => "replace",
            Self::Remove => "remove",
            Self::Tbd => "TBD",
        }
    }
}

impl Display for EquipmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownLabel {
                field: "status",
                value: trimmed.to_string(),
            })
    }
}

/// Persisted instance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEquipment {
    pub id: ProjectEquipmentId,
    pub project_id: ProjectId,
    pub equipment_id: EquipmentId,
    pub pid_tag: String,
    pub status: EquipmentStatus,
    pub quantity: u32,
    /// Building, room, elevation.
    pub location: Option<String>,
    pub notes: Option<String>,
    pub quote_id: Option<QuoteId>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Input for adding catalog equipment to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProjectEquipment {
    pub project_id: ProjectId,
    pub equipment_id: EquipmentId,
    pub pid_tag: String,
    pub status: EquipmentStatus,
    /// Signed so that zero/negative input reaches validation instead of
    /// being unrepresentable at the call site.
    pub quantity: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub quote_id: Option<QuoteId>,
}

impl NewProjectEquipment {
    /// Quantity 1, status `new`, no location or quote.
    pub fn new(project_id: ProjectId, equipment_id: EquipmentId, pid_tag: impl Into<String>) -> Self {
        Self {
            project_id,
            equipment_id,
            pid_tag: pid_tag.into(),
            status: EquipmentStatus::New,
            quantity: 1,
            location: None,
            notes: None,
            quote_id: None,
        }
    }

    pub fn with_status(mut self, status: EquipmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_quote(mut self, quote_id: QuoteId) -> Self {
        self.quote_id = Some(quote_id);
        self
    }

    pub fn validate(&self) -> Result<Self, ValidationError> {
        positive_quantity(self.quantity)?;
        Ok(Self {
            pid_tag: required_text("P&ID tag", &self.pid_tag)?,
            location: optional_text(self.location.as_deref()),
            notes: optional_text(self.notes.as_deref()),
            ..self.clone()
        })
    }
}

/// Full replacement of the free-form fields of an instance.
///
/// Status and quote link have their own operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEquipmentEdit {
    pub pid_tag: String,
    pub quantity: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl ProjectEquipmentEdit {
    pub fn validate(&self) -> Result<Self, ValidationError> {
        positive_quantity(self.quantity)?;
        Ok(Self {
            pid_tag: required_text("P&ID tag", &self.pid_tag)?,
            quantity: self.quantity,
            location: optional_text(self.location.as_deref()),
            notes: optional_text(self.notes.as_deref()),
        })
    }
}

impl From<&ProjectEquipment> for ProjectEquipmentEdit {
    fn from(value: &ProjectEquipment) -> Self {
        Self {
            pid_tag: value.pid_tag.clone(),
            quantity: i64::from(value.quantity),
            location: value.location.clone(),
            notes: value.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EquipmentStatus;

    #[test]
    fn status_parse_accepts_all_labels_in_any_case() {
        for status in EquipmentStatus::ALL {
            assert_eq!(status.as_str().parse::<EquipmentStatus>().unwrap(), status);
            assert_eq!(
                status.as_str().to_uppercase().parse::<EquipmentStatus>().unwrap(),
                status
            );
        }
        assert_eq!("tbd".parse::<EquipmentStatus>().unwrap(), EquipmentStatus::Tbd);
    }

    #[test]
    fn status_parse_rejects_unknown_label() {
        assert!("retired".parse::<EquipmentStatus>().is_err());
    }
}
