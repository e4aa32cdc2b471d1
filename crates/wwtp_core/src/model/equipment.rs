//! Equipment master (catalog) entity.
//!
//! # Responsibility
//! - Describe one manufacturer/model entry shared by all projects.
//! - Convert form-style text input into typed specification values.
//!
//! # Invariants
//! - `manufacturer` and `model` are non-blank. Duplicate pairs are allowed.
//! - Numeric specs are finite and non-negative when present.

use crate::model::validation::{
    optional_non_negative, optional_text, required_text, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type EquipmentId = Uuid;

/// Equipment category.
///
/// Known categories are closed variants; anything else is kept verbatim as
/// `Custom` so the catalog can grow without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EquipmentType {
    Pump,
    Mixer,
    Blower,
    Screen,
    Clarifier,
    Filter,
    Other,
    Custom(String),
}

impl EquipmentType {
    /// Display and storage label.
    pub fn label(&self) -> &str {
        match self {
            Self::Pump => "Pump",
            Self::Mixer => "Mixer",
            Self::Blower => "Blower",
            Self::Screen => "Screen",
            Self::Clarifier => "Clarifier",
            Self::Filter => "Filter",
            Self::Other => "Other",
            Self::Custom(label) => label.as_str(),
        }
    }
}

impl FromStr for EquipmentType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let label = required_text("equipment type", value)?;
        let kind = match label.to_ascii_lowercase().as_str() {
            "pump" => Self::Pump,
            "mixer" => Self::Mixer,
            "blower" => Self::Blower,
            "screen" => Self::Screen,
            "clarifier" => Self::Clarifier,
            "filter" => Self::Filter,
            "other" => Self::Other,
            _ => Self::Custom(label),
        };
        Ok(kind)
    }
}

impl Display for EquipmentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<EquipmentType> for String {
    fn from(value: EquipmentType) -> Self {
        match value {
            EquipmentType::Custom(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl TryFrom<String> for EquipmentType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Optional nameplate data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSpecs {
    pub power_hp: Option<f64>,
    pub flow_gpm: Option<f64>,
    pub head_ft: Option<f64>,
    /// Values confirmed or corrected after review; the unverified fields keep
    /// what was read off the cut sheet.
    pub power_hp_verified: Option<f64>,
    pub flow_gpm_verified: Option<f64>,
    pub head_ft_verified: Option<f64>,
    pub rpm: Option<f64>,
    pub weight_lbs: Option<f64>,
    /// Kept as text, e.g. `480V 3Ph`.
    pub voltage: Option<String>,
    pub material: Option<String>,
    pub connection_size: Option<String>,
}

/// Catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentMaster {
    pub id: EquipmentId,
    pub manufacturer: String,
    pub model: String,
    pub equipment_type: EquipmentType,
    /// e.g. `Submersible`, `Centrifugal`.
    pub subtype: Option<String>,
    pub specs: EquipmentSpecs,
    pub notes: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl EquipmentMaster {
    /// `Manufacturer Model (Type)`, the label used by pick lists.
    pub fn display_name(&self) -> String {
        format!(
            "{} {} ({})",
            self.manufacturer, self.model, self.equipment_type
        )
    }

    /// Case-insensitive containment over manufacturer, model and type label.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        [
            self.manufacturer.as_str(),
            self.model.as_str(),
            self.equipment_type.label(),
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(needle))
    }
}

/// Catalog input as typed into a form: numbers arrive as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentDraft {
    pub manufacturer: String,
    pub model: String,
    pub equipment_type: String,
    pub subtype: Option<String>,
    pub power_hp: Option<String>,
    pub flow_gpm: Option<String>,
    pub head_ft: Option<String>,
    pub power_hp_verified: Option<String>,
    pub flow_gpm_verified: Option<String>,
    pub head_ft_verified: Option<String>,
    pub rpm: Option<String>,
    pub weight_lbs: Option<String>,
    pub voltage: Option<String>,
    pub material: Option<String>,
    pub connection_size: Option<String>,
    pub notes: Option<String>,
}

/// Output of [`EquipmentDraft::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEquipment {
    pub manufacturer: String,
    pub model: String,
    pub equipment_type: EquipmentType,
    pub subtype: Option<String>,
    pub specs: EquipmentSpecs,
    pub notes: Option<String>,
}

impl EquipmentDraft {
    pub fn new(
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        equipment_type: impl Into<String>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
            equipment_type: equipment_type.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<ValidEquipment, ValidationError> {
        Ok(ValidEquipment {
            manufacturer: required_text("manufacturer", &self.manufacturer)?,
            model: required_text("model", &self.model)?,
            equipment_type: self.equipment_type.parse()?,
            subtype: optional_text(self.subtype.as_deref()),
            specs: EquipmentSpecs {
                power_hp: optional_non_negative("power_hp", self.power_hp.as_deref())?,
                flow_gpm: optional_non_negative("flow_gpm", self.flow_gpm.as_deref())?,
                head_ft: optional_non_negative("head_ft", self.head_ft.as_deref())?,
                power_hp_verified: optional_non_negative(
                    "power_hp_verified",
                    self.power_hp_verified.as_deref(),
                )?,
                flow_gpm_verified: optional_non_negative(
                    "flow_gpm_verified",
                    self.flow_gpm_verified.as_deref(),
                )?,
                head_ft_verified: optional_non_negative(
                    "head_ft_verified",
                    self.head_ft_verified.as_deref(),
                )?,
                rpm: optional_non_negative("rpm", self.rpm.as_deref())?,
                weight_lbs: optional_non_negative("weight_lbs", self.weight_lbs.as_deref())?,
                voltage: optional_text(self.voltage.as_deref()),
                material: optional_text(self.material.as_deref()),
                connection_size: optional_text(self.connection_size.as_deref()),
            },
            notes: optional_text(self.notes.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EquipmentDraft, EquipmentType};
    use crate::model::validation::ValidationError;

    #[test]
    fn equipment_type_parses_known_labels_case_insensitively() {
        assert_eq!("pump".parse::<EquipmentType>().unwrap(), EquipmentType::Pump);
        assert_eq!(" BLOWER ".parse::<EquipmentType>().unwrap(), EquipmentType::Blower);
        assert_eq!(
            "Grit Classifier".parse::<EquipmentType>().unwrap(),
            EquipmentType::Custom("Grit Classifier".to_string())
        );
        assert_eq!(
            "  ".parse::<EquipmentType>().unwrap_err(),
            ValidationError::Blank("equipment type")
        );
    }

    #[test]
    fn draft_validation_trims_and_parses_specs() {
        let mut draft = EquipmentDraft::new(" Wilo ", "EMU KPR 150", "Pump");
        draft.power_hp = Some("20".to_string());
        draft.head_ft = Some("".to_string());
        draft.voltage = Some(" 480V 3Ph ".to_string());

        let valid = draft.validate().unwrap();
        assert_eq!(valid.manufacturer, "Wilo");
        assert_eq!(valid.specs.power_hp, Some(20.0));
        assert_eq!(valid.specs.head_ft, None);
        assert_eq!(valid.specs.voltage.as_deref(), Some("480V 3Ph"));
    }

    #[test]
    fn verified_specs_follow_number_rules() {
        let mut draft = EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump");
        draft.power_hp = Some("20".to_string());
        draft.power_hp_verified = Some("22.5".to_string());
        draft.head_ft_verified = Some(" ".to_string());

        let valid = draft.validate().unwrap();
        assert_eq!(valid.specs.power_hp, Some(20.0));
        assert_eq!(valid.specs.power_hp_verified, Some(22.5));
        assert_eq!(valid.specs.head_ft_verified, None);

        draft.flow_gpm_verified = Some("-10".to_string());
        assert!(matches!(
            draft.validate().unwrap_err(),
            ValidationError::NegativeNumber {
                field: "flow_gpm_verified",
                ..
            }
        ));
    }

    #[test]
    fn draft_validation_requires_model() {
        let draft = EquipmentDraft::new("Wilo", " ", "Pump");
        assert_eq!(draft.validate().unwrap_err(), ValidationError::Blank("model"));
    }
}
