//! Equipment document metadata (cut sheets, specs, submittals).
//!
//! The store records where a file lives; it never holds file bytes.

use crate::model::equipment::EquipmentId;
use crate::model::validation::{optional_date, optional_text, required_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

pub type DocumentId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Cutsheet,
    Spec,
    Submittal,
    Quote,
    Manual,
    Other,
}

impl DocumentType {
    pub const ALL: [Self; 6] = [
        Self::Cutsheet,
        Self::Spec,
        Self::Submittal,
        Self::Quote,
        Self::Manual,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cutsheet => "cutsheet",
            Self::Spec => "spec",
            Self::Submittal => "submittal",
            Self::Quote => "quote",
            Self::Manual => "manual",
            Self::Other => "other",
        }
    }
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownLabel {
                field: "document type",
                value: value.trim().to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub equipment_id: EquipmentId,
    pub document_type: DocumentType,
    pub file_name: String,
    /// Usually relative to the configured file root,
    /// e.g. `equipment_001/cutsheet.pdf`.
    pub file_path: String,
    pub file_size_kb: Option<u32>,
    pub version: Option<String>,
    pub document_date: Option<String>,
    pub notes: Option<String>,
    /// Epoch milliseconds.
    pub uploaded_at: i64,
}

impl Document {
    /// Resolves `file_path` against `root` unless it is already absolute.
    pub fn resolve_path(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.file_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    pub equipment_id: EquipmentId,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub file_size_kb: Option<u32>,
    pub version: Option<String>,
    pub document_date: Option<String>,
    pub notes: Option<String>,
}

impl DocumentDraft {
    pub fn new(
        equipment_id: EquipmentId,
        document_type: DocumentType,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            equipment_id,
            document_type,
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_size_kb: None,
            version: None,
            document_date: None,
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            equipment_id: self.equipment_id,
            document_type: self.document_type,
            file_name: required_text("file name", &self.file_name)?,
            file_path: required_text("file path", &self.file_path)?,
            file_size_kb: self.file_size_kb,
            version: optional_text(self.version.as_deref()),
            document_date: optional_date("document date", self.document_date.as_deref())?,
            notes: optional_text(self.notes.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, DocumentType};
    use std::path::Path;
    use uuid::Uuid;

    #[test]
    fn document_type_parse_tolerates_separators() {
        assert_eq!("Cut-Sheet".parse::<DocumentType>().unwrap(), DocumentType::Cutsheet);
        assert_eq!("submittal".parse::<DocumentType>().unwrap(), DocumentType::Submittal);
        assert!("drawing".parse::<DocumentType>().is_err());
    }

    #[test]
    fn resolve_path_joins_relative_paths_only() {
        let mut doc = Document {
            id: Uuid::new_v4(),
            equipment_id: Uuid::new_v4(),
            document_type: DocumentType::Cutsheet,
            file_name: "cutsheet.pdf".to_string(),
            file_path: "equipment_001/cutsheet.pdf".to_string(),
            file_size_kb: None,
            version: None,
            document_date: None,
            notes: None,
            uploaded_at: 0,
        };
        let root = Path::new("/srv/wwtp/files");
        assert_eq!(
            doc.resolve_path(root),
            Path::new("/srv/wwtp/files/equipment_001/cutsheet.pdf")
        );

        doc.file_path = "/mnt/share/cutsheet.pdf".to_string();
        assert_eq!(doc.resolve_path(root), Path::new("/mnt/share/cutsheet.pdf"));
    }
}
