//! Document metadata repository contract and SQLite implementation.
//!
//! Documents are descriptive only: creating or deleting one never affects
//! the lifecycle of its equipment.

use crate::model::document::{Document, DocumentDraft, DocumentId, DocumentType};
use crate::model::equipment::EquipmentId;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::{optional_u32, parse_uuid, row_exists};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT
    uuid,
    equipment_uuid,
    document_type,
    file_name,
    file_path,
    file_size_kb,
    version,
    document_date,
    notes,
    uploaded_at
FROM documents";

pub trait DocumentRepository {
    fn create_document(&self, draft: &DocumentDraft) -> RepoResult<Document>;
    /// Replaces every field with the draft's values.
    fn update_document(&self, id: DocumentId, draft: &DocumentDraft) -> RepoResult<Document>;
    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>>;
    /// Creation order, optionally restricted to one document type.
    fn list_for_equipment(
        &self,
        equipment_id: EquipmentId,
        kind: Option<DocumentType>,
    ) -> RepoResult<Vec<Document>>;
    fn delete_document(&self, id: DocumentId) -> RepoResult<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn create_document(&self, draft: &DocumentDraft) -> RepoResult<Document> {
        let draft = draft.validate()?;
        let id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "equipment_master", draft.equipment_id)? {
            return Err(RepoError::not_found(
                EntityKind::Equipment,
                draft.equipment_id,
            ));
        }
        tx.execute(
            "INSERT INTO documents (
                uuid,
                equipment_uuid,
                document_type,
                file_name,
                file_path,
                file_size_kb,
                version,
                document_date,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                id.to_string(),
                draft.equipment_id.to_string(),
                draft.document_type.as_str(),
                draft.file_name.as_str(),
                draft.file_path.as_str(),
                draft.file_size_kb,
                draft.version.as_deref(),
                draft.document_date.as_deref(),
                draft.notes.as_deref(),
            ],
        )?;
        let document = load_required_document(&tx, id)?;
        tx.commit()?;
        Ok(document)
    }

    fn update_document(&self, id: DocumentId, draft: &DocumentDraft) -> RepoResult<Document> {
        let draft = draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "documents", id)? {
            return Err(RepoError::not_found(EntityKind::Document, id));
        }
        if !row_exists(&tx, "equipment_master", draft.equipment_id)? {
            return Err(RepoError::not_found(
                EntityKind::Equipment,
                draft.equipment_id,
            ));
        }
        tx.execute(
            "UPDATE documents
             SET equipment_uuid = ?2,
                 document_type = ?3,
                 file_name = ?4,
                 file_path = ?5,
                 file_size_kb = ?6,
                 version = ?7,
                 document_date = ?8,
                 notes = ?9
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                draft.equipment_id.to_string(),
                draft.document_type.as_str(),
                draft.file_name.as_str(),
                draft.file_path.as_str(),
                draft.file_size_kb,
                draft.version.as_deref(),
                draft.document_date.as_deref(),
                draft.notes.as_deref(),
            ],
        )?;
        let document = load_required_document(&tx, id)?;
        tx.commit()?;
        Ok(document)
    }

    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCUMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_document_row(row)?));
        }
        Ok(None)
    }

    fn list_for_equipment(
        &self,
        equipment_id: EquipmentId,
        kind: Option<DocumentType>,
    ) -> RepoResult<Vec<Document>> {
        if !row_exists(self.conn, "equipment_master", equipment_id)? {
            return Err(RepoError::not_found(EntityKind::Equipment, equipment_id));
        }
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL}
             WHERE equipment_uuid = ?1
               AND (?2 IS NULL OR document_type = ?2)
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query(params![
            equipment_id.to_string(),
            kind.map(DocumentType::as_str)
        ])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }
        Ok(documents)
    }

    fn delete_document(&self, id: DocumentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM documents WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Document, id));
        }
        Ok(())
    }
}

fn load_required_document(conn: &Connection, id: DocumentId) -> RepoResult<Document> {
    let mut stmt = conn.prepare(&format!("{DOCUMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_document_row(row);
    }
    Err(RepoError::not_found(EntityKind::Document, id))
}

fn parse_document_row(row: &Row<'_>) -> RepoResult<Document> {
    let uuid_text: String = row.get("uuid")?;
    let equipment_text: String = row.get("equipment_uuid")?;
    let type_text: String = row.get("document_type")?;
    let document_type = type_text.parse::<DocumentType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid document type `{type_text}` in documents.document_type"
        ))
    })?;

    Ok(Document {
        id: parse_uuid(&uuid_text, "documents.uuid")?,
        equipment_id: parse_uuid(&equipment_text, "documents.equipment_uuid")?,
        document_type,
        file_name: row.get("file_name")?,
        file_path: row.get("file_path")?,
        file_size_kb: optional_u32(row.get("file_size_kb")?, "documents.file_size_kb")?,
        version: row.get("version")?,
        document_date: row.get("document_date")?,
        notes: row.get("notes")?,
        uploaded_at: row.get("uploaded_at")?,
    })
}
