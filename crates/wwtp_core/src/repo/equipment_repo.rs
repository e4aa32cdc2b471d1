//! Equipment master (catalog) repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist catalog rows and their typed spec columns.
//! - Expose a `seq` cursor scan used by the lazy catalog search.
//! - Apply the block-on-reference delete policy.
//!
//! # Invariants
//! - Equipment referenced by any project equipment row, directly or through
//!   one of its quotes, cannot be deleted.
//! - A permitted delete removes the equipment, its quotes and its documents
//!   in one transaction.
//! - `seq` is assigned once at insert as one past the largest existing value
//!   and never rewritten, so a scan cursor stays valid across deletes and
//!   `VACUUM`.

use crate::model::equipment::{
    EquipmentDraft, EquipmentId, EquipmentMaster, EquipmentSpecs, EquipmentType, ValidEquipment,
};
use crate::repo::error::{ConflictError, EntityKind, RepoError, RepoResult};
use crate::repo::{parse_uuid, query_tag_refs, row_exists};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const EQUIPMENT_SELECT_SQL: &str = "SELECT
    seq,
    uuid,
    manufacturer,
    model,
    equipment_type,
    equipment_subtype,
    power_hp,
    flow_gpm,
    head_ft,
    power_hp_verified,
    flow_gpm_verified,
    head_ft_verified,
    voltage,
    rpm,
    material,
    connection_size,
    weight_lbs,
    notes,
    created_at
FROM equipment_master";

const BLOCKING_REFS_SQL: &str = "SELECT p.uuid, p.name, pe.pid_tag
FROM project_equipment pe
INNER JOIN projects p ON p.uuid = pe.project_uuid
WHERE pe.equipment_uuid = ?1
   OR pe.quote_uuid IN (SELECT uuid FROM quotes WHERE equipment_uuid = ?1)
ORDER BY p.rowid ASC, pe.rowid ASC;";

/// Catalog row paired with its scan position.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedEquipment {
    /// Monotonic creation-order key; pass back as `after` to continue.
    pub seq: i64,
    pub equipment: EquipmentMaster,
}

/// What a successful catalog delete removed besides the row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentRemoval {
    pub quotes_removed: usize,
    pub documents_removed: usize,
}

/// Repository interface for the equipment catalog.
pub trait EquipmentRepository {
    fn create_equipment(&self, draft: &EquipmentDraft) -> RepoResult<EquipmentMaster>;
    fn update_equipment(
        &self,
        id: EquipmentId,
        draft: &EquipmentDraft,
    ) -> RepoResult<EquipmentMaster>;
    fn get_equipment(&self, id: EquipmentId) -> RepoResult<Option<EquipmentMaster>>;
    /// Creation order, optionally restricted to one type label.
    fn list_equipment(&self, kind: Option<&EquipmentType>) -> RepoResult<Vec<EquipmentMaster>>;
    /// Up to `limit` rows created after cursor `after`, in creation order.
    fn scan_equipment(&self, after: Option<i64>, limit: u32) -> RepoResult<Vec<ScannedEquipment>>;
    /// Distinct type labels in use, sorted case-insensitively.
    fn equipment_types(&self) -> RepoResult<Vec<String>>;
    fn delete_equipment(&self, id: EquipmentId) -> RepoResult<EquipmentRemoval>;
}

/// SQLite-backed catalog repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteEquipmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEquipmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EquipmentRepository for SqliteEquipmentRepository<'_> {
    fn create_equipment(&self, draft: &EquipmentDraft) -> RepoResult<EquipmentMaster> {
        let valid = draft.validate()?;
        let id = Uuid::new_v4();

        self.conn.execute(
            "INSERT INTO equipment_master (
                uuid,
                manufacturer,
                model,
                equipment_type,
                equipment_subtype,
                power_hp,
                flow_gpm,
                head_ft,
                voltage,
                rpm,
                material,
                connection_size,
                weight_lbs,
                notes,
                power_hp_verified,
                flow_gpm_verified,
                head_ft_verified,
                seq
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                (SELECT COALESCE(MAX(seq), 0) + 1 FROM equipment_master)
            );",
            params![
                id.to_string(),
                valid.manufacturer.as_str(),
                valid.model.as_str(),
                valid.equipment_type.label(),
                valid.subtype.as_deref(),
                valid.specs.power_hp,
                valid.specs.flow_gpm,
                valid.specs.head_ft,
                valid.specs.voltage.as_deref(),
                valid.specs.rpm,
                valid.specs.material.as_deref(),
                valid.specs.connection_size.as_deref(),
                valid.specs.weight_lbs,
                valid.notes.as_deref(),
                valid.specs.power_hp_verified,
                valid.specs.flow_gpm_verified,
                valid.specs.head_ft_verified,
            ],
        )?;

        load_required_equipment(self.conn, id)
    }

    fn update_equipment(
        &self,
        id: EquipmentId,
        draft: &EquipmentDraft,
    ) -> RepoResult<EquipmentMaster> {
        let valid: ValidEquipment = draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE equipment_master
             SET
                manufacturer = ?2,
                model = ?3,
                equipment_type = ?4,
                equipment_subtype = ?5,
                power_hp = ?6,
                flow_gpm = ?7,
                head_ft = ?8,
                voltage = ?9,
                rpm = ?10,
                material = ?11,
                connection_size = ?12,
                weight_lbs = ?13,
                notes = ?14,
                power_hp_verified = ?15,
                flow_gpm_verified = ?16,
                head_ft_verified = ?17,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                valid.manufacturer.as_str(),
                valid.model.as_str(),
                valid.equipment_type.label(),
                valid.subtype.as_deref(),
                valid.specs.power_hp,
                valid.specs.flow_gpm,
                valid.specs.head_ft,
                valid.specs.voltage.as_deref(),
                valid.specs.rpm,
                valid.specs.material.as_deref(),
                valid.specs.connection_size.as_deref(),
                valid.specs.weight_lbs,
                valid.notes.as_deref(),
                valid.specs.power_hp_verified,
                valid.specs.flow_gpm_verified,
                valid.specs.head_ft_verified,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Equipment, id));
        }
        load_required_equipment(self.conn, id)
    }

    fn get_equipment(&self, id: EquipmentId) -> RepoResult<Option<EquipmentMaster>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EQUIPMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_equipment_row(row)?));
        }
        Ok(None)
    }

    fn list_equipment(&self, kind: Option<&EquipmentType>) -> RepoResult<Vec<EquipmentMaster>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EQUIPMENT_SELECT_SQL}
             WHERE (?1 IS NULL OR equipment_type = ?1 COLLATE NOCASE)
             ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([kind.map(EquipmentType::label)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_equipment_row(row)?);
        }
        Ok(items)
    }

    fn scan_equipment(&self, after: Option<i64>, limit: u32) -> RepoResult<Vec<ScannedEquipment>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "{EQUIPMENT_SELECT_SQL}
             WHERE seq > ?1
             ORDER BY seq ASC
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![after.unwrap_or(i64::MIN), i64::from(limit)])?;
        let mut page = Vec::new();
        while let Some(row) = rows.next()? {
            page.push(ScannedEquipment {
                seq: row.get("seq")?,
                equipment: parse_equipment_row(row)?,
            });
        }
        Ok(page)
    }

    fn equipment_types(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT equipment_type
             FROM equipment_master
             ORDER BY equipment_type COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(row.get(0)?);
        }
        Ok(labels)
    }

    fn delete_equipment(&self, id: EquipmentId) -> RepoResult<EquipmentRemoval> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "equipment_master", id)? {
            return Err(RepoError::not_found(EntityKind::Equipment, id));
        }

        let references = query_tag_refs(&tx, BLOCKING_REFS_SQL, id)?;
        if !references.is_empty() {
            return Err(ConflictError::EquipmentInUse {
                equipment_id: id,
                references,
            }
            .into());
        }

        let quotes_removed = tx.execute(
            "DELETE FROM quotes WHERE equipment_uuid = ?1;",
            [id.to_string()],
        )?;
        let documents_removed = tx.execute(
            "DELETE FROM documents WHERE equipment_uuid = ?1;",
            [id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM equipment_master WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        tx.commit()?;
        Ok(EquipmentRemoval {
            quotes_removed,
            documents_removed,
        })
    }
}

fn load_required_equipment(conn: &Connection, id: EquipmentId) -> RepoResult<EquipmentMaster> {
    let mut stmt = conn.prepare(&format!("{EQUIPMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_equipment_row(row);
    }
    Err(RepoError::not_found(EntityKind::Equipment, id))
}

fn parse_equipment_row(row: &Row<'_>) -> RepoResult<EquipmentMaster> {
    let uuid_text: String = row.get("uuid")?;
    let type_text: String = row.get("equipment_type")?;
    let equipment_type = type_text.parse::<EquipmentType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid equipment type `{type_text}` in equipment_master.equipment_type"
        ))
    })?;

    Ok(EquipmentMaster {
        id: parse_uuid(&uuid_text, "equipment_master.uuid")?,
        manufacturer: row.get("manufacturer")?,
        model: row.get("model")?,
        equipment_type,
        subtype: row.get("equipment_subtype")?,
        specs: EquipmentSpecs {
            power_hp: row.get("power_hp")?,
            flow_gpm: row.get("flow_gpm")?,
            head_ft: row.get("head_ft")?,
            power_hp_verified: row.get("power_hp_verified")?,
            flow_gpm_verified: row.get("flow_gpm_verified")?,
            head_ft_verified: row.get("head_ft_verified")?,
            rpm: row.get("rpm")?,
            weight_lbs: row.get("weight_lbs")?,
            voltage: row.get("voltage")?,
            material: row.get("material")?,
            connection_size: row.get("connection_size")?,
        },
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}
