//! Project equipment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist tagged equipment instances owned by a project.
//! - Provide the instance + catalog + quote join consumed by exports.
//!
//! # Invariants
//! - `(project, pid_tag)` is unique, compared case-insensitively.
//! - Project, equipment and quote references are resolved inside the write
//!   transaction; a missing one aborts the write.
//! - The join never turns a missing price into zero.

use crate::model::equipment::{EquipmentId, EquipmentType};
use crate::model::project::ProjectId;
use crate::model::project_equipment::{
    EquipmentStatus, NewProjectEquipment, ProjectEquipment, ProjectEquipmentEdit,
    ProjectEquipmentId,
};
use crate::model::quote::QuoteId;
use crate::repo::error::{ConflictError, EntityKind, RepoError, RepoResult};
use crate::repo::{is_unique_violation, optional_u32, parse_optional_uuid, parse_uuid, row_exists};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const INSTANCE_COLUMNS: &str = "pe.uuid AS uuid,
    pe.project_uuid AS project_uuid,
    pe.equipment_uuid AS equipment_uuid,
    pe.pid_tag AS pid_tag,
    pe.status AS status,
    pe.quantity AS quantity,
    pe.location AS location,
    pe.notes AS notes,
    pe.quote_uuid AS quote_uuid,
    pe.created_at AS created_at";

/// Listing order for a project's instances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstanceOrder {
    /// Order the rows were added in.
    #[default]
    Created,
    /// P&ID tag, case-insensitive, then creation order.
    Tag,
}

impl InstanceOrder {
    fn order_by(self) -> &'static str {
        match self {
            Self::Created => "pe.rowid ASC",
            Self::Tag => "pe.pid_tag COLLATE NOCASE ASC, pe.rowid ASC",
        }
    }
}

/// Linked quote as seen from an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotedPrice {
    pub quote_id: QuoteId,
    pub vendor: String,
    /// `None` when the vendor has not priced it yet.
    pub unit_price: Option<f64>,
    pub currency: String,
    pub lead_time_weeks: Option<u32>,
}

/// Instance joined with its catalog entry and linked quote.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectEquipmentDetail {
    pub instance: ProjectEquipment,
    pub manufacturer: String,
    pub model: String,
    pub equipment_type: EquipmentType,
    pub quote: Option<QuotedPrice>,
}

impl ProjectEquipmentDetail {
    /// Unit price, or `None` when unknown.
    pub fn unit_price(&self) -> Option<f64> {
        self.quote.as_ref().and_then(|quote| quote.unit_price)
    }

    /// `unit_price * quantity`, or `None` when the price is unknown.
    pub fn extended_price(&self) -> Option<f64> {
        self.unit_price()
            .map(|price| price * f64::from(self.instance.quantity))
    }
}

/// Repository interface for project equipment instances.
pub trait ProjectEquipmentRepository {
    fn add(&self, draft: &NewProjectEquipment) -> RepoResult<ProjectEquipment>;
    fn get(&self, id: ProjectEquipmentId) -> RepoResult<Option<ProjectEquipment>>;
    fn list_for_project(
        &self,
        project_id: ProjectId,
        order: InstanceOrder,
    ) -> RepoResult<Vec<ProjectEquipment>>;
    fn list_details_for_project(
        &self,
        project_id: ProjectId,
        order: InstanceOrder,
    ) -> RepoResult<Vec<ProjectEquipmentDetail>>;
    /// All instances of one catalog item across projects, creation order.
    fn list_for_equipment(&self, equipment_id: EquipmentId) -> RepoResult<Vec<ProjectEquipment>>;
    fn set_status(
        &self,
        id: ProjectEquipmentId,
        status: EquipmentStatus,
    ) -> RepoResult<ProjectEquipment>;
    fn edit(
        &self,
        id: ProjectEquipmentId,
        edit: &ProjectEquipmentEdit,
    ) -> RepoResult<ProjectEquipment>;
    /// `Some` overwrites any previous link; `None` clears it.
    fn set_quote(
        &self,
        id: ProjectEquipmentId,
        quote_id: Option<QuoteId>,
    ) -> RepoResult<ProjectEquipment>;
    fn remove(&self, id: ProjectEquipmentId) -> RepoResult<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct SqliteProjectEquipmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectEquipmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectEquipmentRepository for SqliteProjectEquipmentRepository<'_> {
    fn add(&self, draft: &NewProjectEquipment) -> RepoResult<ProjectEquipment> {
        let draft = draft.validate()?;
        let id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "projects", draft.project_id)? {
            return Err(RepoError::not_found(EntityKind::Project, draft.project_id));
        }
        if !row_exists(&tx, "equipment_master", draft.equipment_id)? {
            return Err(RepoError::not_found(
                EntityKind::Equipment,
                draft.equipment_id,
            ));
        }
        if let Some(quote_id) = draft.quote_id {
            if !row_exists(&tx, "quotes", quote_id)? {
                return Err(RepoError::not_found(EntityKind::Quote, quote_id));
            }
        }
        ensure_tag_free(&tx, draft.project_id, &draft.pid_tag, None)?;

        tx.execute(
            "INSERT INTO project_equipment (
                uuid,
                project_uuid,
                equipment_uuid,
                pid_tag,
                status,
                quantity,
                location,
                notes,
                quote_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                id.to_string(),
                draft.project_id.to_string(),
                draft.equipment_id.to_string(),
                draft.pid_tag.as_str(),
                draft.status.as_str(),
                draft.quantity,
                draft.location.as_deref(),
                draft.notes.as_deref(),
                draft.quote_id.map(|value| value.to_string()),
            ],
        )
        .map_err(|err| map_tag_violation(err, draft.project_id, &draft.pid_tag))?;

        let instance = load_required_instance(&tx, id)?;
        tx.commit()?;
        Ok(instance)
    }

    fn get(&self, id: ProjectEquipmentId) -> RepoResult<Option<ProjectEquipment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INSTANCE_COLUMNS} FROM project_equipment pe WHERE pe.uuid = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_instance_row(row)?));
        }
        Ok(None)
    }

    fn list_for_project(
        &self,
        project_id: ProjectId,
        order: InstanceOrder,
    ) -> RepoResult<Vec<ProjectEquipment>> {
        if !row_exists(self.conn, "projects", project_id)? {
            return Err(RepoError::not_found(EntityKind::Project, project_id));
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INSTANCE_COLUMNS}
             FROM project_equipment pe
             WHERE pe.project_uuid = ?1
             ORDER BY {};",
            order.order_by()
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_instance_row(row)?);
        }
        Ok(items)
    }

    fn list_details_for_project(
        &self,
        project_id: ProjectId,
        order: InstanceOrder,
    ) -> RepoResult<Vec<ProjectEquipmentDetail>> {
        if !row_exists(self.conn, "projects", project_id)? {
            return Err(RepoError::not_found(EntityKind::Project, project_id));
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {INSTANCE_COLUMNS},
                em.manufacturer AS manufacturer,
                em.model AS model,
                em.equipment_type AS equipment_type,
                q.vendor AS quote_vendor,
                q.price AS quote_price,
                q.currency AS quote_currency,
                q.lead_time_weeks AS quote_lead_time_weeks
             FROM project_equipment pe
             INNER JOIN equipment_master em ON em.uuid = pe.equipment_uuid
             LEFT JOIN quotes q ON q.uuid = pe.quote_uuid
             WHERE pe.project_uuid = ?1
             ORDER BY {};",
            order.order_by()
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_detail_row(row)?);
        }
        Ok(items)
    }

    fn list_for_equipment(&self, equipment_id: EquipmentId) -> RepoResult<Vec<ProjectEquipment>> {
        if !row_exists(self.conn, "equipment_master", equipment_id)? {
            return Err(RepoError::not_found(EntityKind::Equipment, equipment_id));
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INSTANCE_COLUMNS}
             FROM project_equipment pe
             WHERE pe.equipment_uuid = ?1
             ORDER BY pe.rowid ASC;"
        ))?;
        let mut rows = stmt.query([equipment_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_instance_row(row)?);
        }
        Ok(items)
    }

    fn set_status(
        &self,
        id: ProjectEquipmentId,
        status: EquipmentStatus,
    ) -> RepoResult<ProjectEquipment> {
        let changed = self.conn.execute(
            "UPDATE project_equipment
             SET
                status = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::ProjectEquipment, id));
        }
        load_required_instance(self.conn, id)
    }

    fn edit(
        &self,
        id: ProjectEquipmentId,
        edit: &ProjectEquipmentEdit,
    ) -> RepoResult<ProjectEquipment> {
        let edit = edit.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = load_required_instance(&tx, id)?;
        ensure_tag_free(&tx, current.project_id, &edit.pid_tag, Some(id))?;

        tx.execute(
            "UPDATE project_equipment
             SET
                pid_tag = ?2,
                quantity = ?3,
                location = ?4,
                notes = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                edit.pid_tag.as_str(),
                edit.quantity,
                edit.location.as_deref(),
                edit.notes.as_deref(),
            ],
        )
        .map_err(|err| map_tag_violation(err, current.project_id, &edit.pid_tag))?;

        let instance = load_required_instance(&tx, id)?;
        tx.commit()?;
        Ok(instance)
    }

    fn set_quote(
        &self,
        id: ProjectEquipmentId,
        quote_id: Option<QuoteId>,
    ) -> RepoResult<ProjectEquipment> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "project_equipment", id)? {
            return Err(RepoError::not_found(EntityKind::ProjectEquipment, id));
        }
        if let Some(quote_id) = quote_id {
            if !row_exists(&tx, "quotes", quote_id)? {
                return Err(RepoError::not_found(EntityKind::Quote, quote_id));
            }
        }

        tx.execute(
            "UPDATE project_equipment
             SET
                quote_uuid = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), quote_id.map(|value| value.to_string())],
        )?;

        let instance = load_required_instance(&tx, id)?;
        tx.commit()?;
        Ok(instance)
    }

    fn remove(&self, id: ProjectEquipmentId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM project_equipment WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::ProjectEquipment, id));
        }
        Ok(())
    }
}

fn ensure_tag_free(
    conn: &Connection,
    project_id: ProjectId,
    pid_tag: &str,
    except: Option<ProjectEquipmentId>,
) -> RepoResult<()> {
    let taken: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM project_equipment
            WHERE project_uuid = ?1
              AND pid_tag = ?2 COLLATE NOCASE
              AND (?3 IS NULL OR uuid <> ?3)
        );",
        params![
            project_id.to_string(),
            pid_tag,
            except.map(|value| value.to_string()),
        ],
        |row| row.get(0),
    )?;
    if taken == 1 {
        return Err(ConflictError::DuplicateTag {
            project_id,
            tag: pid_tag.to_string(),
        }
        .into());
    }
    Ok(())
}

fn map_tag_violation(err: rusqlite::Error, project_id: ProjectId, pid_tag: &str) -> RepoError {
    if is_unique_violation(&err) {
        return ConflictError::DuplicateTag {
            project_id,
            tag: pid_tag.to_string(),
        }
        .into();
    }
    err.into()
}

fn load_required_instance(conn: &Connection, id: ProjectEquipmentId) -> RepoResult<ProjectEquipment> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INSTANCE_COLUMNS} FROM project_equipment pe WHERE pe.uuid = ?1;"
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_instance_row(row);
    }
    Err(RepoError::not_found(EntityKind::ProjectEquipment, id))
}

fn parse_instance_row(row: &Row<'_>) -> RepoResult<ProjectEquipment> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_uuid")?;
    let equipment_text: String = row.get("equipment_uuid")?;

    let status_text: String = row.get("status")?;
    let status = status_text.parse::<EquipmentStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in project_equipment.status"
        ))
    })?;

    let quantity_value: i64 = row.get("quantity")?;
    let quantity = u32::try_from(quantity_value)
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid quantity `{quantity_value}` in project_equipment.quantity"
            ))
        })?;

    Ok(ProjectEquipment {
        id: parse_uuid(&uuid_text, "project_equipment.uuid")?,
        project_id: parse_uuid(&project_text, "project_equipment.project_uuid")?,
        equipment_id: parse_uuid(&equipment_text, "project_equipment.equipment_uuid")?,
        pid_tag: row.get("pid_tag")?,
        status,
        quantity,
        location: row.get("location")?,
        notes: row.get("notes")?,
        quote_id: parse_optional_uuid(row.get("quote_uuid")?, "project_equipment.quote_uuid")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_detail_row(row: &Row<'_>) -> RepoResult<ProjectEquipmentDetail> {
    let instance = parse_instance_row(row)?;

    let type_text: String = row.get("equipment_type")?;
    let equipment_type = type_text.parse::<EquipmentType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid equipment type `{type_text}` in equipment_master.equipment_type"
        ))
    })?;

    let quote = match (instance.quote_id, row.get::<_, Option<String>>("quote_vendor")?) {
        (Some(quote_id), Some(vendor)) => Some(QuotedPrice {
            quote_id,
            vendor,
            unit_price: row.get("quote_price")?,
            currency: row.get("quote_currency")?,
            lead_time_weeks: optional_u32(
                row.get("quote_lead_time_weeks")?,
                "quotes.lead_time_weeks",
            )?,
        }),
        (Some(quote_id), None) => {
            return Err(RepoError::InvalidData(format!(
                "project equipment links missing quote `{quote_id}`"
            )));
        }
        (None, _) => None,
    };

    Ok(ProjectEquipmentDetail {
        instance,
        manufacturer: row.get("manufacturer")?,
        model: row.get("model")?,
        equipment_type,
        quote,
    })
}

#[cfg(test)]
mod tests {
    use super::{ProjectEquipmentDetail, QuotedPrice};
    use crate::model::equipment::EquipmentType;
    use crate::model::project_equipment::{EquipmentStatus, ProjectEquipment};
    use uuid::Uuid;

    fn detail(quantity: u32, quote: Option<QuotedPrice>) -> ProjectEquipmentDetail {
        ProjectEquipmentDetail {
            instance: ProjectEquipment {
                id: Uuid::new_v4(),
                project_id: Uuid::new_v4(),
                equipment_id: Uuid::new_v4(),
                pid_tag: "P-101".to_string(),
                status: EquipmentStatus::New,
                quantity,
                location: None,
                notes: None,
                quote_id: quote.as_ref().map(|quote| quote.quote_id),
                created_at: 0,
            },
            manufacturer: "Wilo".to_string(),
            model: "EMU KPR 150".to_string(),
            equipment_type: EquipmentType::Pump,
            quote,
        }
    }

    fn quoted(unit_price: Option<f64>) -> QuotedPrice {
        QuotedPrice {
            quote_id: Uuid::new_v4(),
            vendor: "Xylem".to_string(),
            unit_price,
            currency: "USD".to_string(),
            lead_time_weeks: Some(12),
        }
    }

    #[test]
    fn extended_price_multiplies_known_unit_price() {
        assert_eq!(
            detail(3, Some(quoted(Some(1_250.5)))).extended_price(),
            Some(3_751.5)
        );
    }

    #[test]
    fn missing_link_or_price_is_unknown_not_zero() {
        assert_eq!(detail(2, None).extended_price(), None);
        assert_eq!(detail(2, Some(quoted(None))).unit_price(), None);
        assert_eq!(detail(2, Some(quoted(None))).extended_price(), None);
    }
}
