//! Quote repository contract and SQLite implementation.
//!
//! # Invariants
//! - A quote always references existing catalog equipment.
//! - At most one quote per equipment is current; promoting one demotes the
//!   rest in the same transaction.
//! - Quotes linked from project equipment cannot be deleted.

use crate::model::equipment::EquipmentId;
use crate::model::quote::{Quote, QuoteDraft, QuoteId};
use crate::model::validation::DEFAULT_CURRENCY;
use crate::repo::error::{ConflictError, EntityKind, RepoError, RepoResult};
use crate::repo::{bool_to_int, int_to_bool, optional_u32, parse_uuid, query_tag_refs, row_exists};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const QUOTE_SELECT_SQL: &str = "SELECT
    uuid,
    equipment_uuid,
    vendor,
    price,
    currency,
    lead_time_weeks,
    quote_date,
    quote_number,
    file_path,
    validity_notes,
    is_current,
    notes,
    created_at
FROM quotes";

const LINKED_REFS_SQL: &str = "SELECT p.uuid, p.name, pe.pid_tag
FROM project_equipment pe
INNER JOIN projects p ON p.uuid = pe.project_uuid
WHERE pe.quote_uuid = ?1
ORDER BY p.rowid ASC, pe.rowid ASC;";

/// Repository interface for vendor quotes.
pub trait QuoteRepository {
    fn create_quote(&self, draft: &QuoteDraft) -> RepoResult<Quote>;
    /// Replaces every field with the draft's values. Promoting the quote to
    /// current demotes the equipment's other quotes.
    fn update_quote(&self, id: QuoteId, draft: &QuoteDraft) -> RepoResult<Quote>;
    fn get_quote(&self, id: QuoteId) -> RepoResult<Option<Quote>>;
    /// Creation order.
    fn list_for_equipment(&self, equipment_id: EquipmentId) -> RepoResult<Vec<Quote>>;
    fn current_quote(&self, equipment_id: EquipmentId) -> RepoResult<Option<Quote>>;
    fn mark_current(&self, id: QuoteId) -> RepoResult<Quote>;
    fn delete_quote(&self, id: QuoteId) -> RepoResult<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct SqliteQuoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl QuoteRepository for SqliteQuoteRepository<'_> {
    fn create_quote(&self, draft: &QuoteDraft) -> RepoResult<Quote> {
        let draft = draft.validate()?;
        let id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "equipment_master", draft.equipment_id)? {
            return Err(RepoError::not_found(
                EntityKind::Equipment,
                draft.equipment_id,
            ));
        }
        if draft.is_current {
            clear_current_flag(&tx, draft.equipment_id)?;
        }

        tx.execute(
            "INSERT INTO quotes (
                uuid,
                equipment_uuid,
                vendor,
                price,
                currency,
                lead_time_weeks,
                quote_date,
                quote_number,
                file_path,
                validity_notes,
                is_current,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                id.to_string(),
                draft.equipment_id.to_string(),
                draft.vendor.as_str(),
                draft.price,
                draft.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                draft.lead_time_weeks,
                draft.quote_date.as_deref(),
                draft.quote_number.as_deref(),
                draft.file_path.as_deref(),
                draft.validity_notes.as_deref(),
                bool_to_int(draft.is_current),
                draft.notes.as_deref(),
            ],
        )?;

        let quote = load_required_quote(&tx, id)?;
        tx.commit()?;
        Ok(quote)
    }

    fn update_quote(&self, id: QuoteId, draft: &QuoteDraft) -> RepoResult<Quote> {
        let draft = draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "quotes", id)? {
            return Err(RepoError::not_found(EntityKind::Quote, id));
        }
        if !row_exists(&tx, "equipment_master", draft.equipment_id)? {
            return Err(RepoError::not_found(
                EntityKind::Equipment,
                draft.equipment_id,
            ));
        }
        if draft.is_current {
            tx.execute(
                "UPDATE quotes
                 SET is_current = 0
                 WHERE equipment_uuid = ?1
                   AND is_current = 1
                   AND uuid <> ?2;",
                [draft.equipment_id.to_string(), id.to_string()],
            )?;
        }

        tx.execute(
            "UPDATE quotes
             SET equipment_uuid = ?2,
                 vendor = ?3,
                 price = ?4,
                 currency = ?5,
                 lead_time_weeks = ?6,
                 quote_date = ?7,
                 quote_number = ?8,
                 file_path = ?9,
                 validity_notes = ?10,
                 is_current = ?11,
                 notes = ?12
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                draft.equipment_id.to_string(),
                draft.vendor.as_str(),
                draft.price,
                draft.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                draft.lead_time_weeks,
                draft.quote_date.as_deref(),
                draft.quote_number.as_deref(),
                draft.file_path.as_deref(),
                draft.validity_notes.as_deref(),
                bool_to_int(draft.is_current),
                draft.notes.as_deref(),
            ],
        )?;

        let quote = load_required_quote(&tx, id)?;
        tx.commit()?;
        Ok(quote)
    }

    fn get_quote(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_quote_row(row)?));
        }
        Ok(None)
    }

    fn list_for_equipment(&self, equipment_id: EquipmentId) -> RepoResult<Vec<Quote>> {
        if !row_exists(self.conn, "equipment_master", equipment_id)? {
            return Err(RepoError::not_found(EntityKind::Equipment, equipment_id));
        }
        let mut stmt = self.conn.prepare(&format!(
            "{QUOTE_SELECT_SQL} WHERE equipment_uuid = ?1 ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([equipment_id.to_string()])?;
        let mut quotes = Vec::new();
        while let Some(row) = rows.next()? {
            quotes.push(parse_quote_row(row)?);
        }
        Ok(quotes)
    }

    fn current_quote(&self, equipment_id: EquipmentId) -> RepoResult<Option<Quote>> {
        let mut stmt = self.conn.prepare(&format!(
            "{QUOTE_SELECT_SQL} WHERE equipment_uuid = ?1 AND is_current = 1;"
        ))?;
        let mut rows = stmt.query([equipment_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_quote_row(row)?));
        }
        Ok(None)
    }

    fn mark_current(&self, id: QuoteId) -> RepoResult<Quote> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let quote = load_required_quote(&tx, id)?;
        if !quote.is_current {
            clear_current_flag(&tx, quote.equipment_id)?;
            tx.execute(
                "UPDATE quotes SET is_current = 1 WHERE uuid = ?1;",
                [id.to_string()],
            )?;
        }
        let quote = load_required_quote(&tx, id)?;
        tx.commit()?;
        Ok(quote)
    }

    fn delete_quote(&self, id: QuoteId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "quotes", id)? {
            return Err(RepoError::not_found(EntityKind::Quote, id));
        }
        let references = query_tag_refs(&tx, LINKED_REFS_SQL, id)?;
        if !references.is_empty() {
            return Err(ConflictError::QuoteInUse {
                quote_id: id,
                references,
            }
            .into());
        }
        tx.execute("DELETE FROM quotes WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}

fn clear_current_flag(conn: &Connection, equipment_id: EquipmentId) -> RepoResult<()> {
    conn.execute(
        "UPDATE quotes
         SET is_current = 0
         WHERE equipment_uuid = ?1
           AND is_current = 1;",
        [equipment_id.to_string()],
    )?;
    Ok(())
}

fn load_required_quote(conn: &Connection, id: QuoteId) -> RepoResult<Quote> {
    let mut stmt = conn.prepare(&format!("{QUOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_quote_row(row);
    }
    Err(RepoError::not_found(EntityKind::Quote, id))
}

fn parse_quote_row(row: &Row<'_>) -> RepoResult<Quote> {
    let uuid_text: String = row.get("uuid")?;
    let equipment_text: String = row.get("equipment_uuid")?;
    Ok(Quote {
        id: parse_uuid(&uuid_text, "quotes.uuid")?,
        equipment_id: parse_uuid(&equipment_text, "quotes.equipment_uuid")?,
        vendor: row.get("vendor")?,
        price: row.get("price")?,
        currency: row.get("currency")?,
        lead_time_weeks: optional_u32(row.get("lead_time_weeks")?, "quotes.lead_time_weeks")?,
        quote_date: row.get("quote_date")?,
        quote_number: row.get("quote_number")?,
        file_path: row.get("file_path")?,
        validity_notes: row.get("validity_notes")?,
        is_current: int_to_bool(row.get("is_current")?, "quotes.is_current")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}
