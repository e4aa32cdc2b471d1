//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects and the single active-project flag.
//! - Cascade project deletion to its project equipment rows.
//!
//! # Invariants
//! - After every committed write at most one row has `is_active = 1`
//!   (also backed by a partial unique index).
//! - Clearing the old active flag and setting the new one share one transaction.
//! - Deleting a project never touches catalog or quote rows.

use crate::model::project::{Project, ProjectDraft, ProjectId};
use crate::repo::error::{ConflictError, EntityKind, RepoError, RepoResult};
use crate::repo::{bool_to_int, int_to_bool, is_unique_violation, parse_uuid, row_exists};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    client,
    job_number,
    phase,
    notes,
    is_active,
    created_at
FROM projects";

/// Repository interface for projects.
pub trait ProjectRepository {
    /// Inserts a project; it becomes active when it is the only project.
    fn create_project(&self, draft: &ProjectDraft) -> RepoResult<Project>;
    /// Replaces editable fields; leaves `is_active` untouched.
    fn update_project(&self, id: ProjectId, draft: &ProjectDraft) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// All projects in creation order.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn active_project(&self) -> RepoResult<Option<Project>>;
    /// Clears the flag everywhere else and sets it on `id`.
    fn set_active_project(&self, id: ProjectId) -> RepoResult<Project>;
    /// Deletes the project and its equipment rows; returns the row count removed.
    fn delete_project(&self, id: ProjectId) -> RepoResult<usize>;
}

/// SQLite-backed project repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, draft: &ProjectDraft) -> RepoResult<Project> {
        let draft = draft.validate()?;
        let id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_job_number_free(&tx, draft.job_number.as_deref(), None)?;

        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))?;
        let is_active = existing == 0;

        tx.execute(
            "INSERT INTO projects (
                uuid,
                name,
                client,
                job_number,
                phase,
                notes,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                draft.name.as_str(),
                draft.client.as_deref(),
                draft.job_number.as_deref(),
                draft.phase.as_deref(),
                draft.notes.as_deref(),
                bool_to_int(is_active),
            ],
        )
        .map_err(|err| map_job_number_violation(err, draft.job_number.as_deref()))?;

        let project = load_required_project(&tx, id)?;
        tx.commit()?;
        Ok(project)
    }

    fn update_project(&self, id: ProjectId, draft: &ProjectDraft) -> RepoResult<Project> {
        let draft = draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "projects", id)? {
            return Err(RepoError::not_found(EntityKind::Project, id));
        }
        ensure_job_number_free(&tx, draft.job_number.as_deref(), Some(id))?;

        tx.execute(
            "UPDATE projects
             SET
                name = ?2,
                client = ?3,
                job_number = ?4,
                phase = ?5,
                notes = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                draft.name.as_str(),
                draft.client.as_deref(),
                draft.job_number.as_deref(),
                draft.phase.as_deref(),
                draft.notes.as_deref(),
            ],
        )
        .map_err(|err| map_job_number_violation(err, draft.job_number.as_deref()))?;

        let project = load_required_project(&tx, id)?;
        tx.commit()?;
        Ok(project)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn active_project(&self) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE is_active = 1;"))?;
        let mut rows = stmt.query([])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let project = parse_project_row(row)?;
        if rows.next()?.is_some() {
            return Err(RepoError::InvalidData(
                "more than one project has is_active = 1".to_string(),
            ));
        }
        Ok(Some(project))
    }

    fn set_active_project(&self, id: ProjectId) -> RepoResult<Project> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "projects", id)? {
            return Err(RepoError::not_found(EntityKind::Project, id));
        }

        // Clear first: the partial unique index rejects two active rows even
        // mid-transaction.
        tx.execute(
            "UPDATE projects
             SET
                is_active = 0,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE is_active = 1
               AND uuid <> ?1;",
            [id.to_string()],
        )?;
        tx.execute(
            "UPDATE projects
             SET
                is_active = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_active = 0;",
            [id.to_string()],
        )?;

        let project = load_required_project(&tx, id)?;
        tx.commit()?;
        Ok(project)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "projects", id)? {
            return Err(RepoError::not_found(EntityKind::Project, id));
        }

        let removed_rows = tx.execute(
            "DELETE FROM project_equipment WHERE project_uuid = ?1;",
            [id.to_string()],
        )?;
        tx.execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;

        tx.commit()?;
        Ok(removed_rows)
    }
}

fn ensure_job_number_free(
    conn: &Connection,
    job_number: Option<&str>,
    except: Option<ProjectId>,
) -> RepoResult<()> {
    let Some(job_number) = job_number else {
        return Ok(());
    };
    let taken: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM projects
            WHERE job_number = ?1 COLLATE NOCASE
              AND (?2 IS NULL OR uuid <> ?2)
        );",
        params![job_number, except.map(|value| value.to_string())],
        |row| row.get(0),
    )?;
    if taken == 1 {
        return Err(ConflictError::DuplicateJobNumber(job_number.to_string()).into());
    }
    Ok(())
}

fn map_job_number_violation(err: rusqlite::Error, job_number: Option<&str>) -> RepoError {
    match job_number {
        Some(job_number) if is_unique_violation(&err) => {
            ConflictError::DuplicateJobNumber(job_number.to_string()).into()
        }
        _ => err.into(),
    }
}

fn load_required_project(conn: &Connection, id: ProjectId) -> RepoResult<Project> {
    let mut stmt = conn.prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_project_row(row);
    }
    Err(RepoError::not_found(EntityKind::Project, id))
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name for project `{uuid_text}`"
        )));
    }
    Ok(Project {
        id: parse_uuid(&uuid_text, "projects.uuid")?,
        name,
        client: row.get("client")?,
        job_number: row.get("job_number")?,
        phase: row.get("phase")?,
        notes: row.get("notes")?,
        is_active: int_to_bool(row.get("is_active")?, "projects.is_active")?,
        created_at: row.get("created_at")?,
    })
}
