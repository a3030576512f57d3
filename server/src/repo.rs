//! Data access over the `todos` table.
//!
//! # Invariants
//! - Write paths validate `TodoFields` before any SQL runs.
//! - Read paths reject rows that do not describe a valid todo instead of
//!   masking them; those surface as storage errors.
//! - Update overwrites every mutable field. `id` and `created_at` never change.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use todo_core::{Priority, Status, Todo, TodoFields, TodoId, ValidationError};
use tracing::debug;

use crate::store::{StoreError, TodoStore};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    task,
    priority,
    status,
    due_date,
    client,
    tags,
    created_at
FROM todos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome of a failed data access operation.
///
/// `Validation` and `NotFound` will fail again if repeated unchanged;
/// `Storage` may succeed on retry.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("todo with id {0} not found")]
    NotFound(TodoId),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(StoreError::Sqlite(value))
    }
}

/// CRUD contract for todo records.
pub trait TodoRepository: Send + Sync {
    /// Every record, ordered by id.
    fn list_all(&self) -> RepoResult<Vec<Todo>>;
    /// Records whose `client` equals `client` exactly; empty when none do.
    fn list_by_client(&self, client: &str) -> RepoResult<Vec<Todo>>;
    fn get(&self, id: TodoId) -> RepoResult<Todo>;
    fn create(&self, fields: TodoFields) -> RepoResult<Todo>;
    fn update(&self, id: TodoId, fields: TodoFields) -> RepoResult<Todo>;
    fn delete(&self, id: TodoId) -> RepoResult<()>;
}

impl TodoRepository for TodoStore {
    fn list_all(&self) -> RepoResult<Vec<Todo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} ORDER BY id;"))?;
            let mut rows = stmt.query([])?;
            collect_rows(&mut rows)
        })
    }

    fn list_by_client(&self, client: &str) -> RepoResult<Vec<Todo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} WHERE client = ?1 ORDER BY id;"))?;
            let mut rows = stmt.query(params![client])?;
            collect_rows(&mut rows)
        })
    }

    fn get(&self, id: TodoId) -> RepoResult<Todo> {
        self.with_conn(|conn| fetch(conn, id)?.ok_or(RepoError::NotFound(id)))
    }

    fn create(&self, fields: TodoFields) -> RepoResult<Todo> {
        let fields = fields.validate()?;
        let tags = encode_tags(&fields.tags)?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO todos (
                    task,
                    priority,
                    status,
                    due_date,
                    client,
                    tags,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    fields.task,
                    fields.priority.as_str(),
                    fields.status.as_str(),
                    fields.due_date.map(|d| d.to_string()),
                    fields.client,
                    tags,
                    created_at,
                ],
            )?;
            let id = conn.last_insert_rowid();
            debug!(id, "todo created");
            fetch(conn, id)?.ok_or(RepoError::NotFound(id))
        })
    }

    fn update(&self, id: TodoId, fields: TodoFields) -> RepoResult<Todo> {
        let fields = fields.validate()?;
        let tags = encode_tags(&fields.tags)?;

        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE todos
                 SET
                    task = ?1,
                    priority = ?2,
                    status = ?3,
                    due_date = ?4,
                    client = ?5,
                    tags = ?6
                 WHERE id = ?7;",
                params![
                    fields.task,
                    fields.priority.as_str(),
                    fields.status.as_str(),
                    fields.due_date.map(|d| d.to_string()),
                    fields.client,
                    tags,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(id));
            }
            debug!(id, "todo updated");
            fetch(conn, id)?.ok_or(RepoError::NotFound(id))
        })
    }

    fn delete(&self, id: TodoId) -> RepoResult<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM todos WHERE id = ?1;", params![id])?;
            if changed == 0 {
                return Err(RepoError::NotFound(id));
            }
            debug!(id, "todo deleted");
            Ok(())
        })
    }
}

fn fetch(conn: &Connection, id: TodoId) -> RepoResult<Option<Todo>> {
    let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
    let raw = stmt.query_row(params![id], RawTodo::from_row).optional()?;
    raw.map(RawTodo::into_todo).transpose()
}

fn collect_rows(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Todo>> {
    let mut todos = Vec::new();
    while let Some(row) = rows.next()? {
        todos.push(RawTodo::from_row(row)?.into_todo()?);
    }
    Ok(todos)
}

fn encode_tags(tags: &[String]) -> RepoResult<String> {
    serde_json::to_string(tags)
        .map_err(|e| RepoError::Storage(StoreError::InvalidData(format!("tags: {e}"))))
}

/// A row as stored, before its text columns are checked.
struct RawTodo {
    id: TodoId,
    task: String,
    priority: String,
    status: String,
    due_date: Option<String>,
    client: Option<String>,
    tags: String,
    created_at: String,
}

impl RawTodo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            task: row.get(1)?,
            priority: row.get(2)?,
            status: row.get(3)?,
            due_date: row.get(4)?,
            client: row.get(5)?,
            tags: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_todo(self) -> RepoResult<Todo> {
        let id = self.id;
        let invalid = |what: &str, detail: String| {
            RepoError::Storage(StoreError::InvalidData(format!("todo {id} {what}: {detail}")))
        };

        let priority: Priority = self
            .priority
            .parse()
            .map_err(|e: ValidationError| invalid("priority", e.to_string()))?;
        let status: Status = self
            .status
            .parse()
            .map_err(|e: ValidationError| invalid("status", e.to_string()))?;
        let due_date = self
            .due_date
            .map(|d| d.parse::<NaiveDate>())
            .transpose()
            .map_err(|e| invalid("due_date", e.to_string()))?;
        let tags: Vec<String> =
            serde_json::from_str(&self.tags).map_err(|e| invalid("tags", e.to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| invalid("created_at", e.to_string()))?
            .with_timezone(&Utc);

        Ok(Todo {
            id,
            task: self.task,
            priority,
            status,
            due_date,
            client: self.client,
            tags,
            created_at,
        })
    }
}
