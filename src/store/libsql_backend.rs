//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. Task-list filtering is
//! rendered from a [`TaskQuery`] into a parameterized WHERE clause here,
//! so the SQL stays in one place.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Connection, Database as LibSqlDatabase, Value, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Session;
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::Database;
use crate::tasks::model::{BoardCounts, Priority, Task, TaskType};
use crate::tasks::query::TaskQuery;
use crate::workers::model::{Position, Profile, Worker};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_db(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::from_db(db).await
    }

    async fn from_db(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        // Cascading deletes in the schema rely on this pragma.
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to enable foreign keys: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn count_one(&self, sql: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn()
            .query(sql, ())
            .await
            .map_err(|e| DatabaseError::Query(format!("count: {e}")))?;
        match rows.next().await {
            Ok(Some(row)) => {
                let n: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("count parse: {e}")))?;
                Ok(n.max(0) as u64)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count: {e}"))),
        }
    }

    /// Load assignee sets for the given task ids, keyed by task id.
    async fn load_assignees(
        &self,
        task_ids: &[String],
    ) -> Result<HashMap<String, Vec<Uuid>>, DatabaseError> {
        let mut map: HashMap<String, Vec<Uuid>> = HashMap::new();
        if task_ids.is_empty() {
            return Ok(map);
        }

        let mut rows = self
            .conn()
            .query(
                "SELECT task_id, worker_id FROM task_assignees ORDER BY task_id, worker_id",
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("load_assignees: {e}")))?;

        while let Ok(Some(row)) = rows.next().await {
            let task_id: String = row
                .get(0)
                .map_err(|e| DatabaseError::Query(format!("load_assignees parse: {e}")))?;
            if !task_ids.contains(&task_id) {
                continue;
            }
            let worker_id: String = row
                .get(1)
                .map_err(|e| DatabaseError::Query(format!("load_assignees parse: {e}")))?;
            map.entry(task_id).or_default().push(parse_uuid(&worker_id));
        }
        Ok(map)
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 datetime string (our canonical write format).
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::MIN_UTC)
}

/// Parse a `YYYY-MM-DD` date string.
fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_else(|_| Uuid::nil())
}

/// Convert `Option<Uuid>` to a libsql Value.
fn opt_uuid(id: Option<Uuid>) -> Value {
    match id {
        Some(id) => Value::Text(id.to_string()),
        None => Value::Null,
    }
}

/// Render a [`TaskQuery`] into a WHERE clause and its parameters.
///
/// Predicates are ANDed in a fixed order; parameter placeholders are
/// numbered to match. An empty query renders an empty clause.
fn render_task_query(query: &TaskQuery) -> (String, Vec<Value>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(priority) = query.priority {
        values.push(Value::Text(priority.as_str().to_string()));
        conditions.push(format!("t.priority = ?{}", values.len()));
    }
    if let Some(due_on) = query.due_on {
        values.push(Value::Text(due_on.to_string()));
        conditions.push(format!("t.deadline = ?{}", values.len()));
    }
    if let Some(assignee) = query.assignee {
        values.push(Value::Text(assignee.to_string()));
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM task_assignees ta \
             WHERE ta.task_id = t.id AND ta.worker_id = ?{})",
            values.len()
        ));
    }
    if let Some(ref name) = query.name_contains {
        values.push(Value::Text(name.clone()));
        conditions.push(format!("instr(lower(t.name), lower(?{})) > 0", values.len()));
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

/// Map a constraint failure onto `DatabaseError::Constraint`, everything
/// else onto `Query`.
fn map_write_error(context: &str, e: libsql::Error) -> DatabaseError {
    let text = e.to_string();
    if text.contains("UNIQUE constraint") || text.contains("FOREIGN KEY constraint") {
        DatabaseError::Constraint(format!("{context}: {text}"))
    } else {
        DatabaseError::Query(format!("{context}: {text}"))
    }
}

// ── Row mappers ─────────────────────────────────────────────────────

const WORKER_COLUMNS: &str = "id, username, first_name, last_name, position_id, created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, worker_id, avatar, bio, phone, address, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, name, description, priority, deadline, is_completed, task_type_id, created_at, updated_at";

fn row_to_worker(row: &libsql::Row) -> Result<Worker, libsql::Error> {
    let id: String = row.get(0)?;
    let position_id: Option<String> = row.get(4).ok();
    let created_str: String = row.get(5)?;
    let updated_str: String = row.get(6)?;

    Ok(Worker {
        id: parse_uuid(&id),
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        position_id: position_id.as_deref().map(parse_uuid),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn row_to_profile(row: &libsql::Row) -> Result<Profile, libsql::Error> {
    let id: String = row.get(0)?;
    let worker_id: String = row.get(1)?;
    let created_str: String = row.get(6)?;
    let updated_str: String = row.get(7)?;

    Ok(Profile {
        id: parse_uuid(&id),
        worker_id: parse_uuid(&worker_id),
        avatar: row.get(2)?,
        bio: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

/// Map a task row. Assignees are loaded separately.
fn row_to_task(row: &libsql::Row) -> Result<Task, libsql::Error> {
    let id: String = row.get(0)?;
    let priority_str: String = row.get(3)?;
    let deadline_str: String = row.get(4)?;
    let is_completed: i64 = row.get(5)?;
    let task_type_id: Option<String> = row.get(6).ok();
    let created_str: String = row.get(7)?;
    let updated_str: String = row.get(8)?;

    Ok(Task {
        id: parse_uuid(&id),
        name: row.get(1)?,
        description: row.get(2)?,
        priority: priority_str.parse().unwrap_or(Priority::Normal),
        deadline: parse_date(&deadline_str),
        is_completed: is_completed != 0,
        task_type_id: task_type_id.as_deref().map(parse_uuid),
        assignees: Vec::new(),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn row_to_session(row: &libsql::Row) -> Result<Session, libsql::Error> {
    let worker_id: String = row.get(1)?;
    let created_str: String = row.get(2)?;
    let expires_str: String = row.get(3)?;

    Ok(Session {
        token_hash: row.get(0)?,
        worker_id: parse_uuid(&worker_id),
        created_at: parse_datetime(&created_str),
        expires_at: parse_datetime(&expires_str),
    })
}

fn row_to_lookup(row: &libsql::Row) -> Result<(Uuid, String), libsql::Error> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    Ok((parse_uuid(&id), name))
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Workers ─────────────────────────────────────────────────────

    async fn insert_worker(
        &self,
        worker: &Worker,
        password_hash: &str,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO workers (id, username, password_hash, first_name, last_name, \
                 position_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    worker.id.to_string(),
                    worker.username.clone(),
                    password_hash,
                    worker.first_name.clone(),
                    worker.last_name.clone(),
                    opt_uuid(worker.position_id),
                    worker.created_at.to_rfc3339(),
                    worker.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| map_write_error("insert_worker", e))?;

        debug!(worker_id = %worker.id, username = %worker.username, "Worker inserted into DB");
        Ok(())
    }

    async fn get_worker(&self, id: Uuid) -> Result<Option<Worker>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {WORKER_COLUMNS} FROM workers WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_worker: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let worker = row_to_worker(&row)
                    .map_err(|e| DatabaseError::Query(format!("get_worker row parse: {e}")))?;
                Ok(Some(worker))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_worker: {e}"))),
        }
    }

    async fn get_worker_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(Worker, String)>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {WORKER_COLUMNS}, password_hash FROM workers WHERE username = ?1"
                ),
                params![username],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_worker_by_username: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let worker = row_to_worker(&row).map_err(|e| {
                    DatabaseError::Query(format!("get_worker_by_username row parse: {e}"))
                })?;
                let hash: String = row.get(7).map_err(|e| {
                    DatabaseError::Query(format!("get_worker_by_username hash parse: {e}"))
                })?;
                Ok(Some((worker, hash)))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_worker_by_username: {e}"))),
        }
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {WORKER_COLUMNS} FROM workers ORDER BY username ASC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_workers: {e}")))?;

        let mut workers = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_worker(&row) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    tracing::warn!("Skipping worker row: {e}");
                }
            }
        }
        Ok(workers)
    }

    async fn update_worker(&self, worker: &Worker) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE workers SET username = ?1, first_name = ?2, last_name = ?3, \
                 position_id = ?4, updated_at = ?5 WHERE id = ?6",
                params![
                    worker.username.clone(),
                    worker.first_name.clone(),
                    worker.last_name.clone(),
                    opt_uuid(worker.position_id),
                    worker.updated_at.to_rfc3339(),
                    worker.id.to_string(),
                ],
            )
            .await
            .map_err(|e| map_write_error("update_worker", e))?;
        Ok(())
    }

    // ── Profiles ────────────────────────────────────────────────────

    async fn insert_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO profiles (id, worker_id, avatar, bio, phone, address, \
                 created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    profile.id.to_string(),
                    profile.worker_id.to_string(),
                    profile.avatar.clone(),
                    profile.bio.clone(),
                    profile.phone.clone(),
                    profile.address.clone(),
                    profile.created_at.to_rfc3339(),
                    profile.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| map_write_error("insert_profile", e))?;

        debug!(profile_id = %profile.id, worker_id = %profile.worker_id, "Profile inserted into DB");
        Ok(())
    }

    async fn get_profile_by_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<Profile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE worker_id = ?1"),
                params![worker_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile_by_worker: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let profile = row_to_profile(&row).map_err(|e| {
                    DatabaseError::Query(format!("get_profile_by_worker row parse: {e}"))
                })?;
                Ok(Some(profile))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile_by_worker: {e}"))),
        }
    }

    async fn update_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE profiles SET avatar = ?1, bio = ?2, phone = ?3, address = ?4, \
                 updated_at = ?5 WHERE id = ?6",
                params![
                    profile.avatar.clone(),
                    profile.bio.clone(),
                    profile.phone.clone(),
                    profile.address.clone(),
                    profile.updated_at.to_rfc3339(),
                    profile.id.to_string(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_profile: {e}")))?;
        Ok(())
    }

    // ── Lookups ─────────────────────────────────────────────────────

    async fn insert_position(&self, position: &Position) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO positions (id, name) VALUES (?1, ?2)",
                params![position.id.to_string(), position.name.clone()],
            )
            .await
            .map_err(|e| map_write_error("insert_position", e))?;
        Ok(())
    }

    async fn list_positions(&self) -> Result<Vec<Position>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, name FROM positions ORDER BY name ASC", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("list_positions: {e}")))?;

        let mut positions = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            if let Ok((id, name)) = row_to_lookup(&row) {
                positions.push(Position { id, name });
            }
        }
        Ok(positions)
    }

    async fn insert_task_type(&self, task_type: &TaskType) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO task_types (id, name) VALUES (?1, ?2)",
                params![task_type.id.to_string(), task_type.name.clone()],
            )
            .await
            .map_err(|e| map_write_error("insert_task_type", e))?;
        Ok(())
    }

    async fn list_task_types(&self) -> Result<Vec<TaskType>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, name FROM task_types ORDER BY name ASC", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("list_task_types: {e}")))?;

        let mut task_types = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            if let Ok((id, name)) = row_to_lookup(&row) {
                task_types.push(TaskType { id, name });
            }
        }
        Ok(task_types)
    }

    // ── Tasks ───────────────────────────────────────────────────────

    async fn insert_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO tasks (id, name, description, priority, deadline, is_completed, \
                 task_type_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    task.id.to_string(),
                    task.name.clone(),
                    task.description.clone(),
                    task.priority.as_str(),
                    task.deadline.to_string(),
                    task.is_completed as i64,
                    opt_uuid(task.task_type_id),
                    task.created_at.to_rfc3339(),
                    task.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| map_write_error("insert_task", e))?;

        for worker_id in &task.assignees {
            self.conn()
                .execute(
                    "INSERT OR IGNORE INTO task_assignees (task_id, worker_id) VALUES (?1, ?2)",
                    params![task.id.to_string(), worker_id.to_string()],
                )
                .await
                .map_err(|e| map_write_error("insert_task assignee", e))?;
        }

        debug!(task_id = %task.id, name = %task.name, "Task inserted into DB");
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_task: {e}")))?;

        let mut task = match rows.next().await {
            Ok(Some(row)) => row_to_task(&row)
                .map_err(|e| DatabaseError::Query(format!("get_task row parse: {e}")))?,
            Ok(None) => return Ok(None),
            Err(e) => return Err(DatabaseError::Query(format!("get_task: {e}"))),
        };

        let assignees = self.load_assignees(&[task.id.to_string()]).await?;
        task.assignees = assignees.get(&task.id.to_string()).cloned().unwrap_or_default();
        Ok(Some(task))
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, DatabaseError> {
        let (where_clause, values) = render_task_query(query);
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t{where_clause} \
             ORDER BY t.name COLLATE NOCASE ASC"
        );

        let mut rows = self
            .conn()
            .query(&sql, values)
            .await
            .map_err(|e| DatabaseError::Query(format!("list_tasks: {e}")))?;

        let mut tasks = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_task(&row) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    tracing::warn!("Skipping task row: {e}");
                }
            }
        }

        let ids: Vec<String> = tasks.iter().map(|t| t.id.to_string()).collect();
        let assignees = self.load_assignees(&ids).await?;
        for task in &mut tasks {
            task.assignees = assignees.get(&task.id.to_string()).cloned().unwrap_or_default();
        }
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE tasks SET name = ?1, description = ?2, priority = ?3, deadline = ?4, \
                 is_completed = ?5, task_type_id = ?6, updated_at = ?7 WHERE id = ?8",
                params![
                    task.name.clone(),
                    task.description.clone(),
                    task.priority.as_str(),
                    task.deadline.to_string(),
                    task.is_completed as i64,
                    opt_uuid(task.task_type_id),
                    task.updated_at.to_rfc3339(),
                    task.id.to_string(),
                ],
            )
            .await
            .map_err(|e| map_write_error("update_task", e))?;

        // Replace the assignee set wholesale.
        self.conn()
            .execute(
                "DELETE FROM task_assignees WHERE task_id = ?1",
                params![task.id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_task assignees: {e}")))?;
        for worker_id in &task.assignees {
            self.conn()
                .execute(
                    "INSERT OR IGNORE INTO task_assignees (task_id, worker_id) VALUES (?1, ?2)",
                    params![task.id.to_string(), worker_id.to_string()],
                )
                .await
                .map_err(|e| map_write_error("update_task assignee", e))?;
        }

        debug!(task_id = %task.id, "Task updated in DB");
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let affected = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_task: {e}")))?;

        if affected > 0 {
            debug!(task_id = %id, "Task deleted from DB");
        }
        Ok(affected > 0)
    }

    async fn counts(&self) -> Result<BoardCounts, DatabaseError> {
        Ok(BoardCounts {
            tasks: self.count_one("SELECT COUNT(*) FROM tasks").await?,
            workers: self.count_one("SELECT COUNT(*) FROM workers").await?,
            positions: self.count_one("SELECT COUNT(*) FROM positions").await?,
            task_types: self.count_one("SELECT COUNT(*) FROM task_types").await?,
        })
    }

    // ── Sessions ────────────────────────────────────────────────────

    async fn insert_session(&self, session: &Session) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO sessions (token_hash, worker_id, created_at, expires_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token_hash.clone(),
                    session.worker_id.to_string(),
                    session.created_at.to_rfc3339(),
                    session.expires_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| map_write_error("insert_session", e))?;
        Ok(())
    }

    async fn get_session(&self, token_hash: &str) -> Result<Option<Session>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT token_hash, worker_id, created_at, expires_at FROM sessions \
                 WHERE token_hash = ?1",
                params![token_hash],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_session: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let session = row_to_session(&row)
                    .map_err(|e| DatabaseError::Query(format!("get_session row parse: {e}")))?;
                Ok(Some(session))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_session: {e}"))),
        }
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "DELETE FROM sessions WHERE token_hash = ?1",
                params![token_hash],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_session: {e}")))?;
        Ok(())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![now.to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("purge_expired_sessions: {e}")))?;
        Ok(affected as usize)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
