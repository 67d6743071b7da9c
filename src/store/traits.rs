//! Unified `Database` trait — single async interface for all persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Session;
use crate::error::DatabaseError;
use crate::tasks::model::{BoardCounts, Task, TaskType};
use crate::tasks::query::TaskQuery;
use crate::workers::model::{Position, Profile, Worker};

/// Backend-agnostic database trait covering workers, profiles, tasks,
/// lookups, and sessions.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Workers ─────────────────────────────────────────────────────

    /// Insert a new worker with its password hash.
    async fn insert_worker(&self, worker: &Worker, password_hash: &str)
    -> Result<(), DatabaseError>;

    /// Get a worker by ID.
    async fn get_worker(&self, id: Uuid) -> Result<Option<Worker>, DatabaseError>;

    /// Look up a worker and its password hash by username.
    async fn get_worker_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(Worker, String)>, DatabaseError>;

    /// List all workers in username order.
    async fn list_workers(&self) -> Result<Vec<Worker>, DatabaseError>;

    /// Persist changes to an existing worker.
    async fn update_worker(&self, worker: &Worker) -> Result<(), DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Insert a new profile.
    async fn insert_profile(&self, profile: &Profile) -> Result<(), DatabaseError>;

    /// Get the profile owned by a worker.
    async fn get_profile_by_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<Profile>, DatabaseError>;

    /// Persist changes to an existing profile.
    async fn update_profile(&self, profile: &Profile) -> Result<(), DatabaseError>;

    // ── Lookups ─────────────────────────────────────────────────────

    /// Insert a new position.
    async fn insert_position(&self, position: &Position) -> Result<(), DatabaseError>;

    /// List all positions in name order.
    async fn list_positions(&self) -> Result<Vec<Position>, DatabaseError>;

    /// Insert a new task type.
    async fn insert_task_type(&self, task_type: &TaskType) -> Result<(), DatabaseError>;

    /// List all task types in name order.
    async fn list_task_types(&self) -> Result<Vec<TaskType>, DatabaseError>;

    // ── Tasks ───────────────────────────────────────────────────────

    /// Insert a new task along with its assignee set.
    async fn insert_task(&self, task: &Task) -> Result<(), DatabaseError>;

    /// Get a task by ID.
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, DatabaseError>;

    /// List tasks matching the given query, in name order.
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, DatabaseError>;

    /// Persist changes to an existing task (fields and assignee set).
    async fn update_task(&self, task: &Task) -> Result<(), DatabaseError>;

    /// Delete a task. Returns false if no such task existed.
    async fn delete_task(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Global entity counts for the index view.
    async fn counts(&self) -> Result<BoardCounts, DatabaseError>;

    // ── Sessions ────────────────────────────────────────────────────

    /// Insert a new session.
    async fn insert_session(&self, session: &Session) -> Result<(), DatabaseError>;

    /// Look up a session by its token hash.
    async fn get_session(&self, token_hash: &str) -> Result<Option<Session>, DatabaseError>;

    /// Delete a session (logout). No-op if absent.
    async fn delete_session(&self, token_hash: &str) -> Result<(), DatabaseError>;

    /// Delete sessions expired as of `now`. Returns the number removed.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError>;
}
