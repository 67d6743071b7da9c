//! REST endpoints for task lists, bucket views, and task CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthWorker, require_auth};
use crate::error::{DatabaseError, Error, ValidationError};
use crate::state::AppState;
use crate::tasks::model::{BoardCounts, NewTask, Priority, Task, TaskType, TaskUpdate};
use crate::tasks::query::TaskQuery;

/// Build the task routes.
///
/// The index and the task-type listing are open; bucket views and all
/// mutations require an authenticated worker.
pub fn task_routes(state: AppState) -> Router {
    let open = Router::new()
        .route("/health", get(health))
        .route("/api/tasks", get(index))
        .route("/api/task-types", get(list_task_types));

    let authed = Router::new()
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/critical", get(critical_tasks))
        .route("/api/tasks/important", get(important_tasks))
        .route("/api/tasks/normal", get(normal_tasks))
        .route("/api/tasks/low", get(low_tasks))
        .route("/api/tasks/today", get(today_tasks))
        .route("/api/tasks/mine", get(my_tasks))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/complete", post(complete_task))
        .route("/api/task-types", post(create_task_type))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open.merge(authed).with_state(state)
}

/// Optional query parameters accepted by every list view.
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    /// Case-insensitive substring filter on task names.
    name: Option<String>,
}

/// Index payload: all tasks plus global board context.
#[derive(Debug, Serialize)]
struct IndexResponse {
    tasks: Vec<Task>,
    counts: BoardCounts,
    priorities: Vec<Priority>,
}

#[derive(Debug, Deserialize)]
struct NewTaskType {
    name: String,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "taskboard"
    }))
}

fn task_not_found(id: Uuid) -> Error {
    DatabaseError::NotFound {
        entity: "task".to_string(),
        id: id.to_string(),
    }
    .into()
}

// ── List views ──────────────────────────────────────────────────────

/// GET /api/tasks
///
/// The open index: every task in name order plus global counts,
/// irrespective of assignment.
async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<IndexResponse>, Error> {
    let query = TaskQuery::all().with_name_filter(params.name.as_deref());
    let tasks = state.db.list_tasks(&query).await?;
    let counts = state.db.counts().await?;
    Ok(Json(IndexResponse {
        tasks,
        counts,
        priorities: Priority::all().to_vec(),
    }))
}

/// Shared implementation for the authenticated bucket views.
async fn list_bucket(
    state: &AppState,
    query: TaskQuery,
    params: &ListParams,
) -> Result<Json<Vec<Task>>, Error> {
    let query = query.with_name_filter(params.name.as_deref());
    Ok(Json(state.db.list_tasks(&query).await?))
}

/// GET /api/tasks/critical
async fn critical_tasks(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, Error> {
    list_bucket(&state, TaskQuery::bucket(Priority::Critical, me.id), &params).await
}

/// GET /api/tasks/important
async fn important_tasks(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, Error> {
    list_bucket(&state, TaskQuery::bucket(Priority::Important, me.id), &params).await
}

/// GET /api/tasks/normal
async fn normal_tasks(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, Error> {
    list_bucket(&state, TaskQuery::bucket(Priority::Normal, me.id), &params).await
}

/// GET /api/tasks/low
async fn low_tasks(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, Error> {
    list_bucket(&state, TaskQuery::bucket(Priority::Low, me.id), &params).await
}

/// GET /api/tasks/today — tasks whose deadline is the current date.
async fn today_tasks(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, Error> {
    let today = Utc::now().date_naive();
    list_bucket(&state, TaskQuery::due_on(today, me.id), &params).await
}

/// GET /api/tasks/mine — every task assigned to the caller.
async fn my_tasks(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, Error> {
    list_bucket(&state, TaskQuery::assigned_to(me.id), &params).await
}

// ── CRUD ────────────────────────────────────────────────────────────

/// GET /api/tasks/{id}
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, Error> {
    match state.db.get_task(id).await? {
        Some(task) => Ok(Json(task)),
        None => Err(task_not_found(id)),
    }
}

/// POST /api/tasks
async fn create_task(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Json(payload): Json<NewTask>,
) -> Result<impl IntoResponse, Error> {
    let task = payload.into_task()?;
    state.db.insert_task(&task).await?;
    info!(task_id = %task.id, name = %task.name, created_by = %me.username, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/{id}
///
/// Partial update. Any authenticated worker may edit any task —
/// tasks are shared across the team.
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, Error> {
    let Some(mut task) = state.db.get_task(id).await? else {
        return Err(task_not_found(id));
    };

    update.apply_to(&mut task)?;
    state.db.update_task(&task).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Error> {
    if !state.db.delete_task(id).await? {
        return Err(task_not_found(id));
    }
    info!(task_id = %id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tasks/{id}/complete
async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, Error> {
    let Some(mut task) = state.db.get_task(id).await? else {
        return Err(task_not_found(id));
    };

    task.is_completed = true;
    task.updated_at = Utc::now();
    state.db.update_task(&task).await?;
    Ok(Json(task))
}

// ── Task types ──────────────────────────────────────────────────────

/// GET /api/task-types — selectable context for the task form.
async fn list_task_types(State(state): State<AppState>) -> Result<Json<Vec<TaskType>>, Error> {
    Ok(Json(state.db.list_task_types().await?))
}

/// POST /api/task-types
async fn create_task_type(
    State(state): State<AppState>,
    Json(payload): Json<NewTaskType>,
) -> Result<impl IntoResponse, Error> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ValidationError::field("name", "must not be empty").into());
    }

    let task_type = TaskType {
        id: Uuid::new_v4(),
        name: name.to_string(),
    };
    state.db.insert_task_type(&task_type).await?;
    Ok((StatusCode::CREATED, Json(task_type)))
}
