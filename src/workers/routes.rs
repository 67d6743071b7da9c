//! REST endpoints for sign-up, login, workers, profiles, and positions.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router, middleware};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, AuthWorker, require_auth};
use crate::error::{AuthError, DatabaseError, Error, ValidationError};
use crate::state::AppState;
use crate::workers::model::{
    Credentials, NewWorker, Position, Profile, ProfileUpdate, Worker, WorkerUpdate,
};
use crate::workers::provision::{provision_profile, sync_profile};

/// Build the worker/auth routes.
///
/// Sign-up, login, and the positions listing are open (they back the
/// sign-up form); everything else sits behind the auth middleware.
pub fn worker_routes(state: AppState) -> Router {
    let open = Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/login", post(login))
        .route("/api/positions", get(list_positions));

    let authed = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/workers", get(list_workers))
        .route("/api/workers/me", put(update_me))
        .route("/api/workers/{id}", get(get_worker))
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/positions", post(create_position))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    open.merge(authed).with_state(state)
}

/// Token + worker pair returned by sign-up and login.
#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    worker: Worker,
}

/// Worker detail with its profile.
#[derive(Debug, Serialize)]
struct WorkerDetail {
    worker: Worker,
    profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct NewPosition {
    name: String,
}

// ── Auth ────────────────────────────────────────────────────────────

/// POST /api/auth/signup
///
/// Creates a worker, provisions its profile, and issues a session token.
async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<NewWorker>,
) -> Result<impl IntoResponse, Error> {
    let (worker, password) = payload.into_worker()?;

    if state
        .db
        .get_worker_by_username(&worker.username)
        .await?
        .is_some()
    {
        return Err(ValidationError::AlreadyExists {
            entity: "worker".to_string(),
            field: "username".to_string(),
            value: worker.username.clone(),
        }
        .into());
    }

    let password_hash = auth::hash_password(password.expose_secret());
    state.db.insert_worker(&worker, &password_hash).await?;

    // Explicit provisioning — every new worker gets exactly one profile.
    provision_profile(state.db.as_ref(), worker.id).await?;

    let token = auth::issue_session(&state, worker.id).await?;
    info!(worker_id = %worker.id, username = %worker.username, "Worker signed up");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, worker })))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<AuthResponse>, Error> {
    let Some((worker, stored_hash)) = state.db.get_worker_by_username(&payload.username).await?
    else {
        return Err(AuthError::BadCredentials.into());
    };

    if !auth::verify_password(payload.password.expose_secret(), &stored_hash) {
        return Err(AuthError::BadCredentials.into());
    }

    let token = auth::issue_session(&state, worker.id).await?;
    info!(worker_id = %worker.id, username = %worker.username, "Worker logged in");
    Ok(Json(AuthResponse { token, worker }))
}

/// POST /api/auth/logout
///
/// Revokes the presented session token.
async fn logout(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Error> {
    if let Some(token) = auth::bearer_token(&headers) {
        state.db.delete_session(&auth::hash_token(token)).await?;
    }
    info!(worker_id = %me.id, "Worker logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ── Workers ─────────────────────────────────────────────────────────

/// GET /api/workers — the team roster, in username order.
async fn list_workers(State(state): State<AppState>) -> Result<Json<Vec<Worker>>, Error> {
    Ok(Json(state.db.list_workers().await?))
}

/// GET /api/workers/{id} — a worker with its profile.
async fn get_worker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkerDetail>, Error> {
    let Some(worker) = state.db.get_worker(id).await? else {
        return Err(DatabaseError::NotFound {
            entity: "worker".to_string(),
            id: id.to_string(),
        }
        .into());
    };
    let profile = state.db.get_profile_by_worker(id).await?;
    Ok(Json(WorkerDetail { worker, profile }))
}

/// PUT /api/workers/me — update the calling worker's own record.
async fn update_me(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Json(update): Json<WorkerUpdate>,
) -> Result<Json<Worker>, Error> {
    let Some(mut worker) = state.db.get_worker(me.id).await? else {
        return Err(AuthError::InvalidToken.into());
    };

    update.apply_to(&mut worker);
    state.db.update_worker(&worker).await?;

    // Every worker save re-asserts the profile.
    sync_profile(state.db.as_ref(), worker.id).await?;

    Ok(Json(worker))
}

// ── Profiles ────────────────────────────────────────────────────────

/// GET /api/profile — the calling worker's profile.
async fn get_profile(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
) -> Result<Json<Profile>, Error> {
    // Provision on read if something went wrong at sign-up time.
    let profile = provision_profile(state.db.as_ref(), me.id).await?;
    Ok(Json(profile))
}

/// PUT /api/profile — update the calling worker's profile.
async fn update_profile(
    State(state): State<AppState>,
    Extension(me): Extension<AuthWorker>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, Error> {
    let mut profile = provision_profile(state.db.as_ref(), me.id).await?;
    update.apply_to(&mut profile);
    state.db.update_profile(&profile).await?;
    Ok(Json(profile))
}

// ── Positions ───────────────────────────────────────────────────────

/// GET /api/positions — selectable context for the sign-up form.
async fn list_positions(State(state): State<AppState>) -> Result<Json<Vec<Position>>, Error> {
    Ok(Json(state.db.list_positions().await?))
}

/// POST /api/positions
async fn create_position(
    State(state): State<AppState>,
    Json(payload): Json<NewPosition>,
) -> Result<impl IntoResponse, Error> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ValidationError::field("name", "must not be empty").into());
    }

    let position = Position {
        id: Uuid::new_v4(),
        name: name.to_string(),
    };
    state.db.insert_position(&position).await?;
    Ok((StatusCode::CREATED, Json(position)))
}
