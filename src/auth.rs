//! Bearer-token authentication — password hashing, sessions, middleware.
//!
//! Sign-up and login issue an opaque token; only its SHA-256 hash is
//! stored. `require_auth` resolves `Authorization: Bearer <token>` to an
//! [`AuthWorker`] request extension for downstream handlers.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AuthError, Error};
use crate::state::AppState;

/// A persisted login session. The raw token is never stored.
#[derive(Debug, Clone)]
pub struct Session {
    pub token_hash: String,
    pub worker_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated principal, installed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthWorker {
    pub id: Uuid,
    pub username: String,
}

// ── Password hashing ────────────────────────────────────────────────

/// Hash a password with a fresh random salt. Format: `<salt>$<digest>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);
    format!("{salt_hex}${}", digest_password(&salt_hex, password))
}

/// Check a password against a stored `<salt>$<digest>` string.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => digest_password(salt, password) == digest,
        None => false,
    }
}

fn digest_password(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

// ── Tokens ──────────────────────────────────────────────────────────

/// Generate a fresh opaque session token (hex, 32 random bytes).
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create and persist a session for a worker, returning the raw token.
pub async fn issue_session(state: &AppState, worker_id: Uuid) -> Result<String, Error> {
    let token = generate_token();
    let now = Utc::now();
    let ttl = chrono::Duration::from_std(state.config.session_ttl)
        .unwrap_or_else(|_| chrono::Duration::days(7));
    let session = Session {
        token_hash: hash_token(&token),
        worker_id,
        created_at: now,
        expires_at: now + ttl,
    };
    state.db.insert_session(&session).await?;
    Ok(token)
}

// ── Middleware ──────────────────────────────────────────────────────

/// Extract the bearer token from an Authorization header value.
pub(crate) fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Require a valid session token; installs [`AuthWorker`] on the request.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return Error::Auth(AuthError::InvalidToken).into_response();
    };

    let session = match state.db.get_session(&hash_token(token)).await {
        Ok(Some(session)) => session,
        Ok(None) => return Error::Auth(AuthError::InvalidToken).into_response(),
        Err(e) => return Error::Database(e).into_response(),
    };

    if session.expires_at <= Utc::now() {
        // Expired sessions are removed lazily on first rejected use.
        let _ = state.db.delete_session(&session.token_hash).await;
        return Error::Auth(AuthError::SessionExpired).into_response();
    }

    let worker = match state.db.get_worker(session.worker_id).await {
        Ok(Some(worker)) => worker,
        Ok(None) => return Error::Auth(AuthError::InvalidToken).into_response(),
        Err(e) => return Error::Database(e).into_response(),
    };

    req.extensions_mut().insert(AuthWorker {
        id: worker.id,
        username: worker.username,
    });
    next.run(req).await
}
