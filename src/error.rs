//! Error types for Taskboard.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Authentication and session errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid or missing bearer token")]
    InvalidToken,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid username or password")]
    BadCredentials,
}

/// Request payload validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Field {field} is invalid: {message}")]
    Field { field: String, message: String },

    #[error("{entity} with {field} '{value}' already exists")]
    AlreadyExists {
        entity: String,
        field: String,
        value: String,
    },
}

impl ValidationError {
    /// Shorthand for a single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Map errors to HTTP responses.
///
/// Validation problems go back to the submitting client (422 / 409),
/// missing rows are 404, auth failures 401. Everything else is a 500
/// with the detail kept out of the body.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Validation(ValidationError::AlreadyExists { .. }) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Error::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Error::Database(DatabaseError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Error::Database(DatabaseError::Constraint(_)) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Error::Auth(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            _ => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
