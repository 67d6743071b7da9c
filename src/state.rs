//! Shared application state handed to every request handler.
//!
//! Replaces any notion of ambient per-request globals: handlers receive
//! this explicitly via axum's `State` extractor.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::Database;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Bundle the store and config for the router.
    pub fn new(db: Arc<dyn Database>, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}
