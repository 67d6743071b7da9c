use std::sync::Arc;

use chrono::Utc;
use tower_http::cors::CorsLayer;

use taskboard::config::AppConfig;
use taskboard::state::AppState;
use taskboard::store::{Database, LibSqlBackend};
use taskboard::tasks::task_routes;
use taskboard::workers::worker_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("📋 Taskboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}/api/tasks", config.bind_addr);
    eprintln!("   Database: {}", config.db_path.display());

    // ── Database ────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);

    // ── Startup cleanup: drop sessions that expired while we were down ──
    let purged = db.purge_expired_sessions(Utc::now()).await?;
    if purged > 0 {
        eprintln!("   Purged {} expired sessions", purged);
    }

    // ── HTTP server ─────────────────────────────────────────────────
    let bind_addr = config.bind_addr;
    let state = AppState::new(db, config);

    let app = task_routes(state.clone())
        .merge(worker_routes(state))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Taskboard server started");
    axum::serve(listener, app).await?;

    Ok(())
}
