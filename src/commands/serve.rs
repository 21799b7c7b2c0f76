//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    // Connects and applies pending migrations
    let db = Arc::new(Database::connect(&config.database_url).await?);

    if config.error_notification_email.is_none() {
        tracing::warn!("ERROR_NOTIFICATION_EMAIL not set; unexpected errors will only be logged");
    }

    let addr = config.server_addr();
    let app_state = AppState::from_config(db, config)
        .map_err(|e| AppError::internal(format!("Failed to initialize mailer: {}", e)))?;

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    // Connection info feeds the client address recorded on sessions
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
