use std::process::ExitCode;
use std::sync::Arc;

use central::config::CentralConfig;
use central::database::Database;
use central::errors::{CentralError, CentralResult};
use central::logging::init_tracing;
use central::server::{build_router, AppState};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Central server stopped: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CentralResult<()> {
    let config = CentralConfig::load()?;
    init_tracing(&config.logging.level);

    if config.uses_default_admin_password() {
        warn!("Dashboard is using the default admin password; set MASTER_ADMIN_PASSWORD");
    }

    let db = Arc::new(Database::connect(&config.database.url).await?);
    let addr = config.bind_address();
    let app = build_router(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CentralError::ConfigError(format!("failed to bind {addr}: {e}")))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| CentralError::StoreError(format!("server error: {e}")))
}
