use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

use crate::logging::request_logging_middleware;
use crate::server::handlers::{
    admin_dashboard_handler, health_handler, latest_version_handler, register_instance_handler,
    root_handler, validate_license_handler, AppState,
};

/// Build the main application router for the central server.
///
/// # Routes
///
/// - `GET /` - Service descriptor
/// - `GET /latest-version` - Latest release for customer instances
/// - `POST /instances/register` - Instance heartbeat / registration
/// - `POST /license/validate` - License validation
/// - `GET /admin` - Dashboard (HTTP Basic auth)
/// - `GET /health` - Health check
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/latest-version", get(latest_version_handler))
        .route("/instances/register", post(register_instance_handler))
        .route("/license/validate", post(validate_license_handler))
        .route("/admin", get(admin_dashboard_handler))
        .route("/health", get(health_handler))
        .layer(ServiceBuilder::new().layer(middleware::from_fn(request_logging_middleware)))
        .with_state(state)
}
