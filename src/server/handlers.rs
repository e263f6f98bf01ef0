use std::sync::Arc;

use axum::{extract::State, response::Html, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config::CentralConfig;
use crate::database::{Database, Heartbeat};
use crate::license::Plan;
use crate::registry::InstanceRegistry;
use crate::reporter::AdminReporter;
use crate::server::api_error::{ErrorResponse, ValidationFailure};
use crate::server::auth::{AdminCredentials, AdminUser};
use crate::server::dashboard::render_dashboard;
use crate::validator::LicenseValidator;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "central-api";

/// API version advertised by `GET /`.
pub const API_VERSION: &str = "1.0.0";

/// Shared application state for handlers.
///
/// Components are built once from the configuration and the database and
/// cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<CentralConfig>,
    pub registry: InstanceRegistry,
    pub validator: LicenseValidator,
    pub reporter: AdminReporter,
    pub admin: AdminCredentials,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: CentralConfig) -> Self {
        Self {
            registry: InstanceRegistry::new(db.clone()),
            validator: LicenseValidator::new(db.clone()),
            reporter: AdminReporter::new(db.clone(), config.release.latest_version.clone()),
            admin: AdminCredentials::from_config(&config.admin),
            config: Arc::new(config),
            db,
        }
    }
}

/// Body of `GET /latest-version`.
#[derive(Debug, Deserialize, Serialize)]
pub struct LatestVersionResponse {
    pub version: String,
    pub released: String,
    pub changelog_url: String,
    pub critical: bool,
}

/// Heartbeat sent by a customer instance.
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub customer_id: String,
    pub version: String,
    pub url: String,
    pub health: String,
    pub timestamp: String,
    #[serde(default)]
    pub total_users: i64,
    #[serde(default)]
    pub total_messages: i64,
}

impl From<RegisterRequest> for Heartbeat {
    fn from(req: RegisterRequest) -> Self {
        Heartbeat {
            customer_id: req.customer_id,
            version: req.version,
            url: req.url,
            health: req.health,
            timestamp: req.timestamp,
            total_users: req.total_users,
            total_messages: req.total_messages,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ValidateRequest {
    pub license_key: String,
    pub customer_id: String,
    pub app_version: String,
    pub timestamp: String,
}

/// Body of a successful `POST /license/validate`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub customer_name: String,
    pub plan: Plan,
    pub expires_at: Option<chrono::NaiveDateTime>,
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// `GET /` - service descriptor.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "HushLane Central API",
        "version": API_VERSION,
        "endpoints": {
            "version": "/latest-version",
            "register": "/instances/register",
            "admin": "/admin"
        }
    }))
}

/// `GET /latest-version` - release instances should be running.
pub async fn latest_version_handler(State(state): State<AppState>) -> Json<LatestVersionResponse> {
    let release = &state.config.release;
    Json(LatestVersionResponse {
        version: release.latest_version.clone(),
        released: release.released.clone(),
        changelog_url: release.changelog_url.clone(),
        critical: release.critical,
    })
}

/// `POST /instances/register` - record an instance heartbeat.
pub async fn register_instance_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ErrorResponse> {
    info!(
        "Registration from customer_id={} version={}",
        payload.customer_id, payload.version
    );

    let heartbeat = Heartbeat::from(payload);
    state
        .registry
        .register_instance(&heartbeat)
        .await
        .map_err(|e| {
            error!(
                "Registration failed for customer_id={}: {}",
                heartbeat.customer_id, e
            );
            ErrorResponse::from(e)
        })?;

    Ok(Json(RegisterResponse {
        status: "success".to_string(),
        message: "Instance registered".to_string(),
    }))
}

/// `POST /license/validate` - check a license key for a customer.
pub async fn validate_license_handler(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ValidationFailure> {
    info!(
        "Validating license for customer_id={} app_version={}",
        payload.customer_id, payload.app_version
    );

    let validated = state
        .validator
        .validate(&payload.license_key, &payload.customer_id)
        .await
        .map_err(|e| {
            if !e.is_validation_failure() {
                error!("Validation error for customer_id={}: {}", payload.customer_id, e);
            }
            ValidationFailure::from(e)
        })?;

    Ok(Json(ValidateResponse {
        valid: true,
        customer_name: validated.customer_name,
        plan: validated.plan,
        expires_at: validated.expires_at,
        message: "License valid".to_string(),
    }))
}

/// `GET /admin` - dashboard behind basic auth.
pub async fn admin_dashboard_handler(
    admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Html<String>, ErrorResponse> {
    info!("Dashboard requested by {}", admin.username);

    let data = state.reporter.dashboard_data().await.map_err(|e| {
        error!("Dashboard query failed: {}", e);
        ErrorResponse::from(e)
    })?;

    Ok(Html(render_dashboard(&data)))
}

/// `GET /health` - liveness of the central API itself.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}
