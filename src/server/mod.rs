// src/server/mod.rs

//! HTTP surface of the central service.
//!
//! This module contains:
//! - `handlers`  → Axum handlers and the shared `AppState`
//! - `routes`    → Router builder
//! - `auth`      → HTTP Basic auth for the admin dashboard
//! - `api_error` → Error response bodies
//! - `dashboard` → HTML rendering of the admin view

pub mod api_error;
pub mod auth;
pub mod dashboard;
pub mod handlers;
pub mod routes;

pub use api_error::{ErrorResponse, ValidationErrorCode, ValidationFailure};
pub use auth::{AdminCredentials, AdminUser, AuthRejection};
pub use handlers::{
    admin_dashboard_handler, health_handler, latest_version_handler, register_instance_handler,
    root_handler, validate_license_handler, AppState, HealthResponse, LatestVersionResponse,
    RegisterRequest, RegisterResponse, ValidateRequest, ValidateResponse,
};
pub use routes::build_router;
