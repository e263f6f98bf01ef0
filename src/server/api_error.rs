//! Error response bodies for the HTTP endpoints.
//!
//! `/license/validate` answers failures with:
//!
//! ```json
//! { "valid": false, "error": "LICENSE_EXPIRED", "message": "License expired on 2025-12-31" }
//! ```
//!
//! The four validation codes are HTTP 401; anything else (a store failure)
//! is HTTP 500 with `VALIDATION_ERROR` and the raw error message.
//!
//! `/instances/register` and `/admin` answer store failures with HTTP 500 and
//! malformed input with HTTP 400, both as
//! `{ "status": "error", "message": ... }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::CentralError;

/// Machine-readable codes returned by `/license/validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorCode {
    /// No license with this key
    InvalidLicense,
    /// License is revoked or suspended
    LicenseInactive,
    /// License is past its expiry date
    LicenseExpired,
    /// License belongs to another customer
    CustomerMismatch,
    /// The check itself could not be completed
    ValidationError,
}

impl ValidationErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationErrorCode::InvalidLicense
            | ValidationErrorCode::LicenseInactive
            | ValidationErrorCode::LicenseExpired
            | ValidationErrorCode::CustomerMismatch => StatusCode::UNAUTHORIZED,
            ValidationErrorCode::ValidationError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure body for `/license/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub valid: bool,
    pub error: ValidationErrorCode,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: code,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }
}

impl From<CentralError> for ValidationFailure {
    fn from(err: CentralError) -> Self {
        let code = match &err {
            CentralError::InvalidLicense => ValidationErrorCode::InvalidLicense,
            CentralError::LicenseInactive(_) => ValidationErrorCode::LicenseInactive,
            CentralError::LicenseExpired(_) => ValidationErrorCode::LicenseExpired,
            CentralError::CustomerMismatch => ValidationErrorCode::CustomerMismatch,
            _ => ValidationErrorCode::ValidationError,
        };
        ValidationFailure::new(code, err.to_string())
    }
}

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

/// Failure body for `/instances/register` and the dashboard.
///
/// Malformed input is HTTP 400; everything else is HTTP 500.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip, default = "internal_error")]
    pub http_status: StatusCode,
    pub status: String,
    pub message: String,
}

fn internal_error() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

impl From<CentralError> for ErrorResponse {
    fn from(err: CentralError) -> Self {
        let http_status = match err {
            CentralError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            http_status,
            status: "error".to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}
