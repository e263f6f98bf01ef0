//! Error types shared by the store, the components and both binaries.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::license::LicenseStatus;

/// Every failure the central service can report.
///
/// The four validation variants (`InvalidLicense`, `LicenseInactive`,
/// `LicenseExpired`, `CustomerMismatch`) are reported in the order the
/// validator checks them; see `crate::validator`.
#[derive(Debug, Error)]
pub enum CentralError {
    /// The customer already holds a license.
    #[error("customer '{customer_id}' already has a license: {license_key}")]
    DuplicateCustomer {
        customer_id: String,
        license_key: String,
    },

    #[error("License key not found")]
    InvalidLicense,

    #[error("License status: {0}")]
    LicenseInactive(LicenseStatus),

    #[error("License expired on {}", .0.format("%Y-%m-%d"))]
    LicenseExpired(NaiveDateTime),

    #[error("License key does not match customer ID")]
    CustomerMismatch,

    /// Caller supplied input the service cannot act on.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Raw persistence failure, surfaced as-is.
    #[error("{0}")]
    StoreError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl CentralError {
    /// True for the failures a license validation can end in.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            CentralError::InvalidLicense
                | CentralError::LicenseInactive(_)
                | CentralError::LicenseExpired(_)
                | CentralError::CustomerMismatch
        )
    }
}

impl From<sqlx::Error> for CentralError {
    fn from(err: sqlx::Error) -> Self {
        CentralError::StoreError(err.to_string())
    }
}

pub type CentralResult<T> = Result<T, CentralError>;
