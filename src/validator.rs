//! License Validator.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. key exists (`InvalidLicense`)
//! 2. status is active (`LicenseInactive`)
//! 3. not past `expires_at` (`LicenseExpired`)
//! 4. key belongs to the caller (`CustomerMismatch`)
//!
//! A passing validation stamps `last_validated`; a failure of that write is
//! logged and does not change the outcome.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::database::Database;
use crate::errors::{CentralError, CentralResult};
use crate::license::{LicenseStatus, Plan};
use crate::logging::{log_license_event, LicenseEvent};

/// What a successful validation tells the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedLicense {
    pub customer_name: String,
    pub plan: Plan,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct LicenseValidator {
    db: Arc<Database>,
}

impl LicenseValidator {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Validate `license_key` for `customer_id` as of now.
    pub async fn validate(
        &self,
        license_key: &str,
        customer_id: &str,
    ) -> CentralResult<ValidatedLicense> {
        self.validate_at(license_key, customer_id, Utc::now().naive_utc())
            .await
    }

    /// Validate `license_key` for `customer_id` as of `now`.
    pub async fn validate_at(
        &self,
        license_key: &str,
        customer_id: &str,
        now: NaiveDateTime,
    ) -> CentralResult<ValidatedLicense> {
        match self.check(license_key, customer_id, now).await {
            Ok(validated) => {
                log_license_event(LicenseEvent::Validated, customer_id, None);
                Ok(validated)
            }
            Err(e) => {
                if e.is_validation_failure() {
                    log_license_event(
                        LicenseEvent::ValidationFailed,
                        customer_id,
                        Some(&e.to_string()),
                    );
                }
                Err(e)
            }
        }
    }

    async fn check(
        &self,
        license_key: &str,
        customer_id: &str,
        now: NaiveDateTime,
    ) -> CentralResult<ValidatedLicense> {
        let license = self
            .db
            .get_license_by_key(license_key)
            .await?
            .ok_or(CentralError::InvalidLicense)?;

        if license.status != LicenseStatus::Active {
            return Err(CentralError::LicenseInactive(license.status));
        }

        if let Some(expires_at) = license.expires_at {
            if now > expires_at {
                return Err(CentralError::LicenseExpired(expires_at));
            }
        }

        if license.customer_id != customer_id {
            return Err(CentralError::CustomerMismatch);
        }

        if let Err(e) = self.db.touch_last_validated(license_key, now).await {
            warn!("Failed to record validation for {}: {}", license_key, e);
        }

        Ok(ValidatedLicense {
            customer_name: license.customer_name,
            plan: license.plan,
            expires_at: license.expires_at,
        })
    }
}
