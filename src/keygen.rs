//! Key Generator: issues licenses for the operator tool.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};

use crate::database::{Database, License};
use crate::errors::{CentralError, CentralResult};
use crate::license::{ExpiryState, LicenseStatus, Plan};
use crate::license_key::generate_license_key;
use crate::logging::{log_license_event, LicenseEvent};

/// Days counted per month of license duration.
pub const DAYS_PER_MONTH: i64 = 30;

/// A license annotated with its expiry state at listing time.
#[derive(Debug, Clone)]
pub struct LicenseSummary {
    pub license: License,
    pub expiry: ExpiryState,
}

/// Expiry for a license issued at `issued_at`; `None` or `Some(0)` months is perpetual.
pub fn expiry_for(issued_at: NaiveDateTime, duration_months: Option<u32>) -> Option<NaiveDateTime> {
    match duration_months {
        None | Some(0) => None,
        Some(months) => Some(issued_at + Duration::days(i64::from(months) * DAYS_PER_MONTH)),
    }
}

#[derive(Debug, Clone)]
pub struct KeyGenerator {
    db: Arc<Database>,
}

impl KeyGenerator {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Issue a new active license for `customer_id`.
    ///
    /// The returned record carries the generated key. Fails with
    /// `DuplicateCustomer` if the customer is already licensed.
    pub async fn create_license(
        &self,
        customer_id: &str,
        customer_name: &str,
        plan: Plan,
        duration_months: Option<u32>,
    ) -> CentralResult<License> {
        if customer_id.trim().is_empty() {
            return Err(CentralError::InvalidRequest(
                "customer_id cannot be empty".to_string(),
            ));
        }
        if customer_name.trim().is_empty() {
            return Err(CentralError::InvalidRequest(
                "customer_name cannot be empty".to_string(),
            ));
        }

        let now = Utc::now().naive_utc();
        let license = License {
            license_key: generate_license_key(),
            customer_id: customer_id.to_string(),
            customer_name: customer_name.to_string(),
            plan,
            status: LicenseStatus::Active,
            created_at: now,
            expires_at: expiry_for(now, duration_months),
            last_validated: None,
        };

        self.db.insert_license(&license).await?;

        log_license_event(
            LicenseEvent::Created,
            customer_id,
            Some(&format!("plan={} key={}", plan, license.license_key)),
        );

        Ok(license)
    }

    /// All licenses, newest first, with their expiry state as of now.
    pub async fn list_licenses(&self) -> CentralResult<Vec<LicenseSummary>> {
        let now = Utc::now().naive_utc();
        let licenses = self.db.list_licenses().await?;

        Ok(licenses
            .into_iter()
            .map(|license| LicenseSummary {
                expiry: ExpiryState::at(license.expires_at, now),
                license,
            })
            .collect())
    }

    /// Move a license to `status`. Fails with `InvalidLicense` for an unknown key.
    pub async fn set_status(&self, license_key: &str, status: LicenseStatus) -> CentralResult<()> {
        let license = self
            .db
            .get_license_by_key(license_key)
            .await?
            .ok_or(CentralError::InvalidLicense)?;

        self.db.set_license_status(license_key, status).await?;

        log_license_event(
            LicenseEvent::StatusChanged,
            &license.customer_id,
            Some(&format!("{} -> {}", license.status, status)),
        );

        Ok(())
    }
}
