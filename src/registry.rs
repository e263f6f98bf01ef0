//! Instance Registry: records customer heartbeats and their version history.

use std::sync::Arc;

use chrono::Utc;

use crate::database::{Database, Heartbeat, VersionHistoryEntry};
use crate::errors::{CentralError, CentralResult};
use crate::logging::{log_license_event, LicenseEvent};

#[derive(Debug, Clone)]
pub struct InstanceRegistry {
    db: Arc<Database>,
}

impl InstanceRegistry {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Upsert the instance described by `heartbeat`.
    ///
    /// The first call for a customer creates the instance; later calls
    /// overwrite version, url, health, heartbeat and gauges. A version change
    /// appends one history entry, which is returned.
    pub async fn register_instance(
        &self,
        heartbeat: &Heartbeat,
    ) -> CentralResult<Option<VersionHistoryEntry>> {
        if heartbeat.customer_id.trim().is_empty() {
            return Err(CentralError::InvalidRequest(
                "customer_id cannot be empty".to_string(),
            ));
        }

        let now = Utc::now().naive_utc();
        let change = self.db.upsert_instance(heartbeat, now).await?;

        log_license_event(
            LicenseEvent::Registered,
            &heartbeat.customer_id,
            Some(&format!(
                "version={} health={}",
                heartbeat.version, heartbeat.health
            )),
        );

        if let Some(entry) = &change {
            log_license_event(
                LicenseEvent::VersionChanged,
                &entry.customer_id,
                Some(&format!("{} -> {}", entry.old_version, entry.new_version)),
            );
        }

        Ok(change)
    }
}
