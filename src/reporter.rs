//! Admin Reporter: read-only aggregates for the dashboard.

use std::sync::Arc;

use serde::Serialize;

use crate::database::{CustomerInstance, Database, VersionHistoryEntry};
use crate::errors::CentralResult;

/// How many version transitions the dashboard shows.
pub const RECENT_UPDATES_LIMIT: u32 = 10;

/// Health status counted as healthy.
pub const HEALTHY_STATUS: &str = "healthy";

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    /// Most recent heartbeat first
    pub instances: Vec<CustomerInstance>,
    /// Newest first, at most [`RECENT_UPDATES_LIMIT`]
    pub recent_updates: Vec<VersionHistoryEntry>,
    pub total_customers: usize,
    pub healthy_count: usize,
    /// Instances not running `latest_version`
    pub outdated_count: usize,
    pub latest_version: String,
}

#[derive(Debug, Clone)]
pub struct AdminReporter {
    db: Arc<Database>,
    latest_version: String,
}

impl AdminReporter {
    pub fn new(db: Arc<Database>, latest_version: impl Into<String>) -> Self {
        Self {
            db,
            latest_version: latest_version.into(),
        }
    }

    pub async fn dashboard_data(&self) -> CentralResult<DashboardData> {
        let instances = self.db.list_instances().await?;
        let recent_updates = self.db.recent_version_history(RECENT_UPDATES_LIMIT).await?;

        let healthy_count = instances
            .iter()
            .filter(|i| i.health_status == HEALTHY_STATUS)
            .count();
        let outdated_count = instances
            .iter()
            .filter(|i| i.version != self.latest_version)
            .count();

        Ok(DashboardData {
            total_customers: instances.len(),
            healthy_count,
            outdated_count,
            instances,
            recent_updates,
            latest_version: self.latest_version.clone(),
        })
    }
}
