//! License plans, statuses and the derived expiry display state.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::CentralError;

/// Commercial plan attached to a license.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Standard,
    Pro,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Standard => "standard",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = CentralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Plan::Standard),
            "pro" => Ok(Plan::Pro),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(CentralError::InvalidRequest(format!(
                "plan must be one of: standard, pro, enterprise. Got '{other}'"
            ))),
        }
    }
}

/// Lifecycle status of a license. Only `Active` validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Revoked,
    Suspended,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Revoked => "revoked",
            LicenseStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = CentralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LicenseStatus::Active),
            "revoked" => Ok(LicenseStatus::Revoked),
            "suspended" => Ok(LicenseStatus::Suspended),
            other => Err(CentralError::InvalidRequest(format!(
                "unknown license status '{other}'"
            ))),
        }
    }
}

/// How a license's expiry looks at a given moment.
///
/// Presentation only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    /// No expiry date.
    Perpetual,
    /// Still valid; `days_remaining` counts whole days.
    Active {
        expires_at: NaiveDateTime,
        days_remaining: i64,
    },
    Expired { expires_at: NaiveDateTime },
}

impl ExpiryState {
    /// Derive the state of `expires_at` as seen at `now`.
    pub fn at(expires_at: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        match expires_at {
            None => ExpiryState::Perpetual,
            Some(expires_at) if expires_at < now => ExpiryState::Expired { expires_at },
            Some(expires_at) => ExpiryState::Active {
                expires_at,
                days_remaining: (expires_at - now).num_days(),
            },
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, ExpiryState::Expired { .. })
    }
}

impl fmt::Display for ExpiryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryState::Perpetual => f.write_str("Never"),
            ExpiryState::Active {
                expires_at,
                days_remaining,
            } => write!(f, "{} ({}d)", expires_at.format("%Y-%m-%d"), days_remaining),
            ExpiryState::Expired { expires_at } => {
                write!(f, "EXPIRED {}", expires_at.format("%Y-%m-%d"))
            }
        }
    }
}
