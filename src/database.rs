use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query, query_as, query_scalar, FromRow, SqlitePool};
use tracing::error;

use crate::errors::{CentralError, CentralResult};
use crate::license::{LicenseStatus, Plan};

/// A license record.
///
/// `license_key` never changes once created, and each `customer_id` holds at
/// most one license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub license_key: String,
    pub customer_id: String,
    pub customer_name: String,
    pub plan: Plan,
    pub status: LicenseStatus,
    pub created_at: NaiveDateTime,
    /// `None` means perpetual.
    pub expires_at: Option<NaiveDateTime>,
    pub last_validated: Option<NaiveDateTime>,
}

/// Row shape of the `licenses` table. Plan and status are stored as text and
/// parsed into typed values at this boundary.
#[derive(Debug, FromRow)]
struct LicenseRow {
    license_key: String,
    customer_id: String,
    customer_name: String,
    plan: String,
    status: String,
    created_at: NaiveDateTime,
    expires_at: Option<NaiveDateTime>,
    last_validated: Option<NaiveDateTime>,
}

impl TryFrom<LicenseRow> for License {
    type Error = CentralError;

    fn try_from(row: LicenseRow) -> Result<Self, Self::Error> {
        let plan = Plan::from_str(&row.plan).map_err(|_| {
            CentralError::StoreError(format!(
                "license {} has unknown plan '{}'",
                row.license_key, row.plan
            ))
        })?;
        let status = LicenseStatus::from_str(&row.status).map_err(|_| {
            CentralError::StoreError(format!(
                "license {} has unknown status '{}'",
                row.license_key, row.status
            ))
        })?;

        Ok(License {
            license_key: row.license_key,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            plan,
            status,
            created_at: row.created_at,
            expires_at: row.expires_at,
            last_validated: row.last_validated,
        })
    }
}

/// A customer's deployment as last reported by its heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CustomerInstance {
    pub customer_id: String,
    pub version: String,
    pub url: String,
    pub health_status: String,
    /// Timestamp string as reported by the instance.
    pub last_heartbeat: String,
    /// Set on first registration, never updated.
    pub first_seen: NaiveDateTime,
    pub total_users: i64,
    pub total_messages: i64,
}

/// One version transition of an instance. Rows are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct VersionHistoryEntry {
    pub id: i64,
    pub customer_id: String,
    pub old_version: String,
    pub new_version: String,
    pub updated_at: NaiveDateTime,
}

/// A registration call as reported by an instance.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    pub customer_id: String,
    pub version: String,
    pub url: String,
    pub health: String,
    pub timestamp: String,
    pub total_users: i64,
    pub total_messages: i64,
}

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS customer_instances (
        customer_id     TEXT PRIMARY KEY,
        version         TEXT NOT NULL,
        url             TEXT NOT NULL,
        health_status   TEXT NOT NULL DEFAULT 'healthy',
        last_heartbeat  TEXT NOT NULL,
        first_seen      TEXT NOT NULL,
        total_users     INTEGER NOT NULL DEFAULT 0,
        total_messages  INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS version_history (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id     TEXT NOT NULL,
        old_version     TEXT NOT NULL,
        new_version     TEXT NOT NULL,
        updated_at      TEXT NOT NULL,
        FOREIGN KEY (customer_id) REFERENCES customer_instances(customer_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS licenses (
        license_key     TEXT PRIMARY KEY,
        customer_id     TEXT NOT NULL UNIQUE,
        customer_name   TEXT NOT NULL,
        plan            TEXT NOT NULL DEFAULT 'standard',
        status          TEXT NOT NULL DEFAULT 'active',
        created_at      TEXT NOT NULL,
        expires_at      TEXT,
        last_validated  TEXT
    )
    "#,
];

fn store_error(op: &str, e: sqlx::Error) -> CentralError {
    error!("SQLite {op} failed: {e}");
    CentralError::from(e)
}

/// The single SQLite store behind every component.
///
/// Each operation is one short statement or one transaction; row-level
/// conflicts are left to SQLite's own write locking.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `url` and ensure the schema exists.
    ///
    /// In-memory URLs get a single-connection pool, since every SQLite
    /// connection would otherwise see its own empty database.
    pub async fn connect(url: &str) -> CentralResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| CentralError::ConfigError(format!("invalid database url '{url}': {e}")))?
            .create_if_missing(true)
            .foreign_keys(false);

        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to connect to SQLite: {e}");
                CentralError::StoreError(format!("failed to connect to SQLite: {e}"))
            })?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Create the three tables if they do not exist yet.
    pub async fn migrate(&self) -> CentralResult<()> {
        for statement in SCHEMA {
            query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| store_error("migrate", e))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Licenses
    // ------------------------------------------------------------------

    /// Insert a new license.
    ///
    /// Fails with `DuplicateCustomer` (carrying the existing key) if the
    /// customer already has one; the existing row is left untouched.
    pub async fn insert_license(&self, license: &License) -> CentralResult<()> {
        let result = query(
            r#"
            INSERT INTO licenses (
                license_key,
                customer_id,
                customer_name,
                plan,
                status,
                created_at,
                expires_at,
                last_validated
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&license.license_key)
        .bind(&license.customer_id)
        .bind(&license.customer_name)
        .bind(license.plan.as_str())
        .bind(license.status.as_str())
        .bind(license.created_at)
        .bind(license.expires_at)
        .bind(license.last_validated)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    && db_err.message().contains("licenses.customer_id") =>
            {
                let existing = self
                    .get_license_by_customer(&license.customer_id)
                    .await?
                    .map(|l| l.license_key)
                    .unwrap_or_default();
                Err(CentralError::DuplicateCustomer {
                    customer_id: license.customer_id.clone(),
                    license_key: existing,
                })
            }
            Err(e) => Err(store_error("insert_license", e)),
        }
    }

    /// Fetch a license by its key.
    pub async fn get_license_by_key(&self, license_key: &str) -> CentralResult<Option<License>> {
        let row = query_as::<_, LicenseRow>("SELECT * FROM licenses WHERE license_key = ?")
            .bind(license_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("get_license_by_key", e))?;

        row.map(License::try_from).transpose()
    }

    /// Fetch the license held by a customer, if any.
    pub async fn get_license_by_customer(
        &self,
        customer_id: &str,
    ) -> CentralResult<Option<License>> {
        let row = query_as::<_, LicenseRow>("SELECT * FROM licenses WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("get_license_by_customer", e))?;

        row.map(License::try_from).transpose()
    }

    /// All licenses, newest first.
    pub async fn list_licenses(&self) -> CentralResult<Vec<License>> {
        let rows = query_as::<_, LicenseRow>(
            "SELECT * FROM licenses ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("list_licenses", e))?;

        rows.into_iter().map(License::try_from).collect()
    }

    /// Record a successful validation. Returns whether a row was updated.
    pub async fn touch_last_validated(
        &self,
        license_key: &str,
        at: NaiveDateTime,
    ) -> CentralResult<bool> {
        let rows_affected = query("UPDATE licenses SET last_validated = ? WHERE license_key = ?")
            .bind(at)
            .bind(license_key)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("touch_last_validated", e))?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Change a license's status. Returns whether a row was updated.
    pub async fn set_license_status(
        &self,
        license_key: &str,
        status: LicenseStatus,
    ) -> CentralResult<bool> {
        let rows_affected = query("UPDATE licenses SET status = ? WHERE license_key = ?")
            .bind(status.as_str())
            .bind(license_key)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("set_license_status", e))?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    // ------------------------------------------------------------------
    // Instances
    // ------------------------------------------------------------------

    /// Upsert an instance from its heartbeat.
    ///
    /// Runs as one transaction. The history row is written first, straight
    /// from the stored version, so the write lock is taken before anything is
    /// read and a transition is recorded exactly once even when two
    /// registrations for the same customer race. Returns the appended history
    /// entry when the version changed.
    pub async fn upsert_instance(
        &self,
        heartbeat: &Heartbeat,
        now: NaiveDateTime,
    ) -> CentralResult<Option<VersionHistoryEntry>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("upsert_instance begin", e))?;

        let change = query_as::<_, VersionHistoryEntry>(
            r#"
            INSERT INTO version_history (customer_id, old_version, new_version, updated_at)
            SELECT customer_id, version, ?, ?
            FROM customer_instances
            WHERE customer_id = ? AND version != ?
            RETURNING id, customer_id, old_version, new_version, updated_at
            "#,
        )
        .bind(&heartbeat.version)
        .bind(now)
        .bind(&heartbeat.customer_id)
        .bind(&heartbeat.version)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| store_error("upsert_instance history", e))?;

        query(
            r#"
            INSERT INTO customer_instances (
                customer_id,
                version,
                url,
                health_status,
                last_heartbeat,
                first_seen,
                total_users,
                total_messages
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(customer_id) DO UPDATE SET
                version        = excluded.version,
                url            = excluded.url,
                health_status  = excluded.health_status,
                last_heartbeat = excluded.last_heartbeat,
                total_users    = excluded.total_users,
                total_messages = excluded.total_messages
            "#,
        )
        .bind(&heartbeat.customer_id)
        .bind(&heartbeat.version)
        .bind(&heartbeat.url)
        .bind(&heartbeat.health)
        .bind(&heartbeat.timestamp)
        .bind(now)
        .bind(heartbeat.total_users)
        .bind(heartbeat.total_messages)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error("upsert_instance", e))?;

        tx.commit()
            .await
            .map_err(|e| store_error("upsert_instance commit", e))?;

        Ok(change)
    }

    pub async fn get_instance(&self, customer_id: &str) -> CentralResult<Option<CustomerInstance>> {
        query_as::<_, CustomerInstance>("SELECT * FROM customer_instances WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("get_instance", e))
    }

    /// All instances, most recent heartbeat first.
    pub async fn list_instances(&self) -> CentralResult<Vec<CustomerInstance>> {
        query_as::<_, CustomerInstance>(
            "SELECT * FROM customer_instances ORDER BY last_heartbeat DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("list_instances", e))
    }

    /// The `limit` most recent version transitions across all instances.
    pub async fn recent_version_history(
        &self,
        limit: u32,
    ) -> CentralResult<Vec<VersionHistoryEntry>> {
        query_as::<_, VersionHistoryEntry>(
            "SELECT * FROM version_history ORDER BY updated_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("recent_version_history", e))
    }

    /// Full version history of one instance, oldest first.
    pub async fn version_history_for(
        &self,
        customer_id: &str,
    ) -> CentralResult<Vec<VersionHistoryEntry>> {
        query_as::<_, VersionHistoryEntry>(
            "SELECT * FROM version_history WHERE customer_id = ? ORDER BY id ASC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("version_history_for", e))
    }

    /// Number of recorded version transitions.
    pub async fn count_version_history(&self) -> CentralResult<i64> {
        query_scalar("SELECT COUNT(*) FROM version_history")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("count_version_history", e))
    }
}
