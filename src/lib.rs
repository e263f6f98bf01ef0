//! HushLane Central - license validation and instance registry service
//!
//! Customer deployments of HushLane report heartbeats to this service and
//! validate their license keys against it. An operator issues licenses with
//! the `hushlane_license` tool and watches the fleet on the admin dashboard.
//!
//! # Features
//!
//! - `server` - HTTP API and dashboard (axum). Enabled by default.
//!
//! Without `server` the crate still builds the store, the components and the
//! operator commands, which is all `hushlane_license` needs.

// Core modules (always available)
pub mod config;
pub mod database;
pub mod errors;
pub mod license;
pub mod license_key;
pub mod logging;

// Components
pub mod commands;
pub mod keygen;
pub mod registry;
pub mod reporter;
pub mod validator;

// Server-related modules (requires "server" feature)
#[cfg(feature = "server")]
#[path = "server/mod.rs"]
pub mod server;
