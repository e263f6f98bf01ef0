//! Structured logging for the central service.
//!
//! This module provides:
//! - subscriber setup shared by both binaries
//! - license and instance event logging for audit purposes
//! - request logging middleware with request id propagation (`server` feature)

use tracing::{info, info_span, warn, Level};

/// License and instance state change event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseEvent {
    /// License was created by the operator tool
    Created,
    /// License status was changed by the operator tool
    StatusChanged,
    /// License was validated successfully
    Validated,
    /// License validation failed
    ValidationFailed,
    /// Instance heartbeat received
    Registered,
    /// Instance reported a new version
    VersionChanged,
}

impl std::fmt::Display for LicenseEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LicenseEvent::Created => "created",
            LicenseEvent::StatusChanged => "status_changed",
            LicenseEvent::Validated => "validated",
            LicenseEvent::ValidationFailed => "validation_failed",
            LicenseEvent::Registered => "registered",
            LicenseEvent::VersionChanged => "version_changed",
        };
        write!(f, "{}", s)
    }
}

/// Log a state change event for a customer.
///
/// Failed validations are logged at `warn`, everything else at `info`.
pub fn log_license_event(event: LicenseEvent, customer_id: &str, details: Option<&str>) {
    let span = info_span!(
        "license_event",
        event = %event,
        customer_id = %customer_id,
    );
    let _enter = span.enter();

    match (event, details) {
        (LicenseEvent::ValidationFailed, Some(d)) => warn!(reason = %d, "License event occurred"),
        (LicenseEvent::ValidationFailed, None) => warn!("License event occurred"),
        (_, Some(d)) => info!(details = %d, "License event occurred"),
        (_, None) => info!("License event occurred"),
    }
}

/// Parse a configured level name, falling back to `info`.
pub fn parse_level(level: &str) -> Level {
    level.parse::<Level>().unwrap_or(Level::INFO)
}

/// Install the global fmt subscriber. Later calls are no-ops.
///
/// Output goes to stderr so the operator tool's stdout stays clean.
pub fn init_tracing(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(feature = "server")]
pub use middleware::{generate_request_id, request_logging_middleware, REQUEST_ID_HEADER};

#[cfg(feature = "server")]
mod middleware {
    use std::time::Instant;

    use axum::{
        body::Body,
        extract::Request,
        http::{HeaderValue, Response},
        middleware::Next,
    };
    use tracing::{info, info_span, Instrument};
    use uuid::Uuid;

    /// Header name for the request ID.
    pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

    /// Generate a new unique request ID.
    pub fn generate_request_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Logging middleware that tracks request timing and generates request IDs.
    ///
    /// Each request runs inside an `info_span` carrying its id, method and
    /// path; completion is logged with status and duration, and the id is
    /// echoed back in the `X-Request-Id` response header.
    pub async fn request_logging_middleware(request: Request, next: Next) -> Response<Body> {
        let request_id = generate_request_id();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            path = %path,
        );

        let start = Instant::now();

        let response = async move {
            info!("Started processing request");
            next.run(request).await
        }
        .instrument(span.clone())
        .await;

        let duration = start.elapsed();
        let status = response.status();

        let _enter = span.enter();
        info!(
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );

        let (mut parts, body) = response.into_parts();
        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            parts.headers.insert(REQUEST_ID_HEADER, header_value);
        }

        Response::from_parts(parts, body)
    }
}
