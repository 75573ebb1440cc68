//! Tracing subscriber setup and request-scoped spans.

use axum::{body::Body, http::Request};
use tracing::Span;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVES: &str = "catalog_api=info,tower_http=info";

/// Install the process-wide subscriber. `RUST_LOG` overrides the default directives.
///
/// Only the binary calls this; library code emits events and leaves subscriber choice to the caller.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        tracing::debug!(error = %e, "tracing subscriber already installed, keeping it");
    }
}

/// Span for one HTTP request, tagged with the `x-request-id` set by `SetRequestIdLayer`.
pub fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    )
}
