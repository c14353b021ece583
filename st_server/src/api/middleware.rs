//! Request metrics middleware.
//!
//! Counts every response by method, matched route and status. Requests that
//! match no route are counted under `unmatched` so arbitrary paths cannot
//! inflate label cardinality.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics;

/// Record `http_requests_total` for each request
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    metrics::http_requests_total(&method, &path, response.status().as_u16());
    response
}
