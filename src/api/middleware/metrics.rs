//! HTTP metrics middleware for recording request/response metrics

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::infrastructure::observability::MetricsRegistry;

/// Middleware to record HTTP request metrics
///
/// Mount with `route_layer` so the matched route template is available and
/// label cardinality stays bounded.
pub async fn metrics_middleware(
    State(metrics): State<MetricsRegistry>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = extract_path(&request);

    let response = next.run(request).await;

    metrics.record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}

pub(crate) fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_path_falls_back_to_uri() {
        let request = Request::builder()
            .uri("/prediction-logs/abc?verbose=1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_path(&request), "/prediction-logs/abc");
    }
}
