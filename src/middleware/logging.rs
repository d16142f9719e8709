//! Request logging middleware
//!
//! Logs every handled request with a generated correlation id, the method,
//! path, response status and latency.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use crate::utils::helpers::generate_request_id;

pub async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = generate_request_id();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );

    response
}
