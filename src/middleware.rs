use axum::{extract::Request, middleware::Next, response::Response};
use tracing::info;

pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    info!(
        method = %method,
        url = %uri,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "HTTP request"
    );

    response
}
