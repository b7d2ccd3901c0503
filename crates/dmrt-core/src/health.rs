use axum::http::StatusCode;

/// `GET /healthz`: the process is up. Never touches storage.
///
/// Readiness depends on each service's backends, so services mount their own
/// `/readyz`.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Paths exempt from bot blocking.
pub const HEALTH_PATHS: [&str; 2] = ["/healthz", "/readyz"];
