use axum::http::StatusCode;

/// `GET /healthz` — liveness probe.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz` — readiness probe. Services needing a real readiness check
/// (e.g. database connectivity) should route their own handler instead.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
