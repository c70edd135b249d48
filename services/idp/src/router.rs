use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use passgate_core::health::{healthz, readyz};
use passgate_core::middleware::request_id_layer;

use crate::handlers::{
    link::{issue_link, revoke_link, verify_link},
    sso::sso_logout_url,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Magic links
        .route("/auth/link", post(issue_link))
        .route("/auth/link/verify", get(verify_link))
        .route("/auth/link/{id}", delete(revoke_link))
        // SSO
        .route("/auth/sso/logout-url", get(sso_logout_url))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
