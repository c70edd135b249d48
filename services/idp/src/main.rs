use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use passgate_idp::config::IdpConfig;
use passgate_idp::router::build_router;
use passgate_idp::settings::Settings;
use passgate_idp::state::AppState;

#[tokio::main]
async fn main() {
    passgate_core::tracing::init_tracing();

    let config = IdpConfig::from_env();
    let settings = Arc::new(Settings::from_env());

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        settings,
        jwt_secret: config.jwt_secret,
        cookie_domain: config.cookie_domain,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.idp_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("idp service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
