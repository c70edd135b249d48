use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use serde::Serialize;

use crate::error::IdpServiceError;
use crate::handlers::site_host;
use crate::settings::SSO_LOGIN;
use crate::state::AppState;

#[derive(Serialize)]
pub struct LogoutUrlResponse {
    pub url: String,
}

/// GET /auth/sso/logout-url — upstream logout URL for ending the
/// provider-side session. The OAuth2 flow itself is owned by the provider.
pub async fn sso_logout_url(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, IdpServiceError> {
    SSO_LOGIN.require_enabled(&state.settings, site_host(&headers).as_deref())?;
    let sso = state.settings.sso()?;
    Ok(Json(LogoutUrlResponse {
        url: sso.logout_url(),
    }))
}
