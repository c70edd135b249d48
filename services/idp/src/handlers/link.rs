use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdpServiceError;
use crate::handlers::{is_secure, site_host};
use crate::state::AppState;
use crate::usecase::backend::{AuthenticateInput, MagicLinkBackend};
use crate::usecase::link::{IssueLinkInput, IssueLinkUseCase, RevokeLinkUseCase};
use crate::usecase::session::{issue_session_token, set_session_cookie};

// ── POST /auth/link ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IssueLinkRequest {
    pub username: String,
    pub redirect_url: String,
}

#[derive(Serialize)]
pub struct IssueLinkResponse {
    pub link_id: Uuid,
    pub url: String,
}

pub async fn issue_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<IssueLinkRequest>,
) -> Result<impl IntoResponse, IdpServiceError> {
    let usecase = IssueLinkUseCase {
        settings: state.settings.clone(),
        users: state.user_repo(),
        links: state.link_repo(),
    };
    let out = usecase
        .execute(IssueLinkInput {
            username: body.username,
            redirect_url: body.redirect_url,
            site: site_host(&headers),
            secure: is_secure(&headers),
        })
        .await?;

    let body = IssueLinkResponse {
        link_id: out.link.id,
        url: out.url,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// ── GET /auth/link/verify ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyLinkQuery {
    pub token: String,
    pub username: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyLinkResponse {
    pub redirect_url: String,
}

pub async fn verify_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<VerifyLinkQuery>,
) -> Result<impl IntoResponse, IdpServiceError> {
    let backend = MagicLinkBackend {
        settings: state.settings.clone(),
        users: state.user_repo(),
        links: state.link_repo(),
    };
    let login = backend
        .authenticate(AuthenticateInput {
            token: query.token,
            username: query.username,
            site: site_host(&headers),
        })
        .await?
        .ok_or(IdpServiceError::Unauthorized)?;

    let (token, _exp) = issue_session_token(&login.user, &state.jwt_secret)?;
    let jar = set_session_cookie(jar, token, state.cookie_domain.clone());

    let body = VerifyLinkResponse {
        redirect_url: login.redirect_url,
    };
    Ok((StatusCode::OK, jar, Json(body)))
}

// ── DELETE /auth/link/{id} ────────────────────────────────────────────────────

pub async fn revoke_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, IdpServiceError> {
    let usecase = RevokeLinkUseCase {
        settings: state.settings.clone(),
        links: state.link_repo(),
    };
    usecase.execute(id, site_host(&headers).as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
