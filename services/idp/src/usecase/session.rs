use std::time::{SystemTime, UNIX_EPOCH};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::types::AuthUser;
use crate::error::IdpServiceError;

/// Cookie name for the session access token.
pub const PASSGATE_SESSION: &str = "passgate_session";

/// Session JWT lifetime in seconds (4 hours).
pub const SESSION_TOKEN_EXP: u64 = 14400;

/// JWT claims for the post-redemption login session.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub username: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

pub fn issue_session_token(
    user: &AuthUser,
    secret: &str,
) -> Result<(String, u64), IdpServiceError> {
    let exp = now_secs() + SESSION_TOKEN_EXP;
    let claims = SessionClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| IdpServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

/// Validate a session token and return its claims.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, IdpServiceError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| IdpServiceError::Unauthorized)?;

    Ok(data.claims)
}

/// Set the session cookie on the jar.
pub fn set_session_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    let cookie = Cookie::build((PASSGATE_SESSION, value))
        .path("/")
        .domain(domain)
        .max_age(time::Duration::seconds(SESSION_TOKEN_EXP as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
