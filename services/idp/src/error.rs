use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::settings::SettingsError;

/// Reasons a magic link can fail redemption. These never cross the HTTP
/// boundary as-is: the authentication backend collapses them into a uniform
/// "no identity" outcome and keeps the reason in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MagicLinkError {
    #[error("username does not match")]
    UsernameMismatch,
    #[error("magic link has expired")]
    Expired,
    #[error("magic link has been used too many times")]
    UseLimitExceeded,
    #[error("superuser accounts can not log in with a magic link")]
    SuperuserLoginForbidden,
    #[error("staff accounts can not log in with a magic link")]
    StaffLoginForbidden,
}

/// Identity service error variants.
#[derive(Debug, thiserror::Error)]
pub enum IdpServiceError {
    #[error("feature not enabled")]
    FeatureDisabled,
    #[error("user not found")]
    UserNotFound,
    #[error("magic link not found")]
    LinkNotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("settings error: {0}")]
    Settings(SettingsError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<SettingsError> for IdpServiceError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::FeatureDisabled { .. } => Self::FeatureDisabled,
            other => Self::Settings(other),
        }
    }
}

impl IdpServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FeatureDisabled => "FEATURE_DISABLED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::LinkNotFound => "LINK_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Settings(_) => "SETTINGS",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for IdpServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::FeatureDisabled => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::LinkNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Settings(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status
        // for all requests, and 4xx are expected client outcomes. Settings errors
        // and anyhow chains need the detail logged so the root cause is traceable.
        match &self {
            Self::Settings(e) => tracing::error!(error = %e, kind = "SETTINGS", "settings error"),
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
