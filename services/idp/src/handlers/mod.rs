pub mod link;
pub mod sso;

use axum::http::HeaderMap;
use axum::http::header::HOST;

/// Host the request came in on, for site-level setting overrides.
pub(crate) fn site_host(headers: &HeaderMap) -> Option<String> {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(|host| host.split(':').next().unwrap_or(host).to_owned())
}

/// Whether the inbound request was made over TLS. TLS terminates at the
/// proxy, so `x-forwarded-proto` is the source of truth.
pub(crate) fn is_secure(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}
