/// Identity service runtime configuration loaded from environment variables.
///
/// Feature flags and integration settings live in [`crate::settings`]; this
/// struct only carries what the process needs to start up.
#[derive(Debug)]
pub struct IdpConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session access tokens.
    pub jwt_secret: String,
    /// Cookie domain attribute for the session cookie (root domain).
    pub cookie_domain: String,
    /// TCP port to listen on (default 3115). Env var: `IDP_PORT`.
    pub idp_port: u16,
}

impl IdpConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            idp_port: std::env::var("IDP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3115),
        }
    }
}
