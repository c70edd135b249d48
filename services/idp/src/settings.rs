//! Feature toggles and integration settings.
//!
//! A toggle resolves through two tiers: a per-site configuration override
//! (when present and non-null) wins outright, otherwise the global feature
//! map decides, defaulting to off. Both login integrations (magic link and
//! OAuth2 SSO) share the one resolver, parameterized by flag name and
//! dependent config block.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Settings resolution failures. Operator-facing; end users never see these.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("`{flag}` must be of boolean type")]
    NotBoolean { flag: &'static str },
    #[error("`{key}` must be set when the feature is enabled")]
    MissingConfig { key: &'static str },
    #[error("`{flag}` is not enabled")]
    FeatureDisabled { flag: &'static str },
    #[error("{0}")]
    Invalid(String),
}

/// Settings for the magic-link login integration (`MAGIC_LINK_CONFIG`).
#[derive(Debug, Clone, Deserialize)]
pub struct MagicLinkSettings {
    /// How many times a link may be redeemed before it is latched. Must be ≥ 1.
    #[serde(default = "default_token_uses")]
    pub token_uses: u32,
    /// Link lifetime in seconds. Must be > 0.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    /// Embed the username in the verification URL and require it to match
    /// at redemption.
    #[serde(default = "default_true")]
    pub verify_include_username: bool,
    #[serde(default = "default_true")]
    pub allow_superuser_login: bool,
    #[serde(default = "default_true")]
    pub allow_staff_login: bool,
    /// Host the verification URL points at, e.g. "login.example.com".
    pub login_domain: String,
    /// Path of the verification endpoint, e.g. "/auth/link/verify".
    pub verify_path: String,
}

fn default_token_uses() -> u32 {
    1
}

fn default_token_ttl_secs() -> i64 {
    300
}

fn default_true() -> bool {
    true
}

impl MagicLinkSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.token_uses < 1 {
            return Err(SettingsError::Invalid(
                "`token_uses` must be at least 1".to_owned(),
            ));
        }
        if self.token_ttl_secs <= 0 {
            return Err(SettingsError::Invalid(
                "`token_ttl_secs` must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Settings for the OAuth2 SSO integration (`SSO_CONFIG`).
/// The OAuth2 flow itself is owned by the upstream provider; this service
/// only needs the endpoints and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct SsoSettings {
    /// Identity provider base URL, e.g. "https://idp.example.com".
    pub base_url: String,
    pub client_key: String,
    pub client_secret: String,
    pub tenant_id: String,
}

impl SsoSettings {
    /// Upstream logout URL for ending the provider-side session.
    pub fn logout_url(&self) -> String {
        format!("{}/oauth2/logout", self.base_url.trim_end_matches('/'))
    }
}

/// Global settings: feature flags, per-site overrides and the optional
/// per-integration config blocks. Read-only after startup.
#[derive(Debug, Default)]
pub struct Settings {
    /// Global feature-flag map. Env var: `FEATURES` (JSON object).
    pub features: HashMap<String, Value>,
    /// Per-host site configuration overrides. Env var: `SITE_OVERRIDES`
    /// (JSON object keyed by host).
    pub sites: HashMap<String, serde_json::Map<String, Value>>,
    /// Env var: `MAGIC_LINK_CONFIG` (JSON object).
    pub magic_link: Option<MagicLinkSettings>,
    /// Env var: `SSO_CONFIG` (JSON object).
    pub sso: Option<SsoSettings>,
}

impl Settings {
    pub fn from_env() -> Self {
        let features = std::env::var("FEATURES")
            .ok()
            .map(|raw| serde_json::from_str(&raw).expect("FEATURES must be a JSON object"))
            .unwrap_or_default();
        let sites = std::env::var("SITE_OVERRIDES")
            .ok()
            .map(|raw| serde_json::from_str(&raw).expect("SITE_OVERRIDES must be a JSON object"))
            .unwrap_or_default();
        let magic_link: Option<MagicLinkSettings> = std::env::var("MAGIC_LINK_CONFIG")
            .ok()
            .map(|raw| serde_json::from_str(&raw).expect("MAGIC_LINK_CONFIG must be a JSON object"));
        if let Some(ml) = &magic_link {
            if let Err(e) = ml.validate() {
                panic!("invalid MAGIC_LINK_CONFIG: {e}");
            }
        }
        let sso = std::env::var("SSO_CONFIG")
            .ok()
            .map(|raw| serde_json::from_str(&raw).expect("SSO_CONFIG must be a JSON object"));
        Self {
            features,
            sites,
            magic_link,
            sso,
        }
    }

    /// The magic-link config block, required once the feature is enabled.
    pub fn magic_link(&self) -> Result<&MagicLinkSettings, SettingsError> {
        self.magic_link.as_ref().ok_or(SettingsError::MissingConfig {
            key: MAGIC_LINK_LOGIN.config_block,
        })
    }

    /// The SSO config block, required once the feature is enabled.
    pub fn sso(&self) -> Result<&SsoSettings, SettingsError> {
        self.sso.as_ref().ok_or(SettingsError::MissingConfig {
            key: SSO_LOGIN.config_block,
        })
    }
}

/// A feature toggle resolved with site-override > global-default precedence.
#[derive(Debug, Clone, Copy)]
pub struct FeatureToggle {
    pub flag: &'static str,
    pub config_block: &'static str,
}

/// Magic-link passwordless login.
pub const MAGIC_LINK_LOGIN: FeatureToggle = FeatureToggle {
    flag: "ENABLE_MAGIC_LINK_LOGIN",
    config_block: "MAGIC_LINK_CONFIG",
};

/// OAuth2 single sign-on.
pub const SSO_LOGIN: FeatureToggle = FeatureToggle {
    flag: "ENABLE_SSO_LOGIN",
    config_block: "SSO_CONFIG",
};

impl FeatureToggle {
    /// Resolve the toggle for `site`. A non-null site override wins; the
    /// global map is the fallback, defaulting to off when the flag is
    /// absent. A non-boolean value or an enabled flag without its config
    /// block is an operator error.
    pub fn is_enabled(
        &self,
        settings: &Settings,
        site: Option<&str>,
    ) -> Result<bool, SettingsError> {
        let site_value = site
            .and_then(|host| settings.sites.get(host))
            .and_then(|overrides| overrides.get(self.flag))
            .filter(|v| !v.is_null());

        let value = match site_value {
            Some(v) => {
                debug!(flag = self.flag, "flag read from site override");
                v.clone()
            }
            None => {
                debug!(flag = self.flag, "flag read from global features");
                settings
                    .features
                    .get(self.flag)
                    .cloned()
                    .unwrap_or(Value::Bool(false))
            }
        };

        let enabled = value
            .as_bool()
            .ok_or(SettingsError::NotBoolean { flag: self.flag })?;

        if enabled && !self.has_config_block(settings) {
            return Err(SettingsError::MissingConfig {
                key: self.config_block,
            });
        }

        Ok(enabled)
    }

    /// Like [`Self::is_enabled`] but treats "off" as an error. Call paths
    /// gated behind a disabled toggle fail here.
    pub fn require_enabled(
        &self,
        settings: &Settings,
        site: Option<&str>,
    ) -> Result<(), SettingsError> {
        if self.is_enabled(settings, site)? {
            Ok(())
        } else {
            Err(SettingsError::FeatureDisabled { flag: self.flag })
        }
    }

    fn has_config_block(&self, settings: &Settings) -> bool {
        match self.config_block {
            "MAGIC_LINK_CONFIG" => settings.magic_link.is_some(),
            "SSO_CONFIG" => settings.sso.is_some(),
            _ => false,
        }
    }
}
