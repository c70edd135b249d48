use std::sync::Arc;

use anyhow::Context as _;
use chrono::{Duration, Utc};
use rand::RngExt;
use url::Url;
use uuid::Uuid;

use crate::domain::repository::{MagicLinkRepository, UserRepository};
use crate::domain::types::{AuthUser, LINK_TOKEN_LEN, LinkState, MagicLink};
use crate::error::{IdpServiceError, MagicLinkError};
use crate::settings::{MAGIC_LINK_LOGIN, MagicLinkSettings, Settings};

/// Charset for link tokens (mixed-case alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..LINK_TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Build the absolute verification URL for a link. The username parameter is
/// only embedded when username verification is on; scheme follows the
/// security of the inbound request.
pub fn verification_url(
    link: &MagicLink,
    settings: &MagicLinkSettings,
    secure: bool,
) -> Result<String, IdpServiceError> {
    let scheme = if secure { "https" } else { "http" };
    let base = Url::parse(&format!("{scheme}://{}", settings.login_domain))
        .context("invalid login domain")?;
    let mut url = base
        .join(&settings.verify_path)
        .context("invalid verify path")?;
    url.query_pairs_mut().append_pair("token", &link.token);
    if settings.verify_include_username {
        url.query_pairs_mut().append_pair("username", &link.username);
    }
    Ok(url.to_string())
}

// ── IssueLink ─────────────────────────────────────────────────────────────────

pub struct IssueLinkInput {
    pub username: String,
    pub redirect_url: String,
    /// Host the request came in on, for site-level setting overrides.
    pub site: Option<String>,
    /// Whether the inbound request was made over TLS.
    pub secure: bool,
}

#[derive(Debug)]
pub struct IssueLinkOutput {
    pub link: MagicLink,
    pub url: String,
}

pub struct IssueLinkUseCase<U, M>
where
    U: UserRepository,
    M: MagicLinkRepository,
{
    pub settings: Arc<Settings>,
    pub users: U,
    pub links: M,
}

impl<U, M> IssueLinkUseCase<U, M>
where
    U: UserRepository,
    M: MagicLinkRepository,
{
    pub async fn execute(&self, input: IssueLinkInput) -> Result<IssueLinkOutput, IdpServiceError> {
        MAGIC_LINK_LOGIN.require_enabled(&self.settings, input.site.as_deref())?;
        let ml = self.settings.magic_link()?;

        // Policy (staff/superuser) is enforced at redemption; issuance only
        // requires the account to exist.
        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or(IdpServiceError::UserNotFound)?;

        let now = Utc::now();
        let link = MagicLink {
            id: Uuid::new_v4(),
            username: user.username,
            token: generate_token(),
            expiry: now + Duration::seconds(ml.token_ttl_secs),
            redirect_url: input.redirect_url,
            disabled: false,
            times_used: 0,
            created: now,
        };
        self.links.create(&link).await?;

        let url = verification_url(&link, ml, input.secure)?;
        Ok(IssueLinkOutput { link, url })
    }
}

// ── RedeemLink ────────────────────────────────────────────────────────────────

/// Failure of a redemption attempt: either a typed lifecycle reason, or an
/// ordinary service error (unknown token, missing account, storage failure).
#[derive(Debug, thiserror::Error)]
pub enum RedeemLinkError {
    #[error(transparent)]
    Link(#[from] MagicLinkError),
    #[error(transparent)]
    Service(#[from] IdpServiceError),
}

pub struct RedeemLinkInput {
    pub token: String,
    pub username: Option<String>,
    pub site: Option<String>,
}

#[derive(Debug)]
pub struct RedeemLinkOutput {
    pub user: AuthUser,
    pub redirect_url: String,
}

pub struct RedeemLinkUseCase<U, M>
where
    U: UserRepository,
    M: MagicLinkRepository,
{
    pub settings: Arc<Settings>,
    pub users: U,
    pub links: M,
}

impl<U, M> RedeemLinkUseCase<U, M>
where
    U: UserRepository,
    M: MagicLinkRepository,
{
    /// Validate and consume one use of a link. Checks run in a fixed order;
    /// the first failure wins, and every failure except a username mismatch
    /// also latches the record.
    pub async fn execute(&self, input: RedeemLinkInput) -> Result<RedeemLinkOutput, RedeemLinkError> {
        MAGIC_LINK_LOGIN
            .require_enabled(&self.settings, input.site.as_deref())
            .map_err(IdpServiceError::from)?;
        let ml = self.settings.magic_link().map_err(IdpServiceError::from)?;

        let link = self
            .links
            .find_by_token(&input.token)
            .await?
            .ok_or(IdpServiceError::LinkNotFound)?;

        // 1. Username verification. A mismatch does not latch the record:
        // the bearer may simply have pasted the wrong account name.
        if ml.verify_include_username
            && input.username.as_deref() != Some(link.username.as_str())
        {
            return Err(MagicLinkError::UsernameMismatch.into());
        }

        // 2./3. Expiry before use limit, latching on either.
        match link.state(Utc::now(), ml.token_uses) {
            LinkState::Active => {}
            LinkState::Expired => {
                self.links.disable(link.id).await?;
                return Err(MagicLinkError::Expired.into());
            }
            LinkState::Exhausted => {
                self.links.disable(link.id).await?;
                return Err(MagicLinkError::UseLimitExceeded.into());
            }
            // find_by_token excludes latched records; kept for port
            // implementations that do not.
            LinkState::Disabled => return Err(IdpServiceError::LinkNotFound.into()),
        }

        // 4./5. Account policy.
        let user = self
            .users
            .find_by_username(&link.username)
            .await?
            .ok_or(IdpServiceError::UserNotFound)?;

        if user.is_superuser && !ml.allow_superuser_login {
            self.links.disable(link.id).await?;
            return Err(MagicLinkError::SuperuserLoginForbidden.into());
        }
        if user.is_staff && !ml.allow_staff_login {
            self.links.disable(link.id).await?;
            return Err(MagicLinkError::StaffLoginForbidden.into());
        }

        // 6. Count the use atomically; losing the race to a concurrent
        // redemption means the link is already spent.
        if !self.links.record_use(link.id, ml.token_uses).await? {
            return Err(MagicLinkError::UseLimitExceeded.into());
        }

        Ok(RedeemLinkOutput {
            user,
            redirect_url: link.redirect_url,
        })
    }
}

// ── RevokeLink ────────────────────────────────────────────────────────────────

pub struct RevokeLinkUseCase<M>
where
    M: MagicLinkRepository,
{
    pub settings: Arc<Settings>,
    pub links: M,
}

impl<M> RevokeLinkUseCase<M>
where
    M: MagicLinkRepository,
{
    /// Out-of-band revocation: latch the record regardless of state.
    pub async fn execute(&self, id: Uuid, site: Option<&str>) -> Result<(), IdpServiceError> {
        MAGIC_LINK_LOGIN.require_enabled(&self.settings, site)?;
        if !self.links.disable(id).await? {
            return Err(IdpServiceError::LinkNotFound);
        }
        Ok(())
    }
}
