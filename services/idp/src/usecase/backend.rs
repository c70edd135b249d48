use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::repository::{MagicLinkRepository, UserRepository};
use crate::domain::types::AuthUser;
use crate::error::IdpServiceError;
use crate::settings::Settings;
use crate::usecase::link::{RedeemLinkError, RedeemLinkInput, RedeemLinkUseCase};

pub struct AuthenticateInput {
    pub token: String,
    pub username: Option<String>,
    pub site: Option<String>,
}

/// A successful magic-link login: the resolved account and where to send it.
#[derive(Debug)]
pub struct AuthenticatedLogin {
    pub user: AuthUser,
    pub redirect_url: String,
}

/// Authentication backend over the magic-link lifecycle.
///
/// This is the recovery boundary: the lifecycle raises typed errors, but the
/// authentication framework above only understands "identity" or "no
/// identity". Every expected failure collapses to `Ok(None)` with the reason
/// kept in the logs; only storage/settings faults propagate.
pub struct MagicLinkBackend<U, M>
where
    U: UserRepository,
    M: MagicLinkRepository,
{
    pub settings: Arc<Settings>,
    pub users: U,
    pub links: M,
}

impl<U, M> MagicLinkBackend<U, M>
where
    U: UserRepository,
    M: MagicLinkRepository,
{
    pub async fn authenticate(
        &self,
        input: AuthenticateInput,
    ) -> Result<Option<AuthenticatedLogin>, IdpServiceError> {
        let redeem = RedeemLinkUseCase {
            settings: Arc::clone(&self.settings),
            users: &self.users,
            links: &self.links,
        };
        let result = redeem
            .execute(RedeemLinkInput {
                token: input.token,
                username: input.username,
                site: input.site,
            })
            .await;

        match result {
            Ok(out) => Ok(Some(AuthenticatedLogin {
                user: out.user,
                redirect_url: out.redirect_url,
            })),
            Err(RedeemLinkError::Link(reason)) => {
                warn!(%reason, "magic link rejected");
                Ok(None)
            }
            Err(RedeemLinkError::Service(
                e @ (IdpServiceError::LinkNotFound | IdpServiceError::UserNotFound),
            )) => {
                warn!(reason = %e, "magic link rejected");
                Ok(None)
            }
            Err(RedeemLinkError::Service(e)) => Err(e),
        }
    }

    /// Lookup-by-id passthrough for session rehydration.
    pub async fn get_user(&self, id: Uuid) -> Result<Option<AuthUser>, IdpServiceError> {
        self.users.find_by_id(id).await
    }
}
