#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{AuthUser, MagicLink};
use crate::error::IdpServiceError;

/// Port for account lookups.
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthUser>, IdpServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, IdpServiceError>;
}

/// Repository for magic-link records.
pub trait MagicLinkRepository: Send + Sync {
    async fn create(&self, link: &MagicLink) -> Result<(), IdpServiceError>;

    /// Find a link by token, excluding latched (`disabled`) records.
    async fn find_by_token(&self, token: &str) -> Result<Option<MagicLink>, IdpServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MagicLink>, IdpServiceError>;

    /// Atomically count one use: increment `times_used` and latch the record
    /// when the new count reaches `max_uses`, but only while the record is
    /// unlatched and under the limit. Returns `false` when the condition did
    /// not hold (e.g. a concurrent redemption won the race).
    async fn record_use(&self, id: Uuid, max_uses: u32) -> Result<bool, IdpServiceError>;

    /// Unconditionally latch the record and increment `times_used`.
    /// Returns `false` if no record exists with this id.
    async fn disable(&self, id: Uuid) -> Result<bool, IdpServiceError>;
}

// Reference impls so the backend adapter can run usecases over borrowed
// repositories.

impl<T: UserRepository + ?Sized> UserRepository for &T {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthUser>, IdpServiceError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, IdpServiceError> {
        (**self).find_by_id(id).await
    }
}

impl<T: MagicLinkRepository + ?Sized> MagicLinkRepository for &T {
    async fn create(&self, link: &MagicLink) -> Result<(), IdpServiceError> {
        (**self).create(link).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<MagicLink>, IdpServiceError> {
        (**self).find_by_token(token).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MagicLink>, IdpServiceError> {
        (**self).find_by_id(id).await
    }

    async fn record_use(&self, id: Uuid, max_uses: u32) -> Result<bool, IdpServiceError> {
        (**self).record_use(id, max_uses).await
    }

    async fn disable(&self, id: Uuid) -> Result<bool, IdpServiceError> {
        (**self).disable(id).await
    }
}
