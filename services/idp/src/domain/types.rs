use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Account data needed for login decisions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_superuser: bool,
    pub is_staff: bool,
}

/// Limited-use passwordless login token.
#[derive(Debug, Clone)]
pub struct MagicLink {
    pub id: Uuid,
    pub username: String,
    pub token: String,
    pub expiry: DateTime<Utc>,
    pub redirect_url: String,
    pub disabled: bool,
    pub times_used: i32,
    pub created: DateTime<Utc>,
}

/// Where a link stands in its lifecycle. The persisted representation is a
/// single `disabled` latch; the variant names which check produced it.
/// `Expired`, `Exhausted` and `Disabled` are all terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Active,
    Expired,
    Exhausted,
    Disabled,
}

impl MagicLink {
    /// Derive the lifecycle state. Check order matches redemption: the
    /// latch first, then expiry, then the use limit.
    pub fn state(&self, now: DateTime<Utc>, max_uses: u32) -> LinkState {
        if self.disabled {
            LinkState::Disabled
        } else if now > self.expiry {
            LinkState::Expired
        } else if self.times_used >= max_uses as i32 {
            LinkState::Exhausted
        } else {
            LinkState::Active
        }
    }
}

/// Magic link token length in characters.
pub const LINK_TOKEN_LEN: usize = 64;
