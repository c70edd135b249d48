use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use passgate_idp::domain::repository::{MagicLinkRepository, UserRepository};
use passgate_idp::domain::types::{AuthUser, MagicLink};
use passgate_idp::error::IdpServiceError;
use passgate_idp::settings::{MAGIC_LINK_LOGIN, MagicLinkSettings, Settings};

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Vec<AuthUser>,
}

impl MockUserRepo {
    pub fn new(users: Vec<AuthUser>) -> Self {
        Self { users }
    }

    pub fn empty() -> Self {
        Self { users: vec![] }
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthUser>, IdpServiceError> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, IdpServiceError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}

// ── MockLinkRepo ─────────────────────────────────────────────────────────────

pub struct MockLinkRepo {
    pub links: Arc<Mutex<Vec<MagicLink>>>,
}

impl MockLinkRepo {
    pub fn new(links: Vec<MagicLink>) -> Self {
        Self {
            links: Arc::new(Mutex::new(links)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the internal record list for post-execution inspection.
    pub fn links_handle(&self) -> Arc<Mutex<Vec<MagicLink>>> {
        Arc::clone(&self.links)
    }
}

impl MagicLinkRepository for MockLinkRepo {
    async fn create(&self, link: &MagicLink) -> Result<(), IdpServiceError> {
        self.links.lock().unwrap().push(link.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<MagicLink>, IdpServiceError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.token == token && !l.disabled)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MagicLink>, IdpServiceError> {
        Ok(self.links.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn record_use(&self, id: Uuid, max_uses: u32) -> Result<bool, IdpServiceError> {
        let mut links = self.links.lock().unwrap();
        let Some(link) = links.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        if link.disabled || link.times_used >= max_uses as i32 {
            return Ok(false);
        }
        link.times_used += 1;
        if link.times_used >= max_uses as i32 {
            link.disabled = true;
        }
        Ok(true)
    }

    async fn disable(&self, id: Uuid) -> Result<bool, IdpServiceError> {
        let mut links = self.links.lock().unwrap();
        let Some(link) = links.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        link.times_used += 1;
        link.disabled = true;
        Ok(true)
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user() -> AuthUser {
    AuthUser {
        id: Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap(),
        username: "learner".to_owned(),
        email: "learner@example.com".to_owned(),
        is_superuser: false,
        is_staff: false,
    }
}

pub fn staff_user() -> AuthUser {
    AuthUser {
        id: Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap(),
        username: "staffer".to_owned(),
        email: "staffer@example.com".to_owned(),
        is_superuser: false,
        is_staff: true,
    }
}

pub fn superuser() -> AuthUser {
    AuthUser {
        id: Uuid::parse_str("00000000-0000-0000-0000-000000000003").unwrap(),
        username: "root".to_owned(),
        email: "root@example.com".to_owned(),
        is_superuser: true,
        is_staff: true,
    }
}

pub fn test_link(username: &str) -> MagicLink {
    let now = Utc::now();
    MagicLink {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        token: "aBcDeF0123456789".repeat(4),
        expiry: now + Duration::seconds(300),
        redirect_url: "/dashboard".to_owned(),
        disabled: false,
        times_used: 0,
        created: now,
    }
}

pub fn magic_link_settings() -> MagicLinkSettings {
    serde_json::from_value(json!({
        "login_domain": "login.example.com",
        "verify_path": "/auth/link/verify",
    }))
    .unwrap()
}

/// Settings with the magic-link feature globally enabled.
pub fn enabled_settings(ml: MagicLinkSettings) -> Arc<Settings> {
    let mut settings = Settings::default();
    settings
        .features
        .insert(MAGIC_LINK_LOGIN.flag.to_owned(), json!(true));
    settings.magic_link = Some(ml);
    Arc::new(settings)
}

/// Settings with the magic-link feature globally disabled.
pub fn disabled_settings() -> Arc<Settings> {
    let mut settings = Settings::default();
    settings
        .features
        .insert(MAGIC_LINK_LOGIN.flag.to_owned(), json!(false));
    settings.magic_link = Some(magic_link_settings());
    Arc::new(settings)
}
