use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::db::{DbMagicLinkRepository, DbUserRepository};
use crate::settings::Settings;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub settings: Arc<Settings>,
    pub jwt_secret: String,
    pub cookie_domain: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn link_repo(&self) -> DbMagicLinkRepository {
        DbMagicLinkRepository {
            db: self.db.clone(),
        }
    }
}
