use anyhow::Context as _;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use passgate_idp_schema::{magic_links, users};

use crate::domain::repository::{MagicLinkRepository, UserRepository};
use crate::domain::types::{AuthUser, MagicLink};
use crate::error::IdpServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthUser>, IdpServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, IdpServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }
}

fn user_from_model(model: users::Model) -> AuthUser {
    AuthUser {
        id: model.id,
        username: model.username,
        email: model.email,
        is_superuser: model.is_superuser,
        is_staff: model.is_staff,
    }
}

// ── MagicLink repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMagicLinkRepository {
    pub db: DatabaseConnection,
}

impl MagicLinkRepository for DbMagicLinkRepository {
    async fn create(&self, link: &MagicLink) -> Result<(), IdpServiceError> {
        magic_links::ActiveModel {
            id: Set(link.id),
            username: Set(link.username.clone()),
            token: Set(link.token.clone()),
            expiry: Set(link.expiry),
            redirect_url: Set(link.redirect_url.clone()),
            disabled: Set(link.disabled),
            times_used: Set(link.times_used),
            created: Set(link.created),
        }
        .insert(&self.db)
        .await
        .context("create magic link")?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<MagicLink>, IdpServiceError> {
        let model = magic_links::Entity::find()
            .filter(magic_links::Column::Token.eq(token))
            .filter(magic_links::Column::Disabled.eq(false))
            .one(&self.db)
            .await
            .context("find magic link by token")?;
        Ok(model.map(link_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MagicLink>, IdpServiceError> {
        let model = magic_links::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find magic link by id")?;
        Ok(model.map(link_from_model))
    }

    async fn record_use(&self, id: Uuid, max_uses: u32) -> Result<bool, IdpServiceError> {
        // Single conditional UPDATE so the use limit holds under concurrent
        // redemption: the filter excludes latched or already-exhausted rows,
        // and the latch is computed from the post-increment count.
        let result = magic_links::Entity::update_many()
            .col_expr(
                magic_links::Column::TimesUsed,
                Expr::col(magic_links::Column::TimesUsed).add(1),
            )
            .col_expr(
                magic_links::Column::Disabled,
                Expr::col(magic_links::Column::TimesUsed)
                    .add(1)
                    .gte(max_uses as i32),
            )
            .filter(magic_links::Column::Id.eq(id))
            .filter(magic_links::Column::Disabled.eq(false))
            .filter(magic_links::Column::TimesUsed.lt(max_uses as i32))
            .exec(&self.db)
            .await
            .context("record magic link use")?;
        Ok(result.rows_affected > 0)
    }

    async fn disable(&self, id: Uuid) -> Result<bool, IdpServiceError> {
        let result = magic_links::Entity::update_many()
            .col_expr(
                magic_links::Column::TimesUsed,
                Expr::col(magic_links::Column::TimesUsed).add(1),
            )
            .col_expr(magic_links::Column::Disabled, Expr::value(true))
            .filter(magic_links::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("disable magic link")?;
        Ok(result.rows_affected > 0)
    }
}

fn link_from_model(model: magic_links::Model) -> MagicLink {
    MagicLink {
        id: model.id,
        username: model.username,
        token: model.token,
        expiry: model.expiry,
        redirect_url: model.redirect_url,
        disabled: model.disabled,
        times_used: model.times_used,
        created: model.created,
    }
}
