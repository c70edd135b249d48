use sea_orm::entity::prelude::*;

/// Limited-use passwordless login token tied to a username.
/// `disabled` is a one-way latch; records are never deleted by the service
/// (retention is an operational concern).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "magic_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    #[sea_orm(unique)]
    pub token: String,
    pub expiry: chrono::DateTime<chrono::Utc>,
    pub redirect_url: String,
    pub disabled: bool,
    pub times_used: i32,
    pub created: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
