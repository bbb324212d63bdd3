//! Account entity model
//!
//! This module contains the SeaORM entity model for the accounts table,
//! which stores the OAuth identities linked to a user. The
//! (provider, provider_account_id) pair is unique across all accounts.

use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account entity representing a linked OAuth identity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// OAuth provider slug (e.g. "google", "kakao")
    pub provider: String,

    /// Identifier of this account at the provider (unique per provider)
    pub provider_account_id: String,

    /// OAuth access token (optional)
    pub access_token: Option<String>,

    /// OAuth refresh token (optional)
    pub refresh_token: Option<String>,

    /// OAuth token type (optional)
    pub token_type: Option<String>,

    /// Granted OAuth scopes (optional)
    pub scope: Option<String>,

    /// OpenID Connect id token (optional)
    pub id_token: Option<String>,

    /// Access token expiry (optional)
    pub expires_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the account was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the account was last updated
    pub updated_at: DateTimeWithTimeZone,

    /// Soft-delete marker; None means the row is live
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
