//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Opaque bearer token for API authentication
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Full name
    pub full_name: String,

    #[sea_orm(nullable)]
    pub nickname: Option<String>,

    #[sea_orm(nullable)]
    pub date_of_birth: Option<Date>,

    #[sea_orm(nullable)]
    pub country: Option<String>,

    #[sea_orm(nullable)]
    pub language: Option<String>,

    /// Author rating, scaled x10 (4.5 stored as 45).
    /// Written only by the author rating aggregator.
    #[sea_orm(default_value = 0)]
    pub rating: i32,

    /// Avatar image (URL or base64 data)
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar: Option<String>,

    /// Is the paid subscription active?
    #[sea_orm(default_value = false)]
    pub is_premium: bool,

    #[sea_orm(nullable)]
    pub premium_expires_at: Option<DateTimeWithTimeZone>,

    /// Notification preferences
    #[sea_orm(default_value = true)]
    pub notification_email: bool,

    #[sea_orm(default_value = true)]
    pub notification_push: bool,

    #[sea_orm(default_value = true)]
    pub notification_inherit: bool,

    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    #[sea_orm(default_value = false)]
    pub email_verified: bool,

    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub email_verification_token: Option<String>,

    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,

    #[sea_orm(nullable)]
    pub password_reset_expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,

    #[sea_orm(has_many = "super::user_story::Entity")]
    Stories,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
