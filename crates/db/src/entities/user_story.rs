//! User story entity (activity history).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User story categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum StoryCategory {
    #[sea_orm(string_value = "subscription")]
    Subscription,
    #[sea_orm(string_value = "donation")]
    Donation,
    #[sea_orm(string_value = "profile")]
    Profile,
    #[sea_orm(string_value = "rating")]
    Rating,
    #[sea_orm(string_value = "other")]
    Other,
}

impl StoryCategory {
    /// All valid category wire names.
    pub const ALL: [&'static str; 5] =
        ["subscription", "donation", "profile", "rating", "other"];

    /// Parse a category from its wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "subscription" => Some(Self::Subscription),
            "donation" => Some(Self::Donation),
            "profile" => Some(Self::Profile),
            "rating" => Some(Self::Rating),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_story")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    /// Description of the action
    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub category: StoryCategory,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
