//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Post content categories.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[sea_orm(string_value = "esoterics")]
    Esoterics,
    #[sea_orm(string_value = "astrology")]
    Astrology,
    #[sea_orm(string_value = "tarot")]
    Tarot,
    #[sea_orm(string_value = "numerology")]
    Numerology,
    #[sea_orm(string_value = "meditation")]
    Meditation,
    #[sea_orm(string_value = "spirituality")]
    Spirituality,
    #[sea_orm(string_value = "other")]
    Other,
}

impl Category {
    /// All valid category wire names.
    pub const ALL: [&'static str; 7] = [
        "esoterics",
        "astrology",
        "tarot",
        "numerology",
        "meditation",
        "spirituality",
        "other",
    ];

    /// Parse a category from its wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "esoterics" => Some(Self::Esoterics),
            "astrology" => Some(Self::Astrology),
            "tarot" => Some(Self::Tarot),
            "numerology" => Some(Self::Numerology),
            "meditation" => Some(Self::Meditation),
            "spirituality" => Some(Self::Spirituality),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Who can view a post.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Everyone
    #[sea_orm(string_value = "all")]
    All,
    /// Premium subscribers of the platform
    #[sea_orm(string_value = "subscribers")]
    Subscribers,
    /// The author's own subscribers
    #[sea_orm(string_value = "my_subscribers")]
    MySubscribers,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub author_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub preview_text: String,

    /// Markdown content
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Preview image (URL or base64 data)
    #[sea_orm(column_type = "Text", nullable)]
    pub preview_image: Option<String>,

    /// Mean of this post's rating rows, rounded to one decimal.
    /// Written only by the post rating aggregator.
    #[sea_orm(default_value = 0.0)]
    pub rating: f64,

    /// Count of non-deleted comments (denormalized)
    #[sea_orm(default_value = 0)]
    pub comments_count: i32,

    #[sea_orm(default_value = 0)]
    pub views_count: i64,

    pub category: Category,

    pub accessibility: Accessibility,

    #[sea_orm(default_value = true)]
    pub is_published: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::post_rating::Entity")]
    Ratings,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::post_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
