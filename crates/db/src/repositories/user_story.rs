//! User story (activity history) repository.

use std::sync::Arc;

use crate::entities::{UserStory, user_story};
use arcana_common::{AppError, AppResult};
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Filters for listing a user's stories.
#[derive(Debug, Clone, Default)]
pub struct StoryFilter {
    /// Restrict to one category.
    pub category: Option<user_story::StoryCategory>,
    /// Only stories created at or after this time.
    pub date_from: Option<DateTime<FixedOffset>>,
    /// Only stories created at or before this time.
    pub date_to: Option<DateTime<FixedOffset>>,
}

/// User story repository for database operations.
#[derive(Clone)]
pub struct UserStoryRepository {
    db: Arc<DatabaseConnection>,
}

impl UserStoryRepository {
    /// Create a new user story repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a story by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user_story::Model>> {
        UserStory::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new story.
    pub async fn create(&self, model: user_story::ActiveModel) -> AppResult<user_story::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a story.
    pub async fn delete(&self, story: user_story::Model) -> AppResult<()> {
        story
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// A user's stories, newest first, optionally filtered.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        filter: &StoryFilter,
    ) -> AppResult<Vec<user_story::Model>> {
        let mut query = UserStory::find().filter(user_story::Column::UserId.eq(user_id));

        if let Some(category) = filter.category {
            query = query.filter(user_story::Column::Category.eq(category));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(user_story::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(user_story::Column::CreatedAt.lte(to));
        }

        query
            .order_by_desc(user_story::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's stories.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        UserStory::find()
            .filter(user_story::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::user_story::StoryCategory;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_story(id: &str, user_id: &str, category: StoryCategory) -> user_story::Model {
        user_story::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content: "Rated a post".to_string(),
            category,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_with_category() {
        let s1 = create_test_story("s1", "u1", StoryCategory::Rating);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[s1]])
                .into_connection(),
        );

        let repo = UserStoryRepository::new(db);
        let filter = StoryFilter {
            category: Some(StoryCategory::Rating),
            ..Default::default()
        };
        let result = repo.find_by_user("u1", &filter).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category, StoryCategory::Rating);
    }
}
