//! Post rating repository.

use std::sync::Arc;

use crate::entities::{PostRating, post_rating};
use arcana_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Post rating repository for database operations.
#[derive(Clone)]
pub struct PostRatingRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRatingRepository {
    /// Create a new post rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a rating by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post_rating::Model>> {
        PostRating::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the unique rating for a (post, user) pair.
    pub async fn find_by_post_and_user(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> AppResult<Option<post_rating::Model>> {
        PostRating::find()
            .filter(post_rating::Column::PostId.eq(post_id))
            .filter(post_rating::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new rating.
    pub async fn create(&self, model: post_rating::ActiveModel) -> AppResult<post_rating::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing rating.
    pub async fn update(&self, model: post_rating::ActiveModel) -> AppResult<post_rating::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the rating for a (post, user) pair in a single statement.
    ///
    /// Returns `true` if a row was deleted; an absent row is not an error.
    pub async fn delete_by_post_and_user(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        let result = PostRating::delete_many()
            .filter(post_rating::Column::PostId.eq(post_id))
            .filter(post_rating::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Get all ratings for a post (the source set of the post aggregator).
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<post_rating::Model>> {
        PostRating::find()
            .filter(post_rating::Column::PostId.eq(post_id))
            .order_by_desc(post_rating::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count ratings on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        PostRating::find()
            .filter(post_rating::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_rating(id: &str, post_id: &str, user_id: &str, value: f64) -> post_rating::Model {
        post_rating::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            value,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_post_and_user_found() {
        let rating = create_test_rating("r1", "post1", "user1", 4.5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rating.clone()]])
                .into_connection(),
        );

        let repo = PostRatingRepository::new(db);
        let result = repo.find_by_post_and_user("post1", "user1").await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.id, "r1");
        assert_eq!(found.value, 4.5);
    }

    #[tokio::test]
    async fn test_find_by_post_and_user_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_rating::Model>::new()])
                .into_connection(),
        );

        let repo = PostRatingRepository::new(db);
        let result = repo.find_by_post_and_user("post1", "user1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_post_and_user_absent_is_ok() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = PostRatingRepository::new(db);
        let deleted = repo.delete_by_post_and_user("post1", "user1").await.unwrap();

        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_delete_by_post_and_user_deletes_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRatingRepository::new(db);
        let deleted = repo.delete_by_post_and_user("post1", "user1").await.unwrap();

        assert!(deleted);
    }

    #[tokio::test]
    async fn test_find_by_post() {
        let r1 = create_test_rating("r1", "post1", "user1", 4.0);
        let r2 = create_test_rating("r2", "post1", "user2", 5.0);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = PostRatingRepository::new(db);
        let result = repo.find_by_post("post1").await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
