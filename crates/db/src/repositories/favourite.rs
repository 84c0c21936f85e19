//! Favourite (user subscription) repository.

use std::sync::Arc;

use crate::entities::{Favourite, favourite};
use arcana_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Favourite repository for database operations.
#[derive(Clone)]
pub struct FavouriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavouriteRepository {
    /// Create a new favourite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the edge for a (subscriber, subscribed-to) pair.
    pub async fn find_by_pair(
        &self,
        subscriber_id: &str,
        subscribed_to_id: &str,
    ) -> AppResult<Option<favourite::Model>> {
        Favourite::find()
            .filter(favourite::Column::SubscriberId.eq(subscriber_id))
            .filter(favourite::Column::SubscribedToId.eq(subscribed_to_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a subscription edge exists.
    pub async fn exists(&self, subscriber_id: &str, subscribed_to_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_pair(subscriber_id, subscribed_to_id)
            .await?
            .is_some())
    }

    /// Create a new subscription edge.
    pub async fn create(&self, model: favourite::ActiveModel) -> AppResult<favourite::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the edge for a pair.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_by_pair(
        &self,
        subscriber_id: &str,
        subscribed_to_id: &str,
    ) -> AppResult<bool> {
        let edge = self.find_by_pair(subscriber_id, subscribed_to_id).await?;
        if let Some(e) = edge {
            e.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Users this user is subscribed to (newest edge first).
    pub async fn find_by_subscriber(&self, subscriber_id: &str) -> AppResult<Vec<favourite::Model>> {
        Favourite::find()
            .filter(favourite::Column::SubscriberId.eq(subscriber_id))
            .order_by_desc(favourite::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// This user's subscribers (newest edge first).
    pub async fn find_by_subscribed_to(
        &self,
        subscribed_to_id: &str,
    ) -> AppResult<Vec<favourite::Model>> {
        Favourite::find()
            .filter(favourite::Column::SubscribedToId.eq(subscribed_to_id))
            .order_by_desc(favourite::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count of users this user is subscribed to.
    pub async fn count_subscriptions(&self, subscriber_id: &str) -> AppResult<u64> {
        Favourite::find()
            .filter(favourite::Column::SubscriberId.eq(subscriber_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count of this user's subscribers.
    pub async fn count_subscribers(&self, subscribed_to_id: &str) -> AppResult<u64> {
        Favourite::find()
            .filter(favourite::Column::SubscribedToId.eq(subscribed_to_id))
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

    fn create_test_edge(id: &str, subscriber: &str, subscribed_to: &str) -> favourite::Model {
        favourite::Model {
            id: id.to_string(),
            subscriber_id: subscriber.to_string(),
            subscribed_to_id: subscribed_to.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_exists_true() {
        let edge = create_test_edge("f1", "alice", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .into_connection(),
        );

        let repo = FavouriteRepository::new(db);
        assert!(repo.exists("alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favourite::Model>::new()])
                .into_connection(),
        );

        let repo = FavouriteRepository::new(db);
        assert!(!repo.exists("alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favourite::Model>::new()])
                .into_connection(),
        );

        let repo = FavouriteRepository::new(db);
        assert!(!repo.delete_by_pair("alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_present() {
        let edge = create_test_edge("f1", "alice", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = FavouriteRepository::new(db);
        assert!(repo.delete_by_pair("alice", "bob").await.unwrap());
    }
}
