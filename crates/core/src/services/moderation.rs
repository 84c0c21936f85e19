//! Moderation (back-office) service.

use std::collections::HashSet;

use arcana_common::AppResult;
use arcana_db::{
    entities::{post, user},
    repositories::{PostRepository, UserRepository},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::Serialize;
use tracing::info;

use crate::services::rating::RatingService;

/// Page size used when walking the full post table.
const RECOMPUTE_BATCH: u64 = 200;

/// Moderation service for admin operations.
#[derive(Clone)]
pub struct ModerationService {
    user_repo: UserRepository,
    post_repo: PostRepository,
    ratings: RatingService,
}

/// Outcome of a full rating rebuild.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeReport {
    /// Posts whose aggregate was recomputed.
    pub posts_recomputed: u64,
    /// Authors whose aggregate was recomputed.
    pub authors_recomputed: u64,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        post_repo: PostRepository,
        ratings: RatingService,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            ratings,
        }
    }

    /// List all users (paginated).
    pub async fn list_users(&self, offset: u64, limit: u64) -> AppResult<(Vec<user::Model>, u64)> {
        let users = self.user_repo.list(offset, limit).await?;
        let total = self.user_repo.count().await?;
        Ok((users, total))
    }

    /// List all posts including drafts (paginated).
    pub async fn list_posts(&self, offset: u64, limit: u64) -> AppResult<(Vec<post::Model>, u64)> {
        let posts = self.post_repo.find_all(offset, limit).await?;
        let total = self.post_repo.count_all().await?;
        Ok((posts, total))
    }

    /// Grant or revoke admin rights.
    pub async fn set_admin(&self, user_id: &str, is_admin: bool) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();
        active.is_admin = Set(is_admin);
        active.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        info!(user_id, is_admin, "Changed admin flag");
        Ok(user)
    }

    /// Grant or revoke premium status.
    pub async fn set_premium(
        &self,
        user_id: &str,
        is_premium: bool,
        expires_at: Option<DateTime<FixedOffset>>,
    ) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();
        active.is_premium = Set(is_premium);
        active.premium_expires_at = Set(if is_premium { expires_at } else { None });
        active.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        info!(user_id, is_premium, "Changed premium status");
        Ok(user)
    }

    /// Rebuild every post and author aggregate from the rating rows.
    ///
    /// Walks all posts recomputing each, then every author with at least
    /// one published post. Authors left with no published posts but a
    /// stale nonzero aggregate are reset to zero as well.
    pub async fn recompute_all_ratings(&self) -> AppResult<RecomputeReport> {
        let mut posts_recomputed = 0u64;
        let mut offset = 0u64;
        loop {
            let page = self.post_repo.find_all(offset, RECOMPUTE_BATCH).await?;
            if page.is_empty() {
                break;
            }
            let page_len = page.len() as u64;
            for post in page {
                self.ratings.recompute_post_rating(&post.id).await?;
                posts_recomputed += 1;
            }
            offset += page_len;
        }

        let published: HashSet<String> = self
            .post_repo
            .published_author_ids()
            .await?
            .into_iter()
            .collect();
        let mut authors_recomputed = 0u64;
        for author_id in &published {
            self.ratings.recompute_author_rating(author_id).await?;
            authors_recomputed += 1;
        }

        let mut offset = 0u64;
        loop {
            let page = self.user_repo.list(offset, RECOMPUTE_BATCH).await?;
            if page.is_empty() {
                break;
            }
            let page_len = page.len() as u64;
            for user in page {
                if user.rating != 0 && !published.contains(&user.id) {
                    self.ratings.recompute_author_rating(&user.id).await?;
                    authors_recomputed += 1;
                }
            }
            offset += page_len;
        }

        info!(posts_recomputed, authors_recomputed, "Rebuilt rating aggregates");
        Ok(RecomputeReport {
            posts_recomputed,
            authors_recomputed,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arcana_common::AppError;
    use arcana_db::repositories::PostRatingRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_user(id: &str, rating: i32) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            token: None,
            full_name: "Test User".to_string(),
            nickname: None,
            date_of_birth: None,
            country: None,
            language: None,
            rating,
            avatar: None,
            is_premium: false,
            premium_expires_at: None,
            notification_email: true,
            notification_push: true,
            notification_inherit: false,
            is_admin: false,
            email_verified: true,
            email_verification_token: None,
            password_reset_token: None,
            password_reset_expires_at: None,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_service(
        user_db: Arc<sea_orm::DatabaseConnection>,
        post_db: Arc<sea_orm::DatabaseConnection>,
        rating_db: Arc<sea_orm::DatabaseConnection>,
    ) -> ModerationService {
        ModerationService::new(
            UserRepository::new(user_db.clone()),
            PostRepository::new(post_db.clone()),
            RatingService::new(
                PostRatingRepository::new(rating_db),
                PostRepository::new(post_db),
                UserRepository::new(user_db),
            ),
        )
    }

    #[tokio::test]
    async fn test_set_admin_user_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let rating_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_service(user_db, post_db, rating_db);

        let result = service.set_admin("missing", true).await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_recompute_all_empty_database() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new(), Vec::<post::Model>::new()])
                .into_connection(),
        );
        let rating_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_service(user_db, post_db, rating_db);

        let report = service.recompute_all_ratings().await.unwrap();
        assert_eq!(report.posts_recomputed, 0);
        assert_eq!(report.authors_recomputed, 0);
    }

    #[tokio::test]
    async fn test_recompute_all_resets_stale_author() {
        // One user carries a nonzero aggregate but has no published posts.
        // The rebuild must visit them and write the zero aggregate back.
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![test_user("u1", 57)],
                    Vec::<user::Model>::new(),
                ])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        // No posts at all: the post walk and the published-author set are
        // empty, then the stale author's published posts come back empty.
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    Vec::<post::Model>::new(),
                    Vec::<post::Model>::new(),
                    Vec::<post::Model>::new(),
                ])
                .into_connection(),
        );
        let rating_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_service(user_db, post_db, rating_db);

        let report = service.recompute_all_ratings().await.unwrap();
        assert_eq!(report.posts_recomputed, 0);
        assert_eq!(report.authors_recomputed, 1);
    }
}
