//! Post rating service and the rating aggregation cascade.
//!
//! A rating mutation (rate or withdraw) always runs the full cascade
//! synchronously: upsert or delete the rating row, recompute the post's
//! aggregate, then recompute the author's aggregate. The two recompute
//! functions are the only writers of `post.rating` and `user.rating`.

use arcana_common::{AppError, AppResult, IdGenerator};
use arcana_db::{
    entities::post_rating,
    repositories::{PostRatingRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use tracing::debug;

/// Lowest accepted rating value.
pub const MIN_RATING: f64 = 0.0;
/// Highest accepted rating value.
pub const MAX_RATING: f64 = 5.0;

/// Rating service for business logic.
#[derive(Clone)]
pub struct RatingService {
    rating_repo: PostRatingRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl RatingService {
    /// Create a new rating service.
    #[must_use]
    pub fn new(
        rating_repo: PostRatingRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            rating_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Rate a post, replacing any previous rating by the same user.
    ///
    /// The value is quantized to one decimal place before storage and must
    /// fall within `[MIN_RATING, MAX_RATING]`. Runs the full aggregation
    /// cascade before returning.
    pub async fn rate(
        &self,
        user_id: &str,
        post_id: &str,
        value: f64,
    ) -> AppResult<post_rating::Model> {
        if !value.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(AppError::OutOfRange(value));
        }
        let value = quantize(value);

        let post = self.post_repo.get_by_id(post_id).await?;
        if !post.is_published {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }
        if post.author_id == user_id {
            return Err(AppError::BadRequest(
                "Cannot rate your own post".to_string(),
            ));
        }

        let rating = match self
            .rating_repo
            .find_by_post_and_user(post_id, user_id)
            .await?
        {
            Some(existing) => {
                let mut active: post_rating::ActiveModel = existing.into();
                active.value = Set(value);
                active.updated_at = Set(Some(chrono::Utc::now().into()));
                self.rating_repo.update(active).await?
            }
            None => {
                let model = post_rating::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    post_id: Set(post_id.to_string()),
                    user_id: Set(user_id.to_string()),
                    value: Set(value),
                    ..Default::default()
                };
                self.rating_repo.create(model).await?
            }
        };

        self.recompute_post_rating(post_id).await?;
        self.recompute_author_rating(&post.author_id).await?;

        Ok(rating)
    }

    /// Withdraw a user's rating from a post.
    ///
    /// Idempotent: withdrawing a rating that does not exist is a no-op.
    /// Returns whether a rating was actually removed.
    pub async fn withdraw(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let removed = self
            .rating_repo
            .delete_by_post_and_user(post_id, user_id)
            .await?;

        if removed {
            self.recompute_post_rating(post_id).await?;
            self.recompute_author_rating(&post.author_id).await?;
        }

        Ok(removed)
    }

    /// Recompute a post's aggregate rating from its rating rows.
    ///
    /// Mean of all values, rounded to one decimal place; `0.0` when the
    /// post has no ratings. Sole writer of `post.rating`.
    pub async fn recompute_post_rating(&self, post_id: &str) -> AppResult<f64> {
        let ratings = self.rating_repo.find_by_post(post_id).await?;
        let values: Vec<f64> = ratings.iter().map(|r| r.value).collect();

        let aggregate = round_post_rating(&values);
        self.post_repo.set_rating(post_id, aggregate).await?;

        debug!(post_id, rating = aggregate, "Recomputed post rating");
        Ok(aggregate)
    }

    /// Recompute an author's aggregate rating from their published posts.
    ///
    /// Mean of the published posts' aggregate ratings, scaled by ten and
    /// rounded to an integer; `0` when the author has no published posts.
    /// Sole writer of `user.rating`.
    pub async fn recompute_author_rating(&self, author_id: &str) -> AppResult<i32> {
        let posts = self.post_repo.find_published_by_author(author_id).await?;
        let ratings: Vec<f64> = posts.iter().map(|p| p.rating).collect();

        let aggregate = scale_author_rating(&ratings);
        self.user_repo.set_rating(author_id, aggregate).await?;

        debug!(author_id, rating = aggregate, "Recomputed author rating");
        Ok(aggregate)
    }

    /// Number of ratings a post has received.
    pub async fn count_for_post(&self, post_id: &str) -> AppResult<u64> {
        self.rating_repo.count_by_post(post_id).await
    }

    /// A user's own rating of a post, if any.
    pub async fn find_own(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<post_rating::Model>> {
        self.rating_repo.find_by_post_and_user(post_id, user_id).await
    }
}

/// Quantize a rating value to one decimal place.
fn quantize(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Post aggregate: mean of rating values, rounded to one decimal place.
/// `0.0` for an empty set.
fn round_post_rating(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Author aggregate: mean of post ratings scaled by ten, rounded to an
/// integer. `0` for an empty set.
fn scale_author_rating(ratings: &[f64]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
    (mean * 10.0).round() as i32
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arcana_db::entities::post;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_post(id: &str, author_id: &str, rating: f64, is_published: bool) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "Title".to_string(),
            preview_text: "Preview".to_string(),
            content: "Content".to_string(),
            preview_image: None,
            rating,
            comments_count: 0,
            views_count: 0,
            category: post::Category::Esoterics,
            accessibility: post::Accessibility::All,
            is_published,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_rating(id: &str, post_id: &str, user_id: &str, value: f64) -> post_rating::Model {
        post_rating::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            value,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(
        rating_db: Arc<sea_orm::DatabaseConnection>,
        post_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> RatingService {
        RatingService::new(
            PostRatingRepository::new(rating_db),
            PostRepository::new(post_db),
            UserRepository::new(user_db),
        )
    }

    #[test]
    fn test_round_post_rating_mean() {
        assert_eq!(round_post_rating(&[4.0, 5.0]), 4.5);
        assert_eq!(round_post_rating(&[3.0, 3.0, 4.0]), 3.3);
        assert_eq!(round_post_rating(&[5.0]), 5.0);
    }

    #[test]
    fn test_round_post_rating_empty() {
        assert_eq!(round_post_rating(&[]), 0.0);
    }

    #[test]
    fn test_scale_author_rating() {
        assert_eq!(scale_author_rating(&[4.5]), 45);
        assert_eq!(scale_author_rating(&[4.0, 5.0]), 45);
        assert_eq!(scale_author_rating(&[3.3, 3.3, 3.3]), 33);
    }

    #[test]
    fn test_scale_author_rating_empty() {
        assert_eq!(scale_author_rating(&[]), 0);
    }

    #[test]
    fn test_quantize_one_decimal() {
        assert_eq!(quantize(4.44), 4.4);
        assert_eq!(quantize(4.45), 4.5);
        assert_eq!(quantize(5.0), 5.0);
    }

    #[tokio::test]
    async fn test_rate_out_of_range() {
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let service = service(rating_db, post_db, user_db);

        let result = service.rate("user1", "post1", 5.5).await;
        assert!(matches!(result, Err(AppError::OutOfRange(_))));

        let result = service.rate("user1", "post1", -0.1).await;
        assert!(matches!(result, Err(AppError::OutOfRange(_))));

        let result = service.rate("user1", "post1", f64::NAN).await;
        assert!(matches!(result, Err(AppError::OutOfRange(_))));
    }

    #[tokio::test]
    async fn test_rate_post_not_found() {
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let service = service(rating_db, post_db, user_db);

        let result = service.rate("user1", "missing", 4.0).await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_rate_unpublished_post() {
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_post("post1", "author1", 0.0, false)]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let service = service(rating_db, post_db, user_db);

        let result = service.rate("user1", "post1", 4.0).await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_rate_own_post_rejected() {
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_post("post1", "author1", 0.0, true)]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let service = service(rating_db, post_db, user_db);

        let result = service.rate("author1", "post1", 4.0).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_rate_runs_full_cascade() {
        // Rating db: no existing rating, insert, then the post's ratings
        // for the recompute.
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    Vec::<post_rating::Model>::new(),
                    vec![test_rating("r1", "post1", "user2", 4.0)],
                    vec![
                        test_rating("r1", "post1", "user2", 4.0),
                        test_rating("r2", "post1", "user3", 5.0),
                    ],
                ])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        // Post db: the rated post, then the author's published posts,
        // plus the set_rating update.
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![test_post("post1", "author1", 0.0, true)],
                    vec![test_post("post1", "author1", 4.5, true)],
                ])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = service(rating_db, post_db, user_db);

        let rating = service.rate("user2", "post1", 4.0).await.unwrap();
        assert_eq!(rating.value, 4.0);
        assert_eq!(rating.post_id, "post1");
    }

    #[tokio::test]
    async fn test_recompute_twice_writes_same_aggregates() {
        // Running an aggregator again over the same rows must produce the
        // same value it produced the first time.
        let rows = vec![
            test_rating("r1", "post1", "user2", 4.0),
            test_rating("r2", "post1", "user3", 3.0),
        ];
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows.clone(), rows])
                .into_connection(),
        );
        let published = vec![test_post("post1", "author1", 3.5, true)];
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([published.clone(), published])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );
        let service = service(rating_db, post_db, user_db);

        let first = service.recompute_post_rating("post1").await.unwrap();
        let second = service.recompute_post_rating("post1").await.unwrap();
        assert_eq!(first, 3.5);
        assert_eq!(second, first);

        let first = service.recompute_author_rating("author1").await.unwrap();
        let second = service.recompute_author_rating("author1").await.unwrap();
        assert_eq!(first, 35);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_withdraw_missing_rating_is_noop() {
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_post("post1", "author1", 4.0, true)]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let service = service(rating_db, post_db, user_db);

        let removed = service.withdraw("user2", "post1").await.unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_withdraw_last_rating_resets_to_zero() {
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_rating::Model>::new()])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![test_post("post1", "author1", 4.0, true)],
                    vec![test_post("post1", "author1", 0.0, true)],
                ])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = service(rating_db, post_db, user_db);

        let removed = service.withdraw("user2", "post1").await.unwrap();
        assert!(removed);
    }
}
