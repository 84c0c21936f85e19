//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use arcana_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Sort orders for the published post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    /// Newest first (the default).
    #[default]
    CreatedAtDesc,
    /// Oldest first.
    CreatedAtAsc,
    /// Highest rated first.
    RatingDesc,
    /// Lowest rated first.
    RatingAsc,
    /// Most viewed first.
    ViewsDesc,
    /// Least viewed first.
    ViewsAsc,
}

impl PostSort {
    /// Parse the wire form (`-created_at`, `rating`, ...). Unknown values
    /// fall back to the default ordering.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "created_at" => Self::CreatedAtAsc,
            "rating" => Self::RatingAsc,
            "-rating" => Self::RatingDesc,
            "views_count" => Self::ViewsAsc,
            "-views_count" => Self::ViewsDesc,
            _ => Self::CreatedAtDesc,
        }
    }
}

/// Filters for the published post listing.
#[derive(Debug, Clone, Default)]
pub struct PostListFilter {
    /// Restrict to one category.
    pub category: Option<post::Category>,
    /// Case-insensitive substring match over title and preview text.
    pub search: Option<String>,
    /// Sort order.
    pub sort: PostSort,
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All posts including drafts, newest first (back-office listing).
    pub async fn find_all(&self, offset: u64, limit: u64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all posts including drafts.
    pub async fn count_all(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn published_query(filter: &PostListFilter) -> sea_orm::Select<Post> {
        let mut query = Post::find().filter(post::Column::IsPublished.eq(true));

        if let Some(ref category) = filter.category {
            query = query.filter(post::Column::Category.eq(category.clone()));
        }

        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            query = query.filter(
                Condition::any()
                    .add(Expr::col(post::Column::Title).ilike(pattern.clone()))
                    .add(Expr::col(post::Column::PreviewText).ilike(pattern)),
            );
        }

        match filter.sort {
            PostSort::CreatedAtDesc => query.order_by_desc(post::Column::CreatedAt),
            PostSort::CreatedAtAsc => query.order_by_asc(post::Column::CreatedAt),
            PostSort::RatingDesc => query.order_by_desc(post::Column::Rating),
            PostSort::RatingAsc => query.order_by_asc(post::Column::Rating),
            PostSort::ViewsDesc => query.order_by_desc(post::Column::ViewsCount),
            PostSort::ViewsAsc => query.order_by_asc(post::Column::ViewsCount),
        }
    }

    /// List published posts, filtered and paginated.
    pub async fn find_published(
        &self,
        filter: &PostListFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<post::Model>> {
        Self::published_query(filter)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count published posts matching a filter.
    pub async fn count_published(&self, filter: &PostListFilter) -> AppResult<u64> {
        Self::published_query(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all posts by an author, optionally filtered by publish state.
    pub async fn find_by_author(
        &self,
        author_id: &str,
        is_published: Option<bool>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().filter(post::Column::AuthorId.eq(author_id));

        if let Some(published) = is_published {
            query = query.filter(post::Column::IsPublished.eq(published));
        }

        query
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an author's published posts (the source set of the author
    /// aggregator).
    pub async fn find_published_by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        self.find_by_author(author_id, Some(true)).await
    }

    /// Top published posts by rating, views as tiebreak.
    pub async fn find_top(&self, limit: u64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::IsPublished.eq(true))
            .order_by_desc(post::Column::Rating)
            .order_by_desc(post::Column::ViewsCount)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Author IDs that currently have at least one published post.
    pub async fn published_author_ids(&self) -> AppResult<Vec<String>> {
        let rows = Post::find()
            .filter(post::Column::IsPublished.eq(true))
            .select_only()
            .column(post::Column::AuthorId)
            .distinct()
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows)
    }

    /// Increment view count atomically (single UPDATE query, no fetch).
    pub async fn increment_views_count(&self, post_id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::ViewsCount,
                Expr::col(post::Column::ViewsCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write the aggregated rating (single-field update; no other post side
    /// effects are triggered).
    pub async fn set_rating(&self, post_id: &str, rating: f64) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::Rating, Expr::value(rating))
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write the denormalized non-deleted comment count.
    pub async fn set_comments_count(&self, post_id: &str, count: i32) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::CommentsCount, Expr::value(count))
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_post(id: &str, author_id: &str, rating: f64, published: bool) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "Test post".to_string(),
            preview_text: "Preview".to_string(),
            content: "Content".to_string(),
            preview_image: None,
            rating,
            comments_count: 0,
            views_count: 0,
            category: post::Category::Tarot,
            accessibility: post::Accessibility::All,
            is_published: published,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_published_by_author() {
        let p1 = create_test_post("p1", "author1", 4.5, true);
        let p2 = create_test_post("p2", "author1", 3.0, true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_published_by_author("author1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.is_published));
    }

    #[tokio::test]
    async fn test_find_published_with_search_filter() {
        let p1 = create_test_post("p1", "author1", 4.5, true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let filter = PostListFilter {
            category: None,
            search: Some("tarot".to_string()),
            sort: PostSort::RatingDesc,
        };
        let result = repo.find_published(&filter, 0, 20).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "p1");
    }

    #[test]
    fn test_post_sort_parse() {
        assert_eq!(PostSort::parse("-created_at"), PostSort::CreatedAtDesc);
        assert_eq!(PostSort::parse("created_at"), PostSort::CreatedAtAsc);
        assert_eq!(PostSort::parse("-rating"), PostSort::RatingDesc);
        assert_eq!(PostSort::parse("views_count"), PostSort::ViewsAsc);
        // Unknown values fall back to newest-first
        assert_eq!(PostSort::parse("bogus"), PostSort::CreatedAtDesc);
    }
}
