//! Post service.

use arcana_common::{AppError, AppResult, IdGenerator};
use arcana_db::{
    entities::{
        notification::NotificationType,
        post::{self, Accessibility, Category},
        user,
    },
    repositories::{FavouriteRepository, PostListFilter, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::warn;
use validator::Validate;

use crate::services::{notification::NotificationService, rating::RatingService};

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    favourite_repo: FavouriteRepository,
    notifications: NotificationService,
    ratings: RatingService,
    id_gen: IdGenerator,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(max = 1024))]
    pub preview_text: String,

    #[validate(length(min = 1))]
    pub content: String,

    pub preview_image: Option<String>,

    pub category: Category,

    pub accessibility: Option<Accessibility>,

    pub is_published: Option<bool>,
}

/// Input for updating a post.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 1024))]
    pub preview_text: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    pub preview_image: Option<String>,

    pub category: Option<Category>,

    pub accessibility: Option<Accessibility>,

    pub is_published: Option<bool>,
}

/// One page of a post listing.
#[derive(Debug)]
pub struct PostListPage {
    /// Posts on this page.
    pub posts: Vec<post::Model>,
    /// Total number of matching posts.
    pub total: u64,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        favourite_repo: FavouriteRepository,
        notifications: NotificationService,
        ratings: RatingService,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            favourite_repo,
            notifications,
            ratings,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    ///
    /// Publishing immediately notifies the author's subscribers and
    /// refreshes the author's aggregate rating, since the published set
    /// changed.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let is_published = input.is_published.unwrap_or(true);

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            title: Set(input.title),
            preview_text: Set(input.preview_text),
            content: Set(input.content),
            preview_image: Set(input.preview_image),
            category: Set(input.category),
            accessibility: Set(input.accessibility.unwrap_or(Accessibility::All)),
            is_published: Set(is_published),
            ..Default::default()
        };

        let created = self.post_repo.create(model).await?;

        if is_published {
            self.ratings.recompute_author_rating(author_id).await?;
            self.fan_out_new_post(&created).await;
        }

        Ok(created)
    }

    /// Get a post for a viewer, enforcing visibility and accessibility.
    ///
    /// Unpublished posts are only visible to their author and admins.
    /// Views by anyone other than the author bump the view counter.
    pub async fn get(&self, post_id: &str, viewer: Option<&user::Model>) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let viewer_id = viewer.map(|u| u.id.as_str());
        let is_author = viewer_id == Some(post.author_id.as_str());
        let is_admin = viewer.is_some_and(|u| u.is_admin);

        if !post.is_published && !is_author && !is_admin {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        if !is_author && !is_admin {
            self.check_accessibility(&post, viewer_id).await?;
        }

        if !is_author {
            self.post_repo.increment_views_count(&post.id).await?;
        }

        Ok(post)
    }

    /// Fetch a post without visibility checks or view counting.
    pub async fn peek(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(post_id).await
    }

    /// List published posts, filtered and paginated.
    pub async fn list(
        &self,
        filter: &PostListFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<PostListPage> {
        let posts = self.post_repo.find_published(filter, offset, limit).await?;
        let total = self.post_repo.count_published(filter).await?;
        Ok(PostListPage { posts, total })
    }

    /// Top published posts by rating.
    pub async fn top(&self, limit: u64) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_top(limit).await
    }

    /// An author's posts. Drafts are included only for the author themselves.
    pub async fn by_author(
        &self,
        author_id: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<Vec<post::Model>> {
        let is_self = viewer.is_some_and(|u| u.id == author_id);
        let published = if is_self { None } else { Some(true) };
        self.post_repo.find_by_author(author_id, published).await
    }

    /// Update a post. Author only.
    ///
    /// A publish-state change refreshes the author's aggregate rating;
    /// a first publish also notifies subscribers.
    pub async fn update(
        &self,
        post_id: &str,
        actor: &user::Model,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != actor.id {
            return Err(AppError::Forbidden);
        }

        let was_published = post.is_published;
        let author_id = post.author_id.clone();

        let mut active: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(preview_text) = input.preview_text {
            active.preview_text = Set(preview_text);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(preview_image) = input.preview_image {
            active.preview_image = Set(Some(preview_image));
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(accessibility) = input.accessibility {
            active.accessibility = Set(accessibility);
        }
        if let Some(is_published) = input.is_published {
            active.is_published = Set(is_published);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.post_repo.update(active).await?;

        if updated.is_published != was_published {
            self.ratings.recompute_author_rating(&author_id).await?;
            if updated.is_published {
                self.fan_out_new_post(&updated).await;
            }
        }

        Ok(updated)
    }

    /// Delete a post. Author or admin only.
    ///
    /// The author's aggregate rating is refreshed afterwards, since the
    /// published set shrank.
    pub async fn delete(&self, post_id: &str, actor: &user::Model) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != actor.id && !actor.is_admin {
            return Err(AppError::Forbidden);
        }

        let author_id = post.author_id.clone();
        let was_published = post.is_published;

        self.post_repo.delete(post_id).await?;

        if was_published {
            self.ratings.recompute_author_rating(&author_id).await?;
        }

        Ok(())
    }

    async fn check_accessibility(
        &self,
        post: &post::Model,
        viewer_id: Option<&str>,
    ) -> AppResult<()> {
        match post.accessibility {
            Accessibility::All => Ok(()),
            Accessibility::Subscribers => {
                let viewer_id = viewer_id.ok_or(AppError::Forbidden)?;
                if self.favourite_repo.exists(viewer_id, &post.author_id).await? {
                    Ok(())
                } else {
                    Err(AppError::Forbidden)
                }
            }
            Accessibility::MySubscribers => {
                let viewer_id = viewer_id.ok_or(AppError::Forbidden)?;
                if self.favourite_repo.exists(&post.author_id, viewer_id).await? {
                    Ok(())
                } else {
                    Err(AppError::Forbidden)
                }
            }
        }
    }

    /// Notify the author's subscribers about a newly published post.
    /// Failures must not roll back the post mutation.
    async fn fan_out_new_post(&self, post: &post::Model) {
        let author_name = match self.user_repo.find_by_id(&post.author_id).await {
            Ok(Some(author)) => author
                .nickname
                .unwrap_or(author.full_name),
            _ => return,
        };

        let edges = match self.favourite_repo.find_by_subscribed_to(&post.author_id).await {
            Ok(edges) => edges,
            Err(e) => {
                warn!(post_id = %post.id, error = %e, "Failed to load subscribers for fan-out");
                return;
            }
        };

        let message = format!("{} published \"{}\"", author_name, post.title);
        for edge in edges {
            if let Err(e) = self
                .notifications
                .notify(
                    &edge.subscriber_id,
                    Some(&post.author_id),
                    NotificationType::NewPost,
                    "New post",
                    &message,
                )
                .await
            {
                warn!(subscriber = %edge.subscriber_id, error = %e, "Failed to notify subscriber");
            }
        }
    }
}
