//! Comment service.
//!
//! Comments form a thread tree per post. Deletion is a tombstone: the row
//! stays but is excluded from listings and the per-post counter.

use std::collections::{HashMap, HashSet};

use arcana_common::{AppError, AppResult, IdGenerator};
use arcana_db::{
    entities::{comment, notification::NotificationType, user},
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Serialize;
use tracing::warn;
use validator::Validate;

use crate::services::notification::NotificationService;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

/// Input for creating a comment.
#[derive(Debug, serde::Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 4096))]
    pub text: String,

    /// Parent comment for replies.
    pub parent_id: Option<String>,
}

/// Input for editing a comment.
#[derive(Debug, serde::Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentInput {
    #[validate(length(min = 1, max = 4096))]
    pub text: String,
}

/// A comment with its replies, as returned by the thread listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    /// The comment itself.
    #[serde(flatten)]
    pub comment: comment::Model,
    /// Direct replies, oldest first.
    pub replies: Vec<CommentNode>,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a post.
    ///
    /// The post must be published; a reply's parent must be a visible
    /// comment on the same post.
    pub async fn create(
        &self,
        author: &user::Model,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        if !post.is_published {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        let mut parent_author_id = None;
        if let Some(parent_id) = &input.parent_id {
            let parent = self
                .comment_repo
                .find_visible_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Comment {parent_id} not found")))?;
            if parent.post_id != post_id {
                return Err(AppError::BadRequest(
                    "Parent comment belongs to a different post".to_string(),
                ));
            }
            parent_author_id = Some(parent.author_id);
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            author_id: Set(author.id.clone()),
            parent_id: Set(input.parent_id),
            text: Set(input.text),
            ..Default::default()
        };
        let created = self.comment_repo.create(model).await?;

        self.refresh_count(post_id).await?;

        let commenter = author
            .nickname
            .as_deref()
            .unwrap_or(&author.full_name)
            .to_string();

        // Post author hears about every comment, a reply also pings the
        // parent comment's author.
        let mut recipients: Vec<&str> = Vec::new();
        if post.author_id != author.id {
            recipients.push(&post.author_id);
        }
        if let Some(parent_author) = &parent_author_id {
            if *parent_author != author.id && *parent_author != post.author_id {
                recipients.push(parent_author);
            }
        }

        let message = format!("{} commented on \"{}\"", commenter, post.title);
        for recipient in recipients {
            if let Err(e) = self
                .notifications
                .notify(
                    recipient,
                    Some(&author.id),
                    NotificationType::Comment,
                    "New comment",
                    &message,
                )
                .await
            {
                warn!(recipient, error = %e, "Failed to create comment notification");
            }
        }

        Ok(created)
    }

    /// Edit a comment. Author only.
    pub async fn update(
        &self,
        comment_id: &str,
        actor: &user::Model,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let comment = self
            .comment_repo
            .find_visible_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))?;

        if comment.author_id != actor.id {
            return Err(AppError::Forbidden);
        }

        let mut active: comment::ActiveModel = comment.into();
        active.text = Set(input.text);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.comment_repo.update(active).await
    }

    /// Delete a comment (tombstone).
    ///
    /// The comment's author, the post's author and admins may delete.
    pub async fn delete(&self, comment_id: &str, actor: &user::Model) -> AppResult<()> {
        let comment = self
            .comment_repo
            .find_visible_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))?;

        let post = self.post_repo.get_by_id(&comment.post_id).await?;

        let allowed =
            comment.author_id == actor.id || post.author_id == actor.id || actor.is_admin;
        if !allowed {
            return Err(AppError::Forbidden);
        }

        let post_id = comment.post_id.clone();
        let mut active: comment::ActiveModel = comment.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.comment_repo.update(active).await?;

        self.refresh_count(&post_id).await
    }

    /// The visible comment thread of a published post.
    pub async fn thread(&self, post_id: &str) -> AppResult<Vec<CommentNode>> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if !post.is_published {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        let comments = self.comment_repo.find_visible_by_post(post_id).await?;
        Ok(build_tree(comments))
    }

    /// Number of visible comments on a post.
    pub async fn count(&self, post_id: &str) -> AppResult<u64> {
        self.comment_repo.count_visible_by_post(post_id).await
    }

    /// Recount visible comments and store the counter on the post.
    async fn refresh_count(&self, post_id: &str) -> AppResult<()> {
        let count = self.comment_repo.count_visible_by_post(post_id).await?;
        self.post_repo.set_comments_count(post_id, count as i32).await
    }
}

/// Assemble a flat, chronologically ordered comment list into a tree.
///
/// Replies whose parent is not in the list (tombstoned) are promoted to
/// the root level so they stay reachable.
fn build_tree(comments: Vec<comment::Model>) -> Vec<CommentNode> {
    let ids: HashSet<String> = comments.iter().map(|c| c.id.clone()).collect();

    let mut by_parent: HashMap<Option<String>, Vec<comment::Model>> = HashMap::new();
    for comment in comments {
        let key = match &comment.parent_id {
            Some(parent) if ids.contains(parent) => Some(parent.clone()),
            _ => None,
        };
        by_parent.entry(key).or_default().push(comment);
    }

    attach(&None, &mut by_parent)
}

fn attach(
    key: &Option<String>,
    by_parent: &mut HashMap<Option<String>, Vec<comment::Model>>,
) -> Vec<CommentNode> {
    let Some(level) = by_parent.remove(key) else {
        return Vec::new();
    };
    level
        .into_iter()
        .map(|comment| {
            let replies = attach(&Some(comment.id.clone()), by_parent);
            CommentNode { comment, replies }
        })
        .collect()
}
