//! User story (activity history) service.

use arcana_common::{AppError, AppResult, IdGenerator};
use arcana_db::{
    entities::user_story::{self, StoryCategory},
    repositories::{StoryFilter, UserStoryRepository},
};
use sea_orm::Set;
use validator::Validate;

/// Input for recording a story through the API.
#[derive(Debug, serde::Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordStoryInput {
    #[validate(length(min = 1, max = 2048))]
    pub content: String,

    /// Category name; defaults to `other` when absent.
    pub category: Option<String>,
}

/// User story service for business logic.
#[derive(Clone)]
pub struct UserStoryService {
    story_repo: UserStoryRepository,
    id_gen: IdGenerator,
}

impl UserStoryService {
    /// Create a new user story service.
    #[must_use]
    pub fn new(story_repo: UserStoryRepository) -> Self {
        Self {
            story_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append an entry to a user's activity history.
    pub async fn record(
        &self,
        user_id: &str,
        category: StoryCategory,
        content: &str,
    ) -> AppResult<user_story::Model> {
        let model = user_story::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            content: Set(content.to_string()),
            category: Set(category),
            ..Default::default()
        };

        self.story_repo.create(model).await
    }

    /// Record a story from API input.
    pub async fn create(
        &self,
        user_id: &str,
        input: RecordStoryInput,
    ) -> AppResult<user_story::Model> {
        input.validate()?;

        let category = match input.category.as_deref() {
            Some(raw) => StoryCategory::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {raw}")))?,
            None => StoryCategory::Other,
        };

        self.record(user_id, category, &input.content).await
    }

    /// A single story. Only the owner or an admin may view.
    pub async fn get(
        &self,
        actor_id: &str,
        actor_is_admin: bool,
        story_id: &str,
    ) -> AppResult<user_story::Model> {
        let story = self
            .story_repo
            .find_by_id(story_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Story {story_id} not found")))?;

        if story.user_id != actor_id && !actor_is_admin {
            return Err(AppError::Forbidden);
        }

        Ok(story)
    }

    /// A user's stories, newest first, with the total count.
    pub async fn list(
        &self,
        user_id: &str,
        filter: &StoryFilter,
    ) -> AppResult<(Vec<user_story::Model>, u64)> {
        let stories = self.story_repo.find_by_user(user_id, filter).await?;
        let total = self.story_repo.count_by_user(user_id).await?;
        Ok((stories, total))
    }

    /// Delete a story. Only the owner or an admin may delete.
    pub async fn delete(
        &self,
        actor_id: &str,
        actor_is_admin: bool,
        story_id: &str,
    ) -> AppResult<()> {
        let story = self
            .story_repo
            .find_by_id(story_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Story {story_id} not found")))?;

        if story.user_id != actor_id && !actor_is_admin {
            return Err(AppError::Forbidden);
        }

        self.story_repo.delete(story).await
    }
}
