//! Favourite (subscription) service.

use arcana_common::{AppError, AppResult, IdGenerator};
use arcana_db::{
    entities::{
        favourite,
        notification::NotificationType,
        user,
        user_story::StoryCategory,
    },
    repositories::{FavouriteRepository, UserRepository},
};
use sea_orm::Set;
use tracing::warn;

use crate::services::{
    email::EmailService, notification::NotificationService, user_story::UserStoryService,
};

/// Favourite service for business logic.
///
/// A favourite is a directed subscription edge between two users. Creating
/// or removing an edge also feeds the subscribed-to user's notifications
/// and the subscriber's activity history.
#[derive(Clone)]
pub struct FavouriteService {
    favourite_repo: FavouriteRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    stories: UserStoryService,
    email: EmailService,
    id_gen: IdGenerator,
}

impl FavouriteService {
    /// Create a new favourite service.
    #[must_use]
    pub fn new(
        favourite_repo: FavouriteRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
        stories: UserStoryService,
        email: EmailService,
    ) -> Self {
        Self {
            favourite_repo,
            user_repo,
            notifications,
            stories,
            email,
            id_gen: IdGenerator::new(),
        }
    }

    /// Subscribe a user to another user.
    pub async fn subscribe(
        &self,
        subscriber_id: &str,
        subscribed_to_id: &str,
    ) -> AppResult<favourite::Model> {
        if subscriber_id == subscribed_to_id {
            return Err(AppError::BadRequest(
                "Cannot subscribe to yourself".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(subscribed_to_id).await?;

        if self
            .favourite_repo
            .exists(subscriber_id, subscribed_to_id)
            .await?
        {
            return Err(AppError::Conflict("Already subscribed".to_string()));
        }

        let subscriber = self.user_repo.get_by_id(subscriber_id).await?;

        let model = favourite::ActiveModel {
            id: Set(self.id_gen.generate()),
            subscriber_id: Set(subscriber_id.to_string()),
            subscribed_to_id: Set(subscribed_to_id.to_string()),
            ..Default::default()
        };
        let edge = self.favourite_repo.create(model).await?;

        self.fan_out(
            &subscriber,
            &target,
            NotificationType::Subscription,
            "New subscriber",
            &format!("{} subscribed to you", display_name(&subscriber)),
            &format!("Subscribed to {}", display_name(&target)),
        )
        .await;

        Ok(edge)
    }

    /// Remove a subscription edge.
    ///
    /// Idempotent: returns whether an edge was actually removed.
    pub async fn unsubscribe(&self, subscriber_id: &str, subscribed_to_id: &str) -> AppResult<bool> {
        let removed = self
            .favourite_repo
            .delete_by_pair(subscriber_id, subscribed_to_id)
            .await?;

        if removed {
            let subscriber = self.user_repo.get_by_id(subscriber_id).await?;
            if let Some(target) = self.user_repo.find_by_id(subscribed_to_id).await? {
                self.fan_out(
                    &subscriber,
                    &target,
                    NotificationType::Unsubscription,
                    "Subscriber left",
                    &format!("{} unsubscribed from you", display_name(&subscriber)),
                    &format!("Unsubscribed from {}", display_name(&target)),
                )
                .await;
            }
        }

        Ok(removed)
    }

    /// Whether `subscriber_id` is subscribed to `subscribed_to_id`.
    pub async fn is_subscribed(
        &self,
        subscriber_id: &str,
        subscribed_to_id: &str,
    ) -> AppResult<bool> {
        self.favourite_repo
            .exists(subscriber_id, subscribed_to_id)
            .await
    }

    /// Users this user is subscribed to.
    pub async fn subscriptions(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        let edges = self.favourite_repo.find_by_subscriber(user_id).await?;
        let mut users = Vec::with_capacity(edges.len());
        for edge in edges {
            if let Some(user) = self.user_repo.find_by_id(&edge.subscribed_to_id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Users subscribed to this user.
    pub async fn subscribers(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        let edges = self.favourite_repo.find_by_subscribed_to(user_id).await?;
        let mut users = Vec::with_capacity(edges.len());
        for edge in edges {
            if let Some(user) = self.user_repo.find_by_id(&edge.subscriber_id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Subscription and subscriber counts for a user.
    pub async fn counts(&self, user_id: &str) -> AppResult<(u64, u64)> {
        let subscriptions = self.favourite_repo.count_subscriptions(user_id).await?;
        let subscribers = self.favourite_repo.count_subscribers(user_id).await?;
        Ok((subscriptions, subscribers))
    }

    /// Subscriber IDs of a user (for new-post fan-out).
    pub async fn subscriber_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let edges = self.favourite_repo.find_by_subscribed_to(user_id).await?;
        Ok(edges.into_iter().map(|e| e.subscriber_id).collect())
    }

    /// Notify the target (in-app and by email, honoring their preference)
    /// and record the subscriber's history entry. Failures here must not
    /// roll back the edge mutation.
    async fn fan_out(
        &self,
        subscriber: &user::Model,
        target: &user::Model,
        notification_type: NotificationType,
        title: &str,
        message: &str,
        story: &str,
    ) {
        if let Err(e) = self
            .notifications
            .notify(&target.id, Some(&subscriber.id), notification_type, title, message)
            .await
        {
            warn!(target = %target.id, error = %e, "Failed to create subscription notification");
        }

        if target.notification_email {
            if let Err(e) = self.email.send(&target.email, title, message).await {
                warn!(target = %target.id, error = %e, "Failed to send subscription email");
            }
        }

        if let Err(e) = self
            .stories
            .record(&subscriber.id, StoryCategory::Subscription, story)
            .await
        {
            warn!(subscriber = %subscriber.id, error = %e, "Failed to record subscription story");
        }
    }
}

/// Preferred display name: nickname when set, full name otherwise.
fn display_name(user: &user::Model) -> &str {
    user.nickname.as_deref().unwrap_or(&user.full_name)
}
