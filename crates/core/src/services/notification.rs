//! Notification service.

use arcana_common::{AppError, AppResult, IdGenerator};
use arcana_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Notification service for business logic.
///
/// Notifications are always stored in-app; the email and push preference
/// flags on the user only steer outbound delivery channels.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a notification for a user.
    pub async fn notify(
        &self,
        user_id: &str,
        related_user_id: Option<&str>,
        notification_type: NotificationType,
        title: &str,
        message: &str,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            related_user_id: Set(related_user_id.map(ToString::to_string)),
            notification_type: Set(notification_type),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            ..Default::default()
        };

        self.notification_repo.create(model).await
    }

    /// A user's notifications, newest first, with the unread count.
    pub async fn list(
        &self,
        user_id: &str,
        offset: u64,
        limit: u64,
    ) -> AppResult<(Vec<notification::Model>, u64)> {
        let notifications = self
            .notification_repo
            .find_by_user(user_id, offset, limit)
            .await?;
        let unread = self.notification_repo.count_unread(user_id).await?;
        Ok((notifications, unread))
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark one of the user's notifications read.
    pub async fn mark_read(&self, user_id: &str, id: &str) -> AppResult<()> {
        let notification = self
            .notification_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {id} not found")))?;

        if notification.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        self.notification_repo.mark_read(id).await
    }

    /// Mark all of the user's notifications read.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<()> {
        self.notification_repo.mark_all_read(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_notification(id: &str, user_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            related_user_id: None,
            notification_type: NotificationType::Subscription,
            title: "New subscriber".to_string(),
            message: "Someone subscribed to you".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_mark_read_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.mark_read("user1", "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_read_wrong_owner() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_notification("n1", "owner")]])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.mark_read("intruder", "n1").await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_notify_creates_notification() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_notification("n1", "user1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let created = service
            .notify(
                "user1",
                None,
                NotificationType::Subscription,
                "New subscriber",
                "Someone subscribed to you",
            )
            .await
            .unwrap();
        assert_eq!(created.user_id, "user1");
    }
}
