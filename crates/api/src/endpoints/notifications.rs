//! Notification endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use arcana_common::AppResult;
use arcana_db::entities::notification::{self, NotificationType};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, Pagination},
    middleware::AppState,
    response::{ok, ApiResponse},
};

/// Notification response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub related_user_id: Option<String>,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            related_user_id: n.related_user_id,
            notification_type: n.notification_type,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Notification listing with the unread count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub items: Vec<NotificationResponse>,
    pub unread: u64,
}

/// List the caller's notifications.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<ApiResponse<NotificationListResponse>> {
    let (notifications, unread) = state
        .notification_service
        .list(&user.id, pagination.offset(), pagination.limit())
        .await?;

    Ok(ApiResponse::ok(NotificationListResponse {
        items: notifications.into_iter().map(Into::into).collect(),
        unread,
    }))
}

/// Unread count response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread: u64,
}

/// The caller's unread notification count.
async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let unread = state.notification_service.unread_count(&user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { unread }))
}

/// Mark one notification read.
async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.notification_service.mark_read(&user.id, &id).await?;
    Ok(ok())
}

/// Mark all notifications read.
async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.notification_service.mark_all_read(&user.id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{id}/read", post(mark_read))
}
