//! User endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use arcana_common::AppResult;
use arcana_core::{ChangePasswordInput, UpdateUserInput};
use arcana_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ok, ApiResponse},
};

use super::posts::PostResponse;

/// Public user profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub nickname: Option<String>,
    pub country: Option<String>,
    pub rating: i32,
    pub avatar: Option<String>,
    pub is_premium: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            nickname: user.nickname,
            country: user.country,
            rating: user.rating,
            avatar: user.avatar,
            is_premium: user.is_premium,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// A user's own account view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub nickname: Option<String>,
    pub date_of_birth: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub rating: i32,
    pub avatar: Option<String>,
    pub is_premium: bool,
    pub premium_expires_at: Option<String>,
    pub notification_email: bool,
    pub notification_push: bool,
    pub notification_inherit: bool,
    pub is_admin: bool,
    pub email_verified: bool,
    pub created_at: String,
}

impl From<user::Model> for AccountResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            nickname: user.nickname,
            date_of_birth: user.date_of_birth.map(|d| d.to_string()),
            country: user.country,
            language: user.language,
            rating: user.rating,
            avatar: user.avatar,
            is_premium: user.is_premium,
            premium_expires_at: user.premium_expires_at.map(|t| t.to_rfc3339()),
            notification_email: user.notification_email,
            notification_push: user.notification_push,
            notification_inherit: user.notification_inherit,
            is_admin: user.is_admin,
            email_verified: user.email_verified,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Top listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopQuery {
    #[serde(default = "default_top_limit")]
    pub limit: u64,
}

const fn default_top_limit() -> u64 {
    10
}

/// Get own account.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<AccountResponse> {
    ApiResponse::ok(user.into())
}

/// Update own profile.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let updated = state.user_service.update(&user.id, input).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Change own password.
async fn change_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.user_service.change_password(&user.id, input).await?;
    Ok(ok())
}

/// Users the caller is subscribed to.
async fn my_subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.favourite_service.subscriptions(&user.id).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Users subscribed to the caller.
async fn my_subscribers(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.favourite_service.subscribers(&user.id).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Top authors by rating.
async fn top(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.top_authors(query.limit.min(100)).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Get a user's public profile.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// A user's posts. Drafts are visible only to the author.
async fn user_posts(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.post_service.by_author(&id, viewer.as_ref()).await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_me))
        .route("/me/change-password", post(change_password))
        .route("/me/subscriptions", get(my_subscriptions))
        .route("/me/subscribers", get(my_subscribers))
        .route("/top", get(top))
        .route("/{id}", get(show))
        .route("/{id}/posts", get(user_posts))
}
