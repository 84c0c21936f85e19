//! Admin back-office endpoints.
//!
//! Every route requires an authenticated admin.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use arcana_common::AppResult;
use arcana_core::{PublishPolicyInput, RecomputeReport};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::{
    extractors::{AdminUser, Pagination},
    middleware::AppState,
    response::{ok, ApiResponse, Page},
};

use super::{policy::PolicyResponse, posts::PostResponse, users::AccountResponse};

/// Admin flag update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

/// Premium status update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPremiumRequest {
    pub is_premium: bool,
    pub expires_at: Option<DateTime<FixedOffset>>,
}

/// List all users.
async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<ApiResponse<Page<AccountResponse>>> {
    let (users, total) = state
        .moderation_service
        .list_users(pagination.offset(), pagination.limit())
        .await?;

    Ok(ApiResponse::ok(Page {
        items: users.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// List all posts, drafts included.
async fn list_posts(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let (posts, total) = state
        .moderation_service
        .list_posts(pagination.offset(), pagination.limit())
        .await?;

    Ok(ApiResponse::ok(Page {
        items: posts.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Grant or revoke admin rights.
async fn set_admin(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetAdminRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let user = state.moderation_service.set_admin(&id, req.is_admin).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Grant or revoke premium status.
async fn set_premium(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetPremiumRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let user = state
        .moderation_service
        .set_premium(&id, req.is_premium, req.expires_at)
        .await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Delete any post.
async fn delete_post(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.post_service.delete(&id, &admin).await?;
    Ok(ok())
}

/// Publish a new privacy policy revision.
async fn publish_policy(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<PublishPolicyInput>,
) -> AppResult<ApiResponse<PolicyResponse>> {
    let policy = state.policy_service.publish(input).await?;
    Ok(ApiResponse::ok(policy.into()))
}

/// Rebuild all rating aggregates.
async fn recompute_ratings(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<RecomputeReport>> {
    let report = state.moderation_service.recompute_all_ratings().await?;
    Ok(ApiResponse::ok(report))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}/admin", put(set_admin))
        .route("/users/{id}/premium", put(set_premium))
        .route("/posts", get(list_posts))
        .route("/posts/{id}", axum::routing::delete(delete_post))
        .route("/privacy-policy", post(publish_policy))
        .route("/ratings/recompute", post(recompute_ratings))
}
