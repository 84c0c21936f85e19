//! Favourite (subscription) endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Router,
};
use arcana_common::AppResult;
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ok, ApiResponse},
};

/// Subscription state response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscribed_to_id: String,
    pub subscribed: bool,
}

/// Subscription/subscriber counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsResponse {
    pub subscriptions: u64,
    pub subscribers: u64,
}

/// Subscribe to a user.
async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    let edge = state.favourite_service.subscribe(&user.id, &id).await?;
    Ok(ApiResponse::ok(SubscriptionResponse {
        subscribed_to_id: edge.subscribed_to_id,
        subscribed: true,
    }))
}

/// Unsubscribe from a user.
async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.favourite_service.unsubscribe(&user.id, &id).await?;
    Ok(ok())
}

/// Whether the caller is subscribed to a user.
async fn status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    let subscribed = state.favourite_service.is_subscribed(&user.id, &id).await?;
    Ok(ApiResponse::ok(SubscriptionResponse {
        subscribed_to_id: id,
        subscribed,
    }))
}

/// The caller's subscription and subscriber counts.
async fn counts(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountsResponse>> {
    let (subscriptions, subscribers) = state.favourite_service.counts(&user.id).await?;
    Ok(ApiResponse::ok(CountsResponse {
        subscriptions,
        subscribers,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/counts", get(counts))
        .route("/{id}", put(subscribe).delete(unsubscribe).get(status))
}
