//! User story (activity history) endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use arcana_common::{AppError, AppResult};
use arcana_core::RecordStoryInput;
use arcana_db::{
    entities::user_story::{self, StoryCategory},
    repositories::StoryFilter,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ok, ApiResponse, Page},
};

/// Story response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub id: String,
    pub content: String,
    pub category: StoryCategory,
    pub created_at: String,
}

impl From<user_story::Model> for StoryResponse {
    fn from(story: user_story::Model) -> Self {
        Self {
            id: story.id,
            content: story.content,
            category: story.category,
            created_at: story.created_at.to_rfc3339(),
        }
    }
}

/// Story listing query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryQuery {
    pub category: Option<String>,
    pub date_from: Option<DateTime<FixedOffset>>,
    pub date_to: Option<DateTime<FixedOffset>>,
}

/// List the caller's activity history.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StoryQuery>,
) -> AppResult<ApiResponse<Page<StoryResponse>>> {
    let category = match &query.category {
        Some(raw) => Some(
            StoryCategory::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {raw}")))?,
        ),
        None => None,
    };

    let filter = StoryFilter {
        category,
        date_from: query.date_from,
        date_to: query.date_to,
    };

    let (stories, total) = state.story_service.list(&user.id, &filter).await?;
    Ok(ApiResponse::ok(Page {
        items: stories.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Record a story in the caller's history.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RecordStoryInput>,
) -> AppResult<ApiResponse<StoryResponse>> {
    let story = state.story_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(story.into()))
}

/// Get one of the caller's stories.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<StoryResponse>> {
    let story = state
        .story_service
        .get(&user.id, user.is_admin, &id)
        .await?;
    Ok(ApiResponse::ok(story.into()))
}

/// Delete one of the caller's stories.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state
        .story_service
        .delete(&user.id, user.is_admin, &id)
        .await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).delete(delete))
}
