//! Post endpoints, including ratings and per-post comments.

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use arcana_common::{AppError, AppResult};
use arcana_core::{CreateCommentInput, CreatePostInput, UpdatePostInput};
use arcana_db::{
    entities::post::{self, Category},
    repositories::{PostListFilter, PostSort},
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser, Pagination},
    middleware::AppState,
    response::{ok, ApiResponse, Page},
};

use super::comments::CommentResponse;

/// Post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub preview_text: String,
    pub content: String,
    pub preview_image: Option<String>,
    pub rating: f64,
    pub comments_count: i32,
    pub views_count: i64,
    pub category: Category,
    pub accessibility: post::Accessibility,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(post: post::Model) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            preview_text: post.preview_text,
            content: post.content,
            preview_image: post.preview_image,
            rating: post.rating,
            comments_count: post.comments_count,
            views_count: post.views_count,
            category: post.category,
            accessibility: post.accessibility,
            is_published: post.is_published,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Post detail response: the post plus rating context for the viewer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub ratings_count: u64,
    pub own_rating: Option<f64>,
}

/// Post listing query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
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

/// Rate request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub value: f64,
}

/// Rate response: the stored rating plus the refreshed post aggregate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    pub post_id: String,
    pub value: f64,
    pub post_rating: f64,
}

fn build_filter(query: &ListQuery) -> AppResult<PostListFilter> {
    let category = match &query.category {
        Some(raw) => Some(
            Category::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {raw}")))?,
        ),
        None => None,
    };

    Ok(PostListFilter {
        category,
        search: query.search.clone().filter(|s| !s.is_empty()),
        sort: query.sort.as_deref().map(PostSort::parse).unwrap_or_default(),
    })
}

/// List published posts.
async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let filter = build_filter(&query)?;
    let page = state
        .post_service
        .list(&filter, pagination.offset(), pagination.limit())
        .await?;

    Ok(ApiResponse::ok(Page {
        items: page.posts.into_iter().map(Into::into).collect(),
        total: page.total,
    }))
}

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Top published posts by rating.
async fn top(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.post_service.top(query.limit.min(100)).await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Get a post.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let post = state.post_service.get(&id, viewer.as_ref()).await?;

    let ratings_count = state.rating_service.count_for_post(&post.id).await?;
    let own_rating = match &viewer {
        Some(user) => state
            .rating_service
            .find_own(&user.id, &post.id)
            .await?
            .map(|r| r.value),
        None => None,
    };

    Ok(ApiResponse::ok(PostDetailResponse {
        post: post.into(),
        ratings_count,
        own_rating,
    }))
}

/// Update a post.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.update(&id, &user, input).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.post_service.delete(&id, &user).await?;
    Ok(ok())
}

/// Rate a post.
async fn rate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RateRequest>,
) -> AppResult<ApiResponse<RateResponse>> {
    let rating = state.rating_service.rate(&user.id, &id, req.value).await?;
    let post = state.post_service.peek(&id).await?;

    Ok(ApiResponse::ok(RateResponse {
        post_id: rating.post_id,
        value: rating.value,
        post_rating: post.rating,
    }))
}

/// Withdraw a rating.
async fn withdraw_rating(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.rating_service.withdraw(&user.id, &id).await?;
    Ok(ok())
}

/// A post's comment thread.
async fn comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let thread = state.comment_service.thread(&id).await?;
    Ok(ApiResponse::ok(thread.into_iter().map(Into::into).collect()))
}

/// Comment on a post.
async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.create(&user, &id, input).await?;
    Ok(ApiResponse::ok(comment.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/top", get(top))
        .route("/{id}", get(show).patch(update).delete(delete))
        .route("/{id}/rate", put(rate).delete(withdraw_rating))
        .route("/{id}/comments", get(comments).post(create_comment))
}
