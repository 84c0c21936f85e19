//! Comment endpoints.
//!
//! Creation and listing live under `/posts/{id}/comments`; editing and
//! deletion address the comment directly.

use axum::{
    extract::{Path, State},
    routing::patch,
    Json, Router,
};
use arcana_common::AppResult;
use arcana_core::{CommentNode, UpdateCommentInput};
use arcana_db::entities::comment;
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ok, ApiResponse},
};

/// Comment response, optionally carrying its reply subtree.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub parent_id: Option<String>,
    pub text: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentResponse>,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            text: comment.text,
            created_at: comment.created_at.to_rfc3339(),
            updated_at: comment.updated_at.map(|t| t.to_rfc3339()),
            replies: Vec::new(),
        }
    }
}

impl From<CommentNode> for CommentResponse {
    fn from(node: CommentNode) -> Self {
        let mut response: Self = node.comment.into();
        response.replies = node.replies.into_iter().map(Into::into).collect();
        response
    }
}

/// Edit a comment.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.update(&id, &user, input).await?;
    Ok(ApiResponse::ok(comment.into()))
}

/// Delete a comment.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.comment_service.delete(&id, &user).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", patch(update).delete(delete))
}
