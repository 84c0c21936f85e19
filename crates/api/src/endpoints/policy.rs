//! Privacy policy endpoints.

use axum::{extract::State, routing::get, Router};
use arcana_common::AppResult;
use arcana_db::entities::privacy_policy;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Privacy policy response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub updated_at: String,
}

impl From<privacy_policy::Model> for PolicyResponse {
    fn from(policy: privacy_policy::Model) -> Self {
        Self {
            id: policy.id,
            title: policy.title,
            content: policy.content,
            updated_at: policy.updated_at.to_rfc3339(),
        }
    }
}

/// The active privacy policy.
async fn show(State(state): State<AppState>) -> AppResult<ApiResponse<PolicyResponse>> {
    let policy = state.policy_service.get_active().await?;
    Ok(ApiResponse::ok(policy.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(show))
}
