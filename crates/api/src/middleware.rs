//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use arcana_core::{
    CommentService, FavouriteService, ModerationService, NotificationService, PostService,
    PrivacyPolicyService, RatingService, UserService, UserStoryService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub rating_service: RatingService,
    pub comment_service: CommentService,
    pub favourite_service: FavouriteService,
    pub notification_service: NotificationService,
    pub story_service: UserStoryService,
    pub policy_service: PrivacyPolicyService,
    pub moderation_service: ModerationService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stores it in the request
/// extensions; handlers pick it up through the auth extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if let Ok(user) = state.user_service.authenticate_by_token(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
