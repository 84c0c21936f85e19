//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use arcana_api::{middleware::AppState, router as api_router};
use arcana_core::{
    CommentService, EmailService, FavouriteService, ModerationService, NotificationService,
    PostService, PrivacyPolicyService, RatingService, UserService, UserStoryService,
};
use arcana_db::repositories::{
    CommentRepository, FavouriteRepository, NotificationRepository, PostRatingRepository,
    PostRepository, PrivacyPolicyRepository, UserRepository, UserStoryRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use std::sync::Arc;
use tower::ServiceExt;

/// Create a mock database connection.
fn create_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection()
}

/// Create test app state with mock database.
fn create_test_state() -> AppState {
    let db = Arc::new(create_mock_db());

    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let rating_repo = PostRatingRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let favourite_repo = FavouriteRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let story_repo = UserStoryRepository::new(Arc::clone(&db));
    let policy_repo = PrivacyPolicyRepository::new(Arc::clone(&db));

    let email_service = EmailService::disabled("https://example.com");
    let notification_service = NotificationService::new(notification_repo);
    let story_service = UserStoryService::new(story_repo);
    let rating_service =
        RatingService::new(rating_repo, post_repo.clone(), user_repo.clone());
    let user_service = UserService::new(user_repo.clone(), email_service.clone());
    let post_service = PostService::new(
        post_repo.clone(),
        user_repo.clone(),
        favourite_repo.clone(),
        notification_service.clone(),
        rating_service.clone(),
    );
    let comment_service = CommentService::new(
        comment_repo,
        post_repo.clone(),
        notification_service.clone(),
    );
    let favourite_service = FavouriteService::new(
        favourite_repo,
        user_repo.clone(),
        notification_service.clone(),
        story_service.clone(),
        email_service.clone(),
    );
    let policy_service = PrivacyPolicyService::new(policy_repo);
    let moderation_service = ModerationService::new(user_repo, post_repo, rating_service.clone());

    AppState {
        user_service,
        post_service,
        rating_service,
        comment_service,
        favourite_service,
        notification_service,
        story_service,
        policy_service,
        moderation_service,
    }
}

/// Create the test router.
fn create_test_router() -> Router {
    let state = create_test_state();
    api_router().with_state(state)
}

#[tokio::test]
async fn test_login_with_unknown_user_returns_error() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"email":"nobody@example.com","password":"wrongpassword"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // Mock DB won't find the user
    let status = response.status();
    assert!(
        status == StatusCode::UNAUTHORIZED
            || status == StatusCode::NOT_FOUND
            || status == StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_register_with_invalid_json_returns_error() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_me_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_notifications_require_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_require_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/users")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_posts_with_unknown_category_returns_400() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts?category=nonsense")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/somepost/rate")
                .method("PUT")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"value":4.5}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_privacy_policy_endpoint_returns_response() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/privacy-policy")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // With mock DB there is no active policy row
    let status = response.status();
    assert!(status == StatusCode::NOT_FOUND || status == StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
