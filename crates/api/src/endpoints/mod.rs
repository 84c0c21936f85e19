//! API endpoints.

mod admin;
mod auth;
mod comments;
mod favourites;
mod notifications;
mod policy;
mod posts;
mod stories;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/favourites", favourites::router())
        .nest("/notifications", notifications::router())
        .nest("/stories", stories::router())
        .nest("/privacy-policy", policy::router())
        .nest("/admin", admin::router())
}
