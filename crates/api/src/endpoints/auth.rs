//! Authentication endpoints.

use axum::{extract::State, routing::post, Json, Router};
use arcana_common::AppResult;
use arcana_core::CreateUserInput;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ok, ApiResponse},
};

use super::users::AccountResponse;

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Email verification request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Password reset request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Password reset confirmation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

/// Authentication response: account plus bearer token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountResponse,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let (user, token) = state.user_service.register(input).await?;
    Ok(ApiResponse::ok(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Log in with email and password.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let (user, token) = state
        .user_service
        .authenticate(&req.email, &req.password)
        .await?;
    Ok(ApiResponse::ok(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Log out, invalidating the bearer token.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.user_service.logout(&user.id).await?;
    Ok(ok())
}

/// Confirm an email address.
async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let user = state.user_service.verify_email(&req.token).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Start a password reset.
async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.user_service.request_password_reset(&req.email).await?;
    Ok(ok())
}

/// Complete a password reset.
async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirmRequest>,
) -> AppResult<impl axum::response::IntoResponse> {
    state
        .user_service
        .reset_password(&req.token, &req.new_password)
        .await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify-email", post(verify_email))
        .route("/password-reset", post(request_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset))
}
