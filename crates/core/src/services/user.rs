//! User service.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use arcana_common::{AppError, AppResult, IdGenerator};
use arcana_db::{entities::user, repositories::UserRepository};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::Set;
use serde::Deserialize;
use tracing::warn;
use validator::Validate;

use crate::services::email::EmailService;

/// How long a password reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 24;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    email: EmailService,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 255))]
    pub full_name: String,

    #[validate(length(max = 64))]
    pub nickname: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 64))]
    pub country: Option<String>,

    #[validate(length(max = 16))]
    pub language: Option<String>,
}

/// Input for updating a user's profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,

    #[validate(length(max = 64))]
    pub nickname: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 64))]
    pub country: Option<String>,

    #[validate(length(max = 16))]
    pub language: Option<String>,

    pub avatar: Option<String>,

    pub notification_email: Option<bool>,
    pub notification_push: Option<bool>,
    pub notification_inherit: Option<bool>,
}

/// Input for changing a password while logged in.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, email: EmailService) -> Self {
        Self {
            user_repo,
            email,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user and issue an authentication token.
    pub async fn register(&self, input: CreateUserInput) -> AppResult<(user::Model, String)> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();
        let verification_token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email.clone()),
            password_hash: Set(password_hash),
            token: Set(Some(token.clone())),
            full_name: Set(input.full_name),
            nickname: Set(input.nickname),
            date_of_birth: Set(input.date_of_birth),
            country: Set(input.country),
            language: Set(input.language),
            email_verification_token: Set(Some(verification_token.clone())),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;

        // Registration must not fail on a delivery hiccup.
        if let Err(e) = self
            .email
            .send_verification(&user.email, &verification_token)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Failed to send verification email");
        }

        Ok((user, token))
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate by email and password, returning the user and token.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(user::Model, String)> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        // Reuse the live token; issue one after a logout.
        if let Some(token) = user.token.clone() {
            return Ok((user, token));
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        Ok((user, token))
    }

    /// Invalidate a user's authentication token.
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();
        active.token = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;
        Ok(())
    }

    /// Update a user's profile.
    pub async fn update(&self, id: &str, input: UpdateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(full_name) = input.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(nickname) = input.nickname {
            active.nickname = Set(Some(nickname));
        }
        if let Some(date_of_birth) = input.date_of_birth {
            active.date_of_birth = Set(Some(date_of_birth));
        }
        if let Some(country) = input.country {
            active.country = Set(Some(country));
        }
        if let Some(language) = input.language {
            active.language = Set(Some(language));
        }
        if let Some(avatar) = input.avatar {
            active.avatar = Set(Some(avatar));
        }
        if let Some(notification_email) = input.notification_email {
            active.notification_email = Set(notification_email);
        }
        if let Some(notification_push) = input.notification_push {
            active.notification_push = Set(notification_push);
        }
        if let Some(notification_inherit) = input.notification_inherit {
            active.notification_inherit = Set(notification_inherit);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Change a user's password, verifying the current one.
    pub async fn change_password(&self, user_id: &str, input: ChangePasswordInput) -> AppResult<()> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        if !verify_password(&input.current_password, &user.password_hash)? {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash_password(&input.new_password)?);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        Ok(())
    }

    /// Confirm an email address from a verification token.
    pub async fn verify_email(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_verification_token(token)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid verification token".to_string()))?;

        let mut active: user::ActiveModel = user.into();
        active.email_verified = Set(true);
        active.email_verification_token = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Start a password reset flow.
    ///
    /// Always succeeds so the endpoint does not reveal which addresses
    /// have accounts.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            return Ok(());
        };

        let reset_token = self.id_gen.generate_token();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

        let user_email = user.email.clone();
        let user_id = user.id.clone();
        let mut active: user::ActiveModel = user.into();
        active.password_reset_token = Set(Some(reset_token.clone()));
        active.password_reset_expires_at = Set(Some(expires_at.into()));
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        if let Err(e) = self.email.send_password_reset(&user_email, &reset_token).await {
            warn!(user_id = %user_id, error = %e, "Failed to send password reset email");
        }

        Ok(())
    }

    /// Complete a password reset from a reset token.
    ///
    /// Consumes the token and invalidates the session token, so existing
    /// logins are forced to re-authenticate.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        if new_password.len() < 8 || new_password.len() > 128 {
            return Err(AppError::Validation(
                "Password must be between 8 and 128 characters".to_string(),
            ));
        }

        let user = self
            .user_repo
            .find_by_reset_token(token)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid reset token".to_string()))?;

        let expired = user
            .password_reset_expires_at
            .is_none_or(|expires_at| expires_at < Utc::now());
        if expired {
            return Err(AppError::BadRequest("Reset token has expired".to_string()));
        }

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash_password(new_password)?);
        active.password_reset_token = Set(None);
        active.password_reset_expires_at = Set(None);
        active.token = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        Ok(())
    }

    /// Top authors by aggregate rating.
    pub async fn top_authors(&self, limit: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_top(limit).await
    }
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, email: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: hash_password("correct_password").unwrap(),
            token: Some("test_token".to_string()),
            full_name: "Test User".to_string(),
            nickname: None,
            date_of_birth: None,
            country: None,
            language: None,
            rating: 0,
            avatar: None,
            is_premium: false,
            premium_expires_at: None,
            notification_email: true,
            notification_push: true,
            notification_inherit: false,
            is_admin: false,
            email_verified: false,
            email_verification_token: None,
            password_reset_token: None,
            password_reset_expires_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_service(db: Arc<sea_orm::DatabaseConnection>) -> UserService {
        UserService::new(
            UserRepository::new(db),
            EmailService::disabled("https://arcana.example"),
        )
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(verify_password("test_password_123", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_hash_password_different_each_time() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.get("missing").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_unauthorized() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.authenticate_by_token("bad_token").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_user("user1", "taken@example.com")]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let input = CreateUserInput {
            email: "taken@example.com".to_string(),
            password: "password123".to_string(),
            full_name: "New User".to_string(),
            nickname: None,
            date_of_birth: None,
            country: None,
            language: None,
        };

        let result = service.register(input).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);

        let input = CreateUserInput {
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
            full_name: "New User".to_string(),
            nickname: None,
            date_of_birth: None,
            country: None,
            language: None,
        };

        let result = service.register(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_user("user1", "user@example.com")]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.authenticate("user@example.com", "wrong_password").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_reuses_live_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_user("user1", "user@example.com")]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let (user, token) = service
            .authenticate("user@example.com", "correct_password")
            .await
            .unwrap();
        assert_eq!(user.id, "user1");
        assert_eq!(token, "test_token");
    }

    #[tokio::test]
    async fn test_reset_password_short_password() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);

        let result = service.reset_password("token", "short").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_request_password_reset_unknown_email() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        // Unknown addresses are not revealed
        let result = service.request_password_reset("unknown@example.com").await;
        assert!(result.is_ok());
    }
}
