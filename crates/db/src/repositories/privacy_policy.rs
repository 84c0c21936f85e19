//! Privacy policy repository.

use std::sync::Arc;

use crate::entities::{PrivacyPolicy, privacy_policy};
use arcana_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Privacy policy repository for database operations.
#[derive(Clone)]
pub struct PrivacyPolicyRepository {
    db: Arc<DatabaseConnection>,
}

impl PrivacyPolicyRepository {
    /// Create a new privacy policy repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get the currently active policy, if any.
    pub async fn find_active(&self) -> AppResult<Option<privacy_policy::Model>> {
        PrivacyPolicy::find()
            .filter(privacy_policy::Column::IsActive.eq(true))
            .order_by_desc(privacy_policy::Column::UpdatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new policy.
    pub async fn create(
        &self,
        model: privacy_policy::ActiveModel,
    ) -> AppResult<privacy_policy::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Deactivate every policy (called before activating a replacement).
    pub async fn deactivate_all(&self) -> AppResult<()> {
        PrivacyPolicy::update_many()
            .col_expr(privacy_policy::Column::IsActive, Expr::value(false))
            .filter(privacy_policy::Column::IsActive.eq(true))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
