//! Privacy policy service.

use arcana_common::{AppError, AppResult, IdGenerator};
use arcana_db::{entities::privacy_policy, repositories::PrivacyPolicyRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Privacy policy service for business logic.
#[derive(Clone)]
pub struct PrivacyPolicyService {
    policy_repo: PrivacyPolicyRepository,
    id_gen: IdGenerator,
}

/// Input for publishing a new policy revision.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishPolicyInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,
}

impl PrivacyPolicyService {
    /// Create a new privacy policy service.
    #[must_use]
    pub fn new(policy_repo: PrivacyPolicyRepository) -> Self {
        Self {
            policy_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// The currently active policy.
    pub async fn get_active(&self) -> AppResult<privacy_policy::Model> {
        self.policy_repo
            .find_active()
            .await?
            .ok_or_else(|| AppError::NotFound("No active privacy policy".to_string()))
    }

    /// Publish a new policy revision, deactivating all previous ones.
    pub async fn publish(&self, input: PublishPolicyInput) -> AppResult<privacy_policy::Model> {
        input.validate()?;

        self.policy_repo.deactivate_all().await?;

        let model = privacy_policy::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            content: Set(input.content),
            is_active: Set(true),
            ..Default::default()
        };

        self.policy_repo.create(model).await
    }
}
