//! Create privacy_policy table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PrivacyPolicy::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrivacyPolicy::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrivacyPolicy::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PrivacyPolicy::Content).text().not_null())
                    .col(
                        ColumnDef::new(PrivacyPolicy::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PrivacyPolicy::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PrivacyPolicy::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_privacy_policy_active")
                    .table(PrivacyPolicy::Table)
                    .col(PrivacyPolicy::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrivacyPolicy::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PrivacyPolicy {
    Table,
    Id,
    Title,
    Content,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
