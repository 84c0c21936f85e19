//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(User::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::PasswordHash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(User::Token)
                            .string_len(64)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(User::Nickname).string_len(100).null())
                    .col(ColumnDef::new(User::DateOfBirth).date().null())
                    .col(ColumnDef::new(User::Country).string_len(100).null())
                    .col(ColumnDef::new(User::Language).string_len(10).null())
                    .col(
                        ColumnDef::new(User::Rating)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(User::Avatar).text().null())
                    .col(
                        ColumnDef::new(User::IsPremium)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(User::PremiumExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(User::NotificationEmail)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(User::NotificationPush)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(User::NotificationInherit)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(User::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(User::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(User::EmailVerificationToken)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(User::PasswordResetToken)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(User::PasswordResetExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: rating (top-users listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_rating")
                    .table(User::Table)
                    .col(User::Rating)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Email,
    PasswordHash,
    Token,
    FullName,
    Nickname,
    DateOfBirth,
    Country,
    Language,
    Rating,
    Avatar,
    IsPremium,
    PremiumExpiresAt,
    NotificationEmail,
    NotificationPush,
    NotificationInherit,
    IsAdmin,
    EmailVerified,
    EmailVerificationToken,
    PasswordResetToken,
    PasswordResetExpiresAt,
    CreatedAt,
    UpdatedAt,
}
