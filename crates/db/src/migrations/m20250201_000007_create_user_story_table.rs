//! Create user_story table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserStory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserStory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserStory::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(UserStory::Content).text().not_null())
                    .col(ColumnDef::new(UserStory::Category).string_len(20).not_null())
                    .col(
                        ColumnDef::new(UserStory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_story_user")
                            .from(UserStory::Table, UserStory::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_story_user_created")
                    .table(UserStory::Table)
                    .col(UserStory::UserId)
                    .col(UserStory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserStory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserStory {
    Table,
    Id,
    UserId,
    Content,
    Category,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
