//! Create post_rating table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostRating::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostRating::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostRating::PostId).string_len(32).not_null())
                    .col(ColumnDef::new(PostRating::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PostRating::Value).double().not_null())
                    .col(
                        ColumnDef::new(PostRating::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PostRating::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_rating_post")
                            .from(PostRating::Table, PostRating::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_rating_user")
                            .from(PostRating::Table, PostRating::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per (post, user) pair
        manager
            .create_index(
                Index::create()
                    .name("idx_post_rating_post_user")
                    .table(PostRating::Table)
                    .col(PostRating::PostId)
                    .col(PostRating::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_rating_user")
                    .table(PostRating::Table)
                    .col(PostRating::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostRating::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostRating {
    Table,
    Id,
    PostId,
    UserId,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
