//! Create favourite table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Favourite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Favourite::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Favourite::SubscriberId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Favourite::SubscribedToId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Favourite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favourite_subscriber")
                            .from(Favourite::Table, Favourite::SubscriberId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favourite_subscribed_to")
                            .from(Favourite::Table, Favourite::SubscribedToId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One subscription per (subscriber, subscribed_to) pair
        manager
            .create_index(
                Index::create()
                    .name("idx_favourite_pair")
                    .table(Favourite::Table)
                    .col(Favourite::SubscriberId)
                    .col(Favourite::SubscribedToId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favourite_subscribed_to")
                    .table(Favourite::Table)
                    .col(Favourite::SubscribedToId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Favourite::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Favourite {
    Table,
    Id,
    SubscriberId,
    SubscribedToId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
