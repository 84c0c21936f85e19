//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250201_000001_create_user_table;
mod m20250201_000002_create_post_table;
mod m20250201_000003_create_post_rating_table;
mod m20250201_000004_create_comment_table;
mod m20250201_000005_create_favourite_table;
mod m20250201_000006_create_notification_table;
mod m20250201_000007_create_user_story_table;
mod m20250201_000008_create_privacy_policy_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250201_000001_create_user_table::Migration),
            Box::new(m20250201_000002_create_post_table::Migration),
            Box::new(m20250201_000003_create_post_rating_table::Migration),
            Box::new(m20250201_000004_create_comment_table::Migration),
            Box::new(m20250201_000005_create_favourite_table::Migration),
            Box::new(m20250201_000006_create_notification_table::Migration),
            Box::new(m20250201_000007_create_user_story_table::Migration),
            Box::new(m20250201_000008_create_privacy_policy_table::Migration),
        ]
    }
}
