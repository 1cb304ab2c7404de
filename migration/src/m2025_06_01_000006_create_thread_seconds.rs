//! Migration to create the thread_seconds table.
//!
//! One row per (issue, user) endorsement; the unique index is the idempotency
//! guard for seconding.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ThreadSeconds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ThreadSeconds::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ThreadSeconds::IssueId).uuid().not_null())
                    .col(ColumnDef::new(ThreadSeconds::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ThreadSeconds::CreatedAt)
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
                    .if_not_exists()
                    .name("uq_thread_seconds_issue_user")
                    .table(ThreadSeconds::Table)
                    .col(ThreadSeconds::IssueId)
                    .col(ThreadSeconds::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ThreadSeconds::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ThreadSeconds {
    Table,
    Id,
    IssueId,
    UserId,
    CreatedAt,
}
