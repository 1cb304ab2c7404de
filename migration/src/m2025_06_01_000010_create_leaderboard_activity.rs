//! Migration to create the leaderboard_activity table.
//!
//! Append-only activity log for data science users: responded | resolved.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeaderboardActivity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaderboardActivity::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardActivity::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardActivity::IssueId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LeaderboardActivity::Action).text().not_null())
                    .col(
                        ColumnDef::new(LeaderboardActivity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeaderboardActivity::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LeaderboardActivity {
    Table,
    Id,
    UserId,
    IssueId,
    Action,
    CreatedAt,
}
