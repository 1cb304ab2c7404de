//! Migration to create the issues table.
//!
//! Status is stored as text: pending | in_progress | complete. The assigned
//! team is a snapshot taken from the dashboard at creation time; priority is
//! derived from the second count and never drops below 1.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Issues::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Issues::DashboardId).uuid().not_null())
                    .col(ColumnDef::new(Issues::ChartId).uuid().null())
                    .col(ColumnDef::new(Issues::SubmittedByUserId).uuid().not_null())
                    .col(ColumnDef::new(Issues::Subject).text().null())
                    .col(ColumnDef::new(Issues::Description).text().not_null())
                    .col(
                        ColumnDef::new(Issues::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Issues::Priority)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Issues::AssignedTeamId).uuid().null())
                    .col(ColumnDef::new(Issues::AssignedUserId).uuid().null())
                    .col(
                        ColumnDef::new(Issues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Issues::UpdatedAt)
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
                    .name("idx_issues_dashboard_id")
                    .table(Issues::Table)
                    .col(Issues::DashboardId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_issues_assigned_team_id")
                    .table(Issues::Table)
                    .col(Issues::AssignedTeamId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Issues::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Issues {
    Table,
    Id,
    DashboardId,
    ChartId,
    SubmittedByUserId,
    Subject,
    Description,
    Status,
    Priority,
    AssignedTeamId,
    AssignedUserId,
    CreatedAt,
    UpdatedAt,
}
