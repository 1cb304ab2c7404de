//! Migration to create the charts table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Charts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Charts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Charts::DashboardId).uuid().not_null())
                    .col(ColumnDef::new(Charts::Name).text().not_null())
                    .col(
                        ColumnDef::new(Charts::CreatedAt)
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
                    .name("idx_charts_dashboard_id")
                    .table(Charts::Table)
                    .col(Charts::DashboardId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Charts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Charts {
    Table,
    Id,
    DashboardId,
    Name,
    CreatedAt,
}
