//! Migration to create the dashboards table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dashboards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Dashboards::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Dashboards::Name).text().not_null())
                    .col(ColumnDef::new(Dashboards::OwnerUserId).uuid().null())
                    .col(ColumnDef::new(Dashboards::AssignedTeamId).uuid().null())
                    .col(
                        ColumnDef::new(Dashboards::CreatedAt)
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
            .drop_table(Table::drop().table(Dashboards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Dashboards {
    Table,
    Id,
    Name,
    OwnerUserId,
    AssignedTeamId,
    CreatedAt,
}
