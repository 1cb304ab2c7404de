//! Migration to create the admin_requests table.
//!
//! Status is stored as text: pending | in_progress | resolved | rejected.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdminRequests::SubmittedByUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminRequests::RequestType).text().not_null())
                    .col(ColumnDef::new(AdminRequests::DashboardId).uuid().null())
                    .col(ColumnDef::new(AdminRequests::TeamId).uuid().null())
                    .col(ColumnDef::new(AdminRequests::Subject).text().not_null())
                    .col(ColumnDef::new(AdminRequests::Description).text().not_null())
                    .col(
                        ColumnDef::new(AdminRequests::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(AdminRequests::AdminResponse).text().null())
                    .col(
                        ColumnDef::new(AdminRequests::ResolvedByAdminId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AdminRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AdminRequests::UpdatedAt)
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
            .drop_table(Table::drop().table(AdminRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdminRequests {
    Table,
    Id,
    SubmittedByUserId,
    RequestType,
    DashboardId,
    TeamId,
    Subject,
    Description,
    Status,
    AdminResponse,
    ResolvedByAdminId,
    CreatedAt,
    UpdatedAt,
}
