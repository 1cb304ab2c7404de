//! Database migrations for FeedbackHub.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_06_01_000001_create_teams;
mod m2025_06_01_000002_create_users;
mod m2025_06_01_000003_create_dashboards;
mod m2025_06_01_000004_create_charts;
mod m2025_06_01_000005_create_issues;
mod m2025_06_01_000006_create_thread_seconds;
mod m2025_06_01_000007_create_comments;
mod m2025_06_01_000008_create_notifications;
mod m2025_06_01_000009_create_admin_requests;
mod m2025_06_01_000010_create_leaderboard_activity;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_01_000001_create_teams::Migration),
            Box::new(m2025_06_01_000002_create_users::Migration),
            Box::new(m2025_06_01_000003_create_dashboards::Migration),
            Box::new(m2025_06_01_000004_create_charts::Migration),
            Box::new(m2025_06_01_000005_create_issues::Migration),
            Box::new(m2025_06_01_000006_create_thread_seconds::Migration),
            Box::new(m2025_06_01_000007_create_comments::Migration),
            Box::new(m2025_06_01_000008_create_notifications::Migration),
            Box::new(m2025_06_01_000009_create_admin_requests::Migration),
            Box::new(m2025_06_01_000010_create_leaderboard_activity::Migration),
        ]
    }
}
