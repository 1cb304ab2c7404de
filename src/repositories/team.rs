//! Team repository.
//!
//! Only the operations the workflow needs: lookups plus the admin delete,
//! which clears membership and dashboard ownership before removing the row so
//! no dangling team references survive.

use std::sync::Arc;

use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::dashboard::{self, Entity as Dashboard};
use crate::models::team::{self, Entity as Team};
use crate::models::user::{self, Entity as User};

#[derive(Debug, Clone)]
pub struct TeamRepository {
    pub db: Arc<DatabaseConnection>,
}

impl TeamRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<team::Model>, RepositoryError> {
        Ok(Team::find_by_id(id).one(self.db.as_ref()).await?)
    }

    /// Deletes a team, first orphaning its members and dashboards.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let team = Team::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Team not found"))?;

        User::update_many()
            .col_expr(user::Column::TeamId, sea_orm::sea_query::Expr::value(Option::<Uuid>::None))
            .filter(user::Column::TeamId.eq(team.id))
            .exec(&txn)
            .await?;

        Dashboard::update_many()
            .col_expr(
                dashboard::Column::AssignedTeamId,
                sea_orm::sea_query::Expr::value(Option::<Uuid>::None),
            )
            .filter(dashboard::Column::AssignedTeamId.eq(team.id))
            .exec(&txn)
            .await?;

        Team::delete_by_id(team.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database};

    async fn setup() -> Arc<DatabaseConnection> {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Arc::new(db)
    }

    async fn seed_team(db: &DatabaseConnection, name: &str) -> team::Model {
        team::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    async fn seed_user(db: &DatabaseConnection, team_id: Option<Uuid>) -> user::Model {
        let id = Uuid::new_v4();
        user::ActiveModel {
            id: Set(id),
            name: Set("Member".to_string()),
            email: Set(format!("{}@example.com", id)),
            role: Set("data_science".to_string()),
            team_id: Set(team_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_delete_orphans_members_and_dashboards() {
        let db = setup().await;
        let repo = TeamRepository::new(db.clone());

        let team = seed_team(&db, "Analytics").await;
        let member = seed_user(&db, Some(team.id)).await;
        let dash = dashboard::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Revenue".to_string()),
            assigned_team_id: Set(Some(team.id)),
            ..Default::default()
        }
        .insert(db.as_ref())
        .await
        .unwrap();

        repo.delete(team.id).await.unwrap();

        assert!(repo.find_by_id(team.id).await.unwrap().is_none());
        let member = User::find_by_id(member.id)
            .one(db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.team_id, None);
        let dash = Dashboard::find_by_id(dash.id)
            .one(db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dash.assigned_team_id, None);
    }

    #[tokio::test]
    async fn test_delete_missing_team_is_not_found() {
        let db = setup().await;
        let repo = TeamRepository::new(db);

        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
