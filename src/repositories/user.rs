//! User repository: account lookups used by auth and notification fan-out.

use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::user::{self, Entity as User};
use crate::workflow::Role;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pub db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>, RepositoryError> {
        Ok(User::find_by_id(id).one(self.db.as_ref()).await?)
    }

    /// Every member of the given team.
    pub async fn members_of_team(&self, team_id: Uuid) -> Result<Vec<user::Model>, RepositoryError> {
        Ok(User::find()
            .filter(user::Column::TeamId.eq(team_id))
            .all(self.db.as_ref())
            .await?)
    }

    /// Every admin account; admin-request fan-out targets.
    pub async fn admins(&self) -> Result<Vec<user::Model>, RepositoryError> {
        Ok(User::find()
            .filter(user::Column::Role.eq(Role::Admin.as_str()))
            .all(self.db.as_ref())
            .await?)
    }
}
