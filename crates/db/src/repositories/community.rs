//! Community repository.

use std::sync::Arc;

use crate::entities::{Community, CommunityMember, community, community_member};
use palaver_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

/// Community repository for database operations.
#[derive(Clone)]
pub struct CommunityRepository {
    db: Arc<DatabaseConnection>,
}

impl CommunityRepository {
    /// Create a new community repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a community by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<community::Model>> {
        Community::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a community by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<community::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("community {id}")))
    }

    /// Find a community by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<community::Model>> {
        Community::find()
            .filter(community::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a community together with its creator's member row.
    ///
    /// The two inserts are one transaction so a community can never exist
    /// without its founding moderator.
    pub async fn create_with_owner(
        &self,
        community: community::ActiveModel,
        owner_member: community_member::ActiveModel,
    ) -> AppResult<community::Model> {
        self.db
            .transaction::<_, community::Model, DbErr>(|txn| {
                Box::pin(async move {
                    let created = community.insert(txn).await?;
                    CommunityMember::insert(owner_member).exec(txn).await?;
                    Ok(created)
                })
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a community; members, bans and posts cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let found = self.find_by_id(id).await?;
        if let Some(c) = found {
            c.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// List communities by name.
    pub async fn list(&self) -> AppResult<Vec<community::Model>> {
        Community::find()
            .order_by_asc(community::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_community(id: &str, owner_id: &str, name: &str) -> community::Model {
        community::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            description: String::new(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<community::Model>::new()])
                .into_connection(),
        );

        let repo = CommunityRepository::new(db);
        let result = repo.get_by_id("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let community = create_test_community("c1", "u1", "rust");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[community]])
                .into_connection(),
        );

        let repo = CommunityRepository::new(db);
        let found = repo.find_by_name("rust").await.unwrap();
        assert_eq!(found.unwrap().name, "rust");
    }
}
