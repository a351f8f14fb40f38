//! Community ban repository.
//!
//! Ban activity is never stored: every query that cares about "currently
//! banned" rebuilds the `is_permanent OR expires_at > now` predicate against
//! the wall clock at evaluation time.

use std::sync::Arc;

use crate::entities::{CommunityBan, community_ban};
use palaver_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Community ban repository for database operations.
#[derive(Clone)]
pub struct BanRepository {
    db: Arc<DatabaseConnection>,
}

impl BanRepository {
    /// Create a new ban repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a ban by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<community_ban::Model>> {
        CommunityBan::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the currently active ban for a user in a community, if any.
    pub async fn find_active(
        &self,
        user_id: &str,
        community_id: &str,
    ) -> AppResult<Option<community_ban::Model>> {
        let now = chrono::Utc::now();

        CommunityBan::find()
            .filter(community_ban::Column::UserId.eq(user_id))
            .filter(community_ban::Column::CommunityId.eq(community_id))
            .filter(
                community_ban::Column::IsPermanent
                    .eq(true)
                    .or(community_ban::Column::ExpiresAt.gt(now)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is currently banned from a community.
    pub async fn is_banned(&self, user_id: &str, community_id: &str) -> AppResult<bool> {
        Ok(self.find_active(user_id, community_id).await?.is_some())
    }

    /// IDs of the communities the user is actively banned from.
    ///
    /// Used to prefetch the viewer's ban set so visibility can be applied as
    /// an in-memory pre-filter over a candidate set.
    pub async fn active_community_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let now = chrono::Utc::now();

        CommunityBan::find()
            .select_only()
            .column(community_ban::Column::CommunityId)
            .filter(community_ban::Column::UserId.eq(user_id))
            .filter(
                community_ban::Column::IsPermanent
                    .eq(true)
                    .or(community_ban::Column::ExpiresAt.gt(now)),
            )
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a ban.
    pub async fn create(&self, model: community_ban::ActiveModel) -> AppResult<community_ban::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a ban's fields on the same row.
    pub async fn update(&self, model: community_ban::ActiveModel) -> AppResult<community_ban::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a ban row (explicit moderator unban).
    pub async fn delete(&self, ban: community_ban::Model) -> AppResult<()> {
        ban.delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Full ban history for a community, newest first.
    pub async fn find_by_community(
        &self,
        community_id: &str,
    ) -> AppResult<Vec<community_ban::Model>> {
        CommunityBan::find()
            .filter(community_ban::Column::CommunityId.eq(community_id))
            .order_by_desc(community_ban::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Full ban history for a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<community_ban::Model>> {
        CommunityBan::find()
            .filter(community_ban::Column::UserId.eq(user_id))
            .order_by_desc(community_ban::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_ban(id: &str, user_id: &str, community_id: &str) -> community_ban::Model {
        community_ban::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            community_id: community_id.to_string(),
            moderator_id: "mod1".to_string(),
            reason: "spam".to_string(),
            is_permanent: false,
            expires_at: Some((Utc::now() + Duration::days(7)).into()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_banned_true() {
        let ban = create_test_ban("b1", "user1", "c1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ban]])
                .into_connection(),
        );

        let repo = BanRepository::new(db);
        assert!(repo.is_banned("user1", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_banned_false() {
        // An elapsed temporary ban never matches the activity predicate, so
        // the query comes back empty with no state transition involved.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<community_ban::Model>::new()])
                .into_connection(),
        );

        let repo = BanRepository::new(db);
        assert!(!repo.is_banned("user1", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_user_returns_history() {
        let b1 = create_test_ban("b1", "user1", "c1");
        let b2 = create_test_ban("b2", "user1", "c2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[b1, b2]])
                .into_connection(),
        );

        let repo = BanRepository::new(db);
        let bans = repo.find_by_user("user1").await.unwrap();
        assert_eq!(bans.len(), 2);
    }
}
