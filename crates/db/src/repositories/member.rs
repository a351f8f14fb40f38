//! Community member repository.

use std::sync::Arc;

use crate::entities::{CommunityMember, community_member};
use palaver_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

/// Community member repository for database operations.
#[derive(Clone)]
pub struct MemberRepository {
    db: Arc<DatabaseConnection>,
}

impl MemberRepository {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a membership by user and community.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        community_id: &str,
    ) -> AppResult<Option<community_member::Model>> {
        CommunityMember::find()
            .filter(community_member::Column::UserId.eq(user_id))
            .filter(community_member::Column::CommunityId.eq(community_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user belongs to a community.
    pub async fn is_member(&self, user_id: &str, community_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(user_id, community_id).await?.is_some())
    }

    /// Check if a user moderates a community.
    pub async fn is_moderator(&self, user_id: &str, community_id: &str) -> AppResult<bool> {
        let member = CommunityMember::find()
            .filter(community_member::Column::UserId.eq(user_id))
            .filter(community_member::Column::CommunityId.eq(community_id))
            .filter(community_member::Column::IsModerator.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(member.is_some())
    }

    /// Create a membership.
    pub async fn create(
        &self,
        model: community_member::ActiveModel,
    ) -> AppResult<community_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a membership by pair.
    pub async fn delete_by_pair(&self, user_id: &str, community_id: &str) -> AppResult<()> {
        let member = self.find_by_pair(user_id, community_id).await?;
        if let Some(m) = member {
            m.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Flip a member's moderator flag.
    pub async fn set_moderator(
        &self,
        member: community_member::Model,
        is_moderator: bool,
    ) -> AppResult<community_member::Model> {
        let mut model: community_member::ActiveModel = member.into();
        model.is_moderator = Set(is_moderator);
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a community's members, earliest join first.
    pub async fn find_by_community(
        &self,
        community_id: &str,
    ) -> AppResult<Vec<community_member::Model>> {
        CommunityMember::find()
            .filter(community_member::Column::CommunityId.eq(community_id))
            .order_by_asc(community_member::Column::JoinedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the communities a user belongs to.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<community_member::Model>> {
        CommunityMember::find()
            .filter(community_member::Column::UserId.eq(user_id))
            .order_by_asc(community_member::Column::JoinedAt)
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

    fn create_test_member(
        id: &str,
        user_id: &str,
        community_id: &str,
        is_moderator: bool,
    ) -> community_member::Model {
        community_member::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            community_id: community_id.to_string(),
            is_moderator,
            joined_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_member_true() {
        let member = create_test_member("m1", "user1", "c1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[member]])
                .into_connection(),
        );

        let repo = MemberRepository::new(db);
        assert!(repo.is_member("user1", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_moderator_false_for_plain_member() {
        // The moderator filter is part of the query, so a plain membership
        // row never comes back from it.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<community_member::Model>::new()])
                .into_connection(),
        );

        let repo = MemberRepository::new(db);
        assert!(!repo.is_moderator("user1", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_community() {
        let m1 = create_test_member("m1", "user1", "c1", true);
        let m2 = create_test_member("m2", "user2", "c1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[m1, m2]])
                .into_connection(),
        );

        let repo = MemberRepository::new(db);
        let members = repo.find_by_community("c1").await.unwrap();
        assert_eq!(members.len(), 2);
    }
}
