//! Blocking repository.

use std::sync::Arc;

use crate::entities::{Blocking, blocking};
use palaver_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Blocking repository for database operations.
#[derive(Clone)]
pub struct BlockingRepository {
    db: Arc<DatabaseConnection>,
}

impl BlockingRepository {
    /// Create a new blocking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a block by blocker and blockee.
    pub async fn find_by_pair(
        &self,
        blocker_id: &str,
        blockee_id: &str,
    ) -> AppResult<Option<blocking::Model>> {
        Blocking::find()
            .filter(blocking::Column::BlockerId.eq(blocker_id))
            .filter(blocking::Column::BlockeeId.eq(blockee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is blocking another user.
    pub async fn is_blocking(&self, blocker_id: &str, blockee_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(blocker_id, blockee_id).await?.is_some())
    }

    /// Check if either user is blocking the other.
    ///
    /// This symmetric form is the one every visibility and interaction
    /// check uses; the stored direction only matters for the UI.
    pub async fn is_blocked_either_way(&self, user_a: &str, user_b: &str) -> AppResult<bool> {
        let hit = Blocking::find()
            .filter(
                blocking::Column::BlockerId
                    .eq(user_a)
                    .and(blocking::Column::BlockeeId.eq(user_b))
                    .or(blocking::Column::BlockerId
                        .eq(user_b)
                        .and(blocking::Column::BlockeeId.eq(user_a))),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(hit.is_some())
    }

    /// Create a new block.
    pub async fn create(&self, model: blocking::ActiveModel) -> AppResult<blocking::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a block by pair.
    pub async fn delete_by_pair(&self, blocker_id: &str, blockee_id: &str) -> AppResult<()> {
        let block = self.find_by_pair(blocker_id, blockee_id).await?;
        if let Some(b) = block {
            b.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get the blocks a user has created.
    pub async fn find_blocking(&self, user_id: &str) -> AppResult<Vec<blocking::Model>> {
        Blocking::find()
            .filter(blocking::Column::BlockerId.eq(user_id))
            .order_by_desc(blocking::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get every user the given user is block-related to, in either
    /// direction.
    ///
    /// Used to prefetch the viewer's block partners so visibility can be
    /// applied as an in-memory pre-filter over a candidate set.
    pub async fn partner_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let blocked: Vec<String> = Blocking::find()
            .select_only()
            .column(blocking::Column::BlockeeId)
            .filter(blocking::Column::BlockerId.eq(user_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let blocked_by: Vec<String> = Blocking::find()
            .select_only()
            .column(blocking::Column::BlockerId)
            .filter(blocking::Column::BlockeeId.eq(user_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(merge_partners(blocked, blocked_by))
    }
}

/// Merge the two directed halves of the block relation into one sorted,
/// deduplicated partner set.
fn merge_partners(blocked: Vec<String>, blocked_by: Vec<String>) -> Vec<String> {
    let mut partners = blocked;
    partners.extend(blocked_by);
    partners.sort_unstable();
    partners.dedup();
    partners
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_block(id: &str, blocker_id: &str, blockee_id: &str) -> blocking::Model {
        blocking::Model {
            id: id.to_string(),
            blocker_id: blocker_id.to_string(),
            blockee_id: blockee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_blocking_true() {
        let block = create_test_block("b1", "user1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[block]])
                .into_connection(),
        );

        let repo = BlockingRepository::new(db);
        assert!(repo.is_blocking("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_blocking_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<blocking::Model>::new()])
                .into_connection(),
        );

        let repo = BlockingRepository::new(db);
        assert!(!repo.is_blocking("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_blocked_either_way_reverse_direction() {
        // user2 blocked user1; the symmetric check still reports true
        let block = create_test_block("b1", "user2", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[block]])
                .into_connection(),
        );

        let repo = BlockingRepository::new(db);
        assert!(repo.is_blocked_either_way("user1", "user2").await.unwrap());
    }

    #[test]
    fn test_merge_partners_dedups_mutual_blocks() {
        let blocked = vec!["user2".to_string(), "user3".to_string()];
        let blocked_by = vec!["user3".to_string(), "user4".to_string()];
        assert_eq!(
            merge_partners(blocked, blocked_by),
            vec!["user2", "user3", "user4"]
        );
    }

    #[test]
    fn test_merge_partners_empty() {
        assert!(merge_partners(vec![], vec![]).is_empty());
    }
}
