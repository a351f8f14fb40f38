//! Following service.

use crate::services::event_sink::EventSinkHandle;
use palaver_common::{AppError, AppResult, IdGenerator};
use palaver_db::{
    entities::following,
    repositories::{BlockingRepository, FollowingRepository},
};
use sea_orm::Set;

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    blocking_repo: BlockingRepository,
    event_sink: Option<EventSinkHandle>,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(
        following_repo: FollowingRepository,
        blocking_repo: BlockingRepository,
    ) -> Self {
        Self {
            following_repo,
            blocking_repo,
            event_sink: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event sink.
    pub fn set_event_sink(&mut self, event_sink: EventSinkHandle) {
        self.event_sink = Some(event_sink);
    }

    /// Follow a user.
    ///
    /// Rejected when a block exists between the two users in either
    /// direction; the follow edge itself knows nothing about blocks.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<following::Model> {
        if follower_id == followee_id {
            return Err(AppError::SelfReference(
                "cannot follow yourself".to_string(),
            ));
        }

        if self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::Duplicate("already following".to_string()));
        }

        if self
            .blocking_repo
            .is_blocked_either_way(follower_id, followee_id)
            .await?
        {
            return Err(AppError::Blocked(
                "a block exists between these users".to_string(),
            ));
        }

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.following_repo.create(model).await?;

        // Follow notifications ride on this event; the notification store
        // itself belongs to a collaborator.
        if let Some(ref event_sink) = self.event_sink
            && let Err(e) = event_sink.publish_followed(follower_id, followee_id).await
        {
            tracing::warn!(error = %e, "Failed to publish followed event");
        }

        Ok(created)
    }

    /// Unfollow a user.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if !self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::NotFound("not following this user".to_string()));
        }

        self.following_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;

        if let Some(ref event_sink) = self.event_sink
            && let Err(e) = event_sink
                .publish_unfollowed(follower_id, followee_id)
                .await
        {
            tracing::warn!(error = %e, "Failed to publish unfollowed event");
        }

        Ok(())
    }

    /// Check if a user is following another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// Get the users a user is following.
    pub async fn get_following(&self, user_id: &str) -> AppResult<Vec<following::Model>> {
        self.following_repo.find_following(user_id).await
    }

    /// Get a user's followers.
    pub async fn get_followers(&self, user_id: &str) -> AppResult<Vec<following::Model>> {
        self.following_repo.find_followers(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use palaver_db::entities::blocking;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_follow(id: &str, follower_id: &str, followee_id: &str) -> following::Model {
        following::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            BlockingRepository::new(db2),
        );
        let result = service.follow("user1", "user1").await;

        assert!(matches!(result, Err(AppError::SelfReference(_))));
    }

    #[tokio::test]
    async fn test_follow_twice_returns_duplicate() {
        let existing = create_test_follow("f1", "user1", "user2");

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            BlockingRepository::new(db2),
        );
        let result = service.follow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_follow_blocked_user_is_rejected() {
        // user2 blocked user1; the follow is rejected either way round
        let block = blocking::Model {
            id: "b1".to_string(),
            blocker_id: "user2".to_string(),
            blockee_id: "user1".to_string(),
            created_at: Utc::now().into(),
        };

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<following::Model>::new()])
                .into_connection(),
        );
        let db2 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[block]])
                .into_connection(),
        );

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            BlockingRepository::new(db2),
        );
        let result = service.follow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::Blocked(_))));
    }

    #[tokio::test]
    async fn test_unfollow_not_found() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<following::Model>::new()])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            BlockingRepository::new(db2),
        );
        let result = service.unfollow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
