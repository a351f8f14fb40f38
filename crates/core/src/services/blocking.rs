//! Blocking service.

use crate::services::event_sink::EventSinkHandle;
use palaver_common::{AppError, AppResult, IdGenerator};
use palaver_db::{
    entities::blocking,
    repositories::{BlockingRepository, FollowingRepository},
};
use sea_orm::Set;

/// Blocking service for business logic.
///
/// Blocks are stored directionally but enforced symmetrically: the
/// [`is_blocked_either_way`](Self::is_blocked_either_way) check is the one
/// every visibility and interaction path uses.
#[derive(Clone)]
pub struct BlockingService {
    blocking_repo: BlockingRepository,
    following_repo: FollowingRepository,
    event_sink: Option<EventSinkHandle>,
    id_gen: IdGenerator,
}

impl BlockingService {
    /// Create a new blocking service.
    #[must_use]
    pub const fn new(
        blocking_repo: BlockingRepository,
        following_repo: FollowingRepository,
    ) -> Self {
        Self {
            blocking_repo,
            following_repo,
            event_sink: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event sink.
    pub fn set_event_sink(&mut self, event_sink: EventSinkHandle) {
        self.event_sink = Some(event_sink);
    }

    /// Block a user.
    ///
    /// A block supersedes any follow relationship: both directed follow
    /// edges are removed before the block is considered applied.
    pub async fn block(&self, blocker_id: &str, blockee_id: &str) -> AppResult<blocking::Model> {
        if blocker_id == blockee_id {
            return Err(AppError::SelfReference(
                "cannot block yourself".to_string(),
            ));
        }

        if self.blocking_repo.is_blocking(blocker_id, blockee_id).await? {
            return Err(AppError::Duplicate(
                "already blocking this user".to_string(),
            ));
        }

        self.following_repo
            .delete_by_pair(blocker_id, blockee_id)
            .await?;
        self.following_repo
            .delete_by_pair(blockee_id, blocker_id)
            .await?;

        let model = blocking::ActiveModel {
            id: Set(self.id_gen.generate()),
            blocker_id: Set(blocker_id.to_string()),
            blockee_id: Set(blockee_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.blocking_repo.create(model).await?;

        if let Some(ref event_sink) = self.event_sink
            && let Err(e) = event_sink.publish_blocked(blocker_id, blockee_id).await
        {
            tracing::warn!(error = %e, "Failed to publish blocked event");
        }

        Ok(created)
    }

    /// Unblock a user.
    pub async fn unblock(&self, blocker_id: &str, blockee_id: &str) -> AppResult<()> {
        if !self.blocking_repo.is_blocking(blocker_id, blockee_id).await? {
            return Err(AppError::NotFound("not blocking this user".to_string()));
        }

        self.blocking_repo
            .delete_by_pair(blocker_id, blockee_id)
            .await?;

        if let Some(ref event_sink) = self.event_sink
            && let Err(e) = event_sink.publish_unblocked(blocker_id, blockee_id).await
        {
            tracing::warn!(error = %e, "Failed to publish unblocked event");
        }

        Ok(())
    }

    /// Check if either user is blocking the other.
    pub async fn is_blocked_either_way(&self, user_a: &str, user_b: &str) -> AppResult<bool> {
        self.blocking_repo
            .is_blocked_either_way(user_a, user_b)
            .await
    }

    /// Get the blocks a user has created.
    pub async fn get_blocks(&self, user_id: &str) -> AppResult<Vec<blocking::Model>> {
        self.blocking_repo.find_blocking(user_id).await
    }
}
