//! Event sink interface.
//!
//! The core emits semantic events that an external real-time transport and
//! cache-invalidation layer subscribe to. Delivery is best-effort: the core
//! never depends on it succeeding, so publication failures are logged and
//! swallowed at the call sites. Each event carries the identities an
//! external invalidator needs (affected user ids, community id).

use async_trait::async_trait;
use palaver_common::AppResult;
use serde::Serialize;
use std::sync::Arc;

/// What kind of content a vote landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteTargetKind {
    /// A vote on a post.
    Post,
    /// A vote on a comment.
    Comment,
}

/// Payload of a ledger mutation event.
#[derive(Debug, Clone, Serialize)]
pub struct VoteApplied {
    /// Post or comment.
    pub target_kind: VoteTargetKind,
    /// ID of the voted-on item.
    pub target_id: String,
    /// The voting user.
    pub voter_id: String,
    /// The target's author, whose karma counter moved.
    pub author_id: String,
    /// Community the target belongs to, if any.
    pub community_id: Option<String>,
    /// The relative karma delta that was applied.
    pub delta: i64,
}

/// Trait for publishing semantic events.
///
/// This keeps the core decoupled from whatever transport fans the events
/// out to connected clients and cache invalidators.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// A user blocked another user.
    async fn publish_blocked(&self, blocker_id: &str, blockee_id: &str) -> AppResult<()>;

    /// A user removed a block.
    async fn publish_unblocked(&self, blocker_id: &str, blockee_id: &str) -> AppResult<()>;

    /// A user followed another user.
    async fn publish_followed(&self, follower_id: &str, followee_id: &str) -> AppResult<()>;

    /// A user unfollowed another user.
    async fn publish_unfollowed(&self, follower_id: &str, followee_id: &str) -> AppResult<()>;

    /// A moderator banned a user from a community.
    async fn publish_banned(
        &self,
        user_id: &str,
        community_id: &str,
        ban_id: &str,
    ) -> AppResult<()>;

    /// A moderator lifted a ban.
    async fn publish_unbanned(&self, user_id: &str, community_id: &str) -> AppResult<()>;

    /// A ledger mutation moved a karma counter.
    async fn publish_vote_applied(&self, event: &VoteApplied) -> AppResult<()>;
}

/// A no-op implementation for testing or when real-time events are disabled.
#[derive(Clone, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn publish_blocked(&self, _blocker_id: &str, _blockee_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn publish_unblocked(&self, _blocker_id: &str, _blockee_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn publish_followed(&self, _follower_id: &str, _followee_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn publish_unfollowed(&self, _follower_id: &str, _followee_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn publish_banned(
        &self,
        _user_id: &str,
        _community_id: &str,
        _ban_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn publish_unbanned(&self, _user_id: &str, _community_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn publish_vote_applied(&self, _event: &VoteApplied) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for a boxed event sink trait object.
pub type EventSinkHandle = Arc<dyn EventSink>;
