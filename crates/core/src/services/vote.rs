//! Vote service.
//!
//! The interaction ledger: at most one vote per (user, target), and the
//! target author's karma counter always equals the signed sum of the live
//! votes on their content. Each mutation is a single store transaction
//! pairing the vote row with a relative counter adjustment, so a crash can
//! never leave one without the other.
//!
//! Authorization is the caller's concern: this service consults nothing
//! from the visibility layer, and the caller resolves the target's author.

use crate::services::event_sink::{EventSinkHandle, VoteApplied, VoteTargetKind};
use palaver_common::{AppError, AppResult, IdGenerator};
use palaver_db::{
    entities::{VoteType, comment_vote, post_vote},
    repositories::VoteRepository,
};
use sea_orm::Set;

/// A vote target with its author resolved by the calling handler.
#[derive(Debug, Clone)]
pub enum VoteTarget {
    /// A post.
    Post {
        /// The post's ID.
        post_id: String,
        /// The post's author, whose post karma moves.
        author_id: String,
        /// The post's community, carried on the emitted event.
        community_id: Option<String>,
    },
    /// A comment.
    Comment {
        /// The comment's ID.
        comment_id: String,
        /// The comment's author, whose comment karma moves.
        author_id: String,
        /// The owning post's community, carried on the emitted event.
        community_id: Option<String>,
    },
}

impl VoteTarget {
    fn kind(&self) -> VoteTargetKind {
        match self {
            Self::Post { .. } => VoteTargetKind::Post,
            Self::Comment { .. } => VoteTargetKind::Comment,
        }
    }

    fn target_id(&self) -> &str {
        match self {
            Self::Post { post_id, .. } => post_id,
            Self::Comment { comment_id, .. } => comment_id,
        }
    }

    fn author_id(&self) -> &str {
        match self {
            Self::Post { author_id, .. } | Self::Comment { author_id, .. } => author_id,
        }
    }

    fn community_id(&self) -> Option<&str> {
        match self {
            Self::Post { community_id, .. } | Self::Comment { community_id, .. } => {
                community_id.as_deref()
            }
        }
    }
}

/// Vote service for the interaction ledger.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    event_sink: Option<EventSinkHandle>,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository) -> Self {
        Self {
            vote_repo,
            event_sink: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event sink.
    pub fn set_event_sink(&mut self, event_sink: EventSinkHandle) {
        self.event_sink = Some(event_sink);
    }

    /// Cast a vote.
    ///
    /// Fails with a duplicate when a live vote already exists for the
    /// (user, target) pair. The pre-check is a courtesy; the unique index
    /// inside the insert transaction is what actually guards against a
    /// concurrent double-apply.
    pub async fn create(
        &self,
        user_id: &str,
        target: &VoteTarget,
        vote_type: VoteType,
    ) -> AppResult<()> {
        let delta = vote_type.delta();

        match target {
            VoteTarget::Post {
                post_id, author_id, ..
            } => {
                if self
                    .vote_repo
                    .find_post_vote(user_id, post_id)
                    .await?
                    .is_some()
                {
                    return Err(AppError::Duplicate(
                        "already voted on this post".to_string(),
                    ));
                }

                let model = post_vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    post_id: Set(post_id.clone()),
                    vote_type: Set(vote_type),
                    created_at: Set(chrono::Utc::now().into()),
                };
                self.vote_repo
                    .insert_post_vote(model, author_id, delta)
                    .await?;
            }
            VoteTarget::Comment {
                comment_id,
                author_id,
                ..
            } => {
                if self
                    .vote_repo
                    .find_comment_vote(user_id, comment_id)
                    .await?
                    .is_some()
                {
                    return Err(AppError::Duplicate(
                        "already voted on this comment".to_string(),
                    ));
                }

                let model = comment_vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    comment_id: Set(comment_id.clone()),
                    vote_type: Set(vote_type),
                    created_at: Set(chrono::Utc::now().into()),
                };
                self.vote_repo
                    .insert_comment_vote(model, author_id, delta)
                    .await?;
            }
        }

        self.publish(user_id, target, delta).await;
        Ok(())
    }

    /// Switch an existing vote to the other type.
    ///
    /// Switching to the same type is a no-op with no karma movement;
    /// otherwise the old vote's removal and the new vote's application
    /// collapse into one ±2 relative delta.
    pub async fn change_type(
        &self,
        user_id: &str,
        target: &VoteTarget,
        new_type: VoteType,
    ) -> AppResult<()> {
        match target {
            VoteTarget::Post {
                post_id, author_id, ..
            } => {
                let vote = self
                    .vote_repo
                    .find_post_vote(user_id, post_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("no vote on this post".to_string()))?;

                let delta = vote.vote_type.change_delta(new_type);
                if delta == 0 {
                    return Ok(());
                }

                self.vote_repo
                    .update_post_vote_type(vote, new_type, author_id, delta)
                    .await?;
                self.publish(user_id, target, delta).await;
            }
            VoteTarget::Comment {
                comment_id,
                author_id,
                ..
            } => {
                let vote = self
                    .vote_repo
                    .find_comment_vote(user_id, comment_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("no vote on this comment".to_string()))?;

                let delta = vote.vote_type.change_delta(new_type);
                if delta == 0 {
                    return Ok(());
                }

                self.vote_repo
                    .update_comment_vote_type(vote, new_type, author_id, delta)
                    .await?;
                self.publish(user_id, target, delta).await;
            }
        }

        Ok(())
    }

    /// Withdraw a vote, applying the inverse of its live delta.
    pub async fn delete(&self, user_id: &str, target: &VoteTarget) -> AppResult<()> {
        match target {
            VoteTarget::Post {
                post_id, author_id, ..
            } => {
                let vote = self
                    .vote_repo
                    .find_post_vote(user_id, post_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("no vote on this post".to_string()))?;

                let delta = -vote.vote_type.delta();
                self.vote_repo
                    .delete_post_vote(vote, author_id, delta)
                    .await?;
                self.publish(user_id, target, delta).await;
            }
            VoteTarget::Comment {
                comment_id,
                author_id,
                ..
            } => {
                let vote = self
                    .vote_repo
                    .find_comment_vote(user_id, comment_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("no vote on this comment".to_string()))?;

                let delta = -vote.vote_type.delta();
                self.vote_repo
                    .delete_comment_vote(vote, author_id, delta)
                    .await?;
                self.publish(user_id, target, delta).await;
            }
        }

        Ok(())
    }

    /// Best-effort ledger event with the identities an external cache
    /// invalidator needs.
    async fn publish(&self, voter_id: &str, target: &VoteTarget, delta: i64) {
        if let Some(ref event_sink) = self.event_sink {
            let event = VoteApplied {
                target_kind: target.kind(),
                target_id: target.target_id().to_string(),
                voter_id: voter_id.to_string(),
                author_id: target.author_id().to_string(),
                community_id: target.community_id().map(ToString::to_string),
                delta,
            };
            if let Err(e) = event_sink.publish_vote_applied(&event).await {
                tracing::warn!(error = %e, "Failed to publish vote applied event");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_post_vote(
        id: &str,
        user_id: &str,
        post_id: &str,
        vote_type: VoteType,
    ) -> post_vote::Model {
        post_vote::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            vote_type,
            created_at: Utc::now().into(),
        }
    }

    fn post_target() -> VoteTarget {
        VoteTarget::Post {
            post_id: "post1".to_string(),
            author_id: "author1".to_string(),
            community_id: Some("c1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_vote_is_rejected_without_karma_change() {
        let existing = create_test_post_vote("v1", "user1", "post1", VoteType::Up);

        // Only the lookup is answered; any attempt to run the insert
        // transaction would fail the test by exhausting the mock.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        let result = service
            .create("user1", &post_target(), VoteType::Down)
            .await;

        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_change_type_same_type_is_a_noop() {
        let existing = create_test_post_vote("v1", "user1", "post1", VoteType::Up);

        // No exec results appended: if the no-op tried to write, the mock
        // would error out.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        service
            .change_type("user1", &post_target(), VoteType::Up)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_change_type_without_vote_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_vote::Model>::new()])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        let result = service
            .change_type("user1", &post_target(), VoteType::Down)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_without_vote_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_vote::Model>::new()])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        let result = service.delete("user1", &post_target()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_applies_inverse_delta_in_one_transaction() {
        let existing = create_test_post_vote("v1", "user1", "post1", VoteType::Up);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_exec_results([
                    // DELETE of the vote row
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    // relative karma UPDATE
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        service.delete("user1", &post_target()).await.unwrap();
    }
}
