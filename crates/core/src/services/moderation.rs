//! Moderation authority service.
//!
//! Resolves membership and moderator rights per (user, community) and
//! answers the polymorphic "can this user moderate that thing" question the
//! action handlers gate on before mutating.

use palaver_common::AppResult;
use palaver_db::repositories::{CommentRepository, MemberRepository, PostRepository};

/// What a moderation check is aimed at.
#[derive(Debug, Clone)]
pub enum ModerationTarget {
    /// A community itself.
    Community {
        /// The community's ID.
        community_id: String,
    },
    /// A post, whose owning community is resolved on the fly.
    Post {
        /// The post's ID.
        post_id: String,
    },
    /// A comment, resolved through its post to the owning community.
    Comment {
        /// The comment's ID.
        comment_id: String,
    },
}

/// Moderation authority service.
#[derive(Clone)]
pub struct ModerationService {
    member_repo: MemberRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        member_repo: MemberRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            member_repo,
            post_repo,
            comment_repo,
        }
    }

    /// Check if a user belongs to a community.
    pub async fn is_member(&self, user_id: &str, community_id: &str) -> AppResult<bool> {
        self.member_repo.is_member(user_id, community_id).await
    }

    /// Check if a user moderates a community.
    pub async fn is_moderator(&self, user_id: &str, community_id: &str) -> AppResult<bool> {
        self.member_repo.is_moderator(user_id, community_id).await
    }

    /// Check if a user may moderate the given target.
    ///
    /// Content without an owning community is moderatable by no one but its
    /// own author.
    pub async fn can_moderate(&self, user_id: &str, target: &ModerationTarget) -> AppResult<bool> {
        match target {
            ModerationTarget::Community { community_id } => {
                self.member_repo.is_moderator(user_id, community_id).await
            }
            ModerationTarget::Post { post_id } => {
                let post = self.post_repo.get_by_id(post_id).await?;
                match post.community_id {
                    Some(ref community_id) => {
                        self.member_repo.is_moderator(user_id, community_id).await
                    }
                    None => Ok(post.author_id == user_id),
                }
            }
            ModerationTarget::Comment { comment_id } => {
                let comment = self.comment_repo.get_by_id(comment_id).await?;
                let post = self.post_repo.get_by_id(&comment.post_id).await?;
                match post.community_id {
                    Some(ref community_id) => {
                        self.member_repo.is_moderator(user_id, community_id).await
                    }
                    None => Ok(comment.author_id == user_id),
                }
            }
        }
    }

    /// Check if a moderator may ban the given user from a community.
    ///
    /// Moderators never ban fellow moderators of the same community. This is
    /// an authorization guard on the action, not a registry invariant.
    pub async fn can_ban(
        &self,
        moderator_id: &str,
        target_user_id: &str,
        community_id: &str,
    ) -> AppResult<bool> {
        if !self
            .member_repo
            .is_moderator(moderator_id, community_id)
            .await?
        {
            return Ok(false);
        }
        Ok(!self
            .member_repo
            .is_moderator(target_user_id, community_id)
            .await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use palaver_db::entities::{
        community_member,
        post::{self, PostKind, PostStatus},
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_member(id: &str, user_id: &str, community_id: &str) -> community_member::Model {
        community_member::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            community_id: community_id.to_string(),
            is_moderator: true,
            joined_at: Utc::now().into(),
        }
    }

    fn create_test_post(id: &str, author_id: &str, community_id: Option<&str>) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            community_id: community_id.map(ToString::to_string),
            title: "A post".to_string(),
            body: "Body".to_string(),
            kind: PostKind::Text,
            link: None,
            status: PostStatus::Accepted,
            created_at: Utc::now().into(),
        }
    }

    fn service(
        member_db: MockDatabase,
        post_db: MockDatabase,
        comment_db: MockDatabase,
    ) -> ModerationService {
        ModerationService::new(
            MemberRepository::new(Arc::new(member_db.into_connection())),
            PostRepository::new(Arc::new(post_db.into_connection())),
            CommentRepository::new(Arc::new(comment_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_can_moderate_post_in_community() {
        let post = create_test_post("p1", "author1", Some("c1"));
        let moderator = create_test_member("m1", "mod1", "c1");

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[moderator]]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[post]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let target = ModerationTarget::Post {
            post_id: "p1".to_string(),
        };
        assert!(service.can_moderate("mod1", &target).await.unwrap());
    }

    #[tokio::test]
    async fn test_community_less_post_only_author_moderates() {
        let post = create_test_post("p1", "author1", None);

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()], [post]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let target = ModerationTarget::Post {
            post_id: "p1".to_string(),
        };
        assert!(service.can_moderate("author1", &target).await.unwrap());
        assert!(!service.can_moderate("mod1", &target).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_ban_denies_non_moderator() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<community_member::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(!service.can_ban("user1", "user2", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_can_ban_denies_banning_a_moderator() {
        let mod1 = create_test_member("m1", "user1", "c1");
        let mod2 = create_test_member("m2", "user2", "c1");

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[mod1], [mod2]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(!service.can_ban("user1", "user2", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_can_ban_allows_moderator_over_plain_member() {
        let mod1 = create_test_member("m1", "user1", "c1");

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[mod1]])
                .append_query_results([Vec::<community_member::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(service.can_ban("user1", "user2", "c1").await.unwrap());
    }
}
