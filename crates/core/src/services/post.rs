//! Post service.

use crate::services::moderation::{ModerationService, ModerationTarget};
use crate::services::visibility::VisibilityService;
use palaver_common::{AppError, AppResult, IdGenerator};
use palaver_db::{
    entities::{
        VoteType,
        post::{self, PostKind, PostStatus},
    },
    repositories::{BanRepository, CommunityRepository, PostRepository, VoteRepository},
};
use sea_orm::Set;

/// Input for creating a post.
pub struct CreatePostInput {
    /// Post title.
    pub title: String,
    /// Body text; required for text posts.
    pub body: String,
    /// Content kind.
    pub kind: PostKind,
    /// Target URL; required for link posts, forbidden otherwise.
    pub link: Option<String>,
    /// Community to post into, if any.
    pub community_id: Option<String>,
}

/// Up/down totals for a content item, computed from the live vote rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    /// Number of live upvotes.
    pub upvotes: u64,
    /// Number of live downvotes.
    pub downvotes: u64,
}

impl VoteTally {
    /// Signed score (upvotes minus downvotes).
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    community_repo: CommunityRepository,
    ban_repo: BanRepository,
    vote_repo: VoteRepository,
    visibility: VisibilityService,
    moderation: ModerationService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        community_repo: CommunityRepository,
        ban_repo: BanRepository,
        vote_repo: VoteRepository,
        visibility: VisibilityService,
        moderation: ModerationService,
    ) -> Self {
        Self {
            post_repo,
            community_repo,
            ban_repo,
            vote_repo,
            visibility,
            moderation,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    ///
    /// Community posts enter the moderation queue as pending; posts outside
    /// any community are accepted immediately.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        validate_content(&input)?;

        let status = match input.community_id {
            Some(ref community_id) => {
                self.community_repo.get_by_id(community_id).await?;

                if self.ban_repo.is_banned(author_id, community_id).await? {
                    return Err(AppError::Authorization(
                        "banned from this community".to_string(),
                    ));
                }

                PostStatus::Pending
            }
            None => PostStatus::Accepted,
        };

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            community_id: Set(input.community_id),
            title: Set(input.title),
            body: Set(input.body),
            kind: Set(input.kind),
            link: Set(input.link),
            status: Set(status),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.post_repo.create(model).await
    }

    /// Get a post as seen by a viewer; hidden posts read as not found.
    pub async fn get(&self, viewer_id: Option<&str>, post_id: &str) -> AppResult<post::Model> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

        if !self.visibility.is_visible(viewer_id, &post).await? {
            return Err(AppError::NotFound(format!("post {post_id}")));
        }

        Ok(post)
    }

    /// List recent posts, pre-filtered for the viewer.
    pub async fn list(&self, viewer_id: Option<&str>) -> AppResult<Vec<post::Model>> {
        let posts = self.post_repo.list_recent().await?;
        self.visibility.filter(viewer_id, posts).await
    }

    /// List a community's posts, pre-filtered for the viewer.
    pub async fn list_by_community(
        &self,
        viewer_id: Option<&str>,
        community_id: &str,
    ) -> AppResult<Vec<post::Model>> {
        let posts = self.post_repo.find_by_community(community_id).await?;
        self.visibility.filter(viewer_id, posts).await
    }

    /// List a user's posts, pre-filtered for the viewer.
    pub async fn list_by_author(
        &self,
        viewer_id: Option<&str>,
        author_id: &str,
    ) -> AppResult<Vec<post::Model>> {
        let posts = self.post_repo.find_by_author(author_id).await?;
        self.visibility.filter(viewer_id, posts).await
    }

    /// Live vote totals for a post.
    pub async fn tally(&self, post_id: &str) -> AppResult<VoteTally> {
        let upvotes = self.vote_repo.count_post_votes(post_id, VoteType::Up).await?;
        let downvotes = self
            .vote_repo
            .count_post_votes(post_id, VoteType::Down)
            .await?;
        Ok(VoteTally { upvotes, downvotes })
    }

    /// Accept or remove a post (moderation action).
    pub async fn set_status(
        &self,
        acting_user_id: &str,
        post_id: &str,
        status: PostStatus,
    ) -> AppResult<post::Model> {
        let target = ModerationTarget::Post {
            post_id: post_id.to_string(),
        };
        if !self.moderation.can_moderate(acting_user_id, &target).await? {
            return Err(AppError::Authorization(
                "not allowed to moderate this post".to_string(),
            ));
        }

        let post = self.post_repo.get_by_id(post_id).await?;
        self.post_repo.set_status(post, status).await
    }
}

/// Validate the kind/body/link combination, mirroring what each post kind
/// requires.
fn validate_content(input: &CreatePostInput) -> AppResult<()> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    match input.kind {
        PostKind::Text => {
            if input.body.trim().is_empty() {
                return Err(AppError::Validation(
                    "text posts must have content".to_string(),
                ));
            }
            if input.link.is_some() {
                return Err(AppError::Validation(
                    "text posts should not have a link".to_string(),
                ));
            }
        }
        PostKind::Link => {
            if input.link.as_deref().is_none_or(|l| l.trim().is_empty()) {
                return Err(AppError::Validation(
                    "link posts must have a URL".to_string(),
                ));
            }
        }
        PostKind::Media => {
            if input.link.is_some() {
                return Err(AppError::Validation(
                    "media posts should not have a link".to_string(),
                ));
            }
        }
    }

    Ok(())
}
