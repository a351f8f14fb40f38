//! Comment service.

use crate::services::post::VoteTally;
use crate::services::visibility::VisibilityService;
use palaver_common::{AppError, AppResult, IdGenerator};
use palaver_db::{
    entities::{
        VoteType,
        comment::{self, CommentStatus},
    },
    repositories::{BanRepository, BlockingRepository, CommentRepository, PostRepository, VoteRepository},
};
use sea_orm::Set;

/// Input for creating a comment.
pub struct CreateCommentInput {
    /// The post being commented on.
    pub post_id: String,
    /// Parent comment for a nested reply, if any.
    pub parent_id: Option<String>,
    /// Comment text.
    pub body: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    blocking_repo: BlockingRepository,
    ban_repo: BanRepository,
    vote_repo: VoteRepository,
    visibility: VisibilityService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        blocking_repo: BlockingRepository,
        ban_repo: BanRepository,
        vote_repo: VoteRepository,
        visibility: VisibilityService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            blocking_repo,
            ban_repo,
            vote_repo,
            visibility,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a post.
    ///
    /// Blocks are enforced bidirectionally here too: neither side of a
    /// block can comment on the other's posts. An active community ban
    /// blocks participation outright.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        if input.body.trim().is_empty() {
            return Err(AppError::Validation("comment body is required".to_string()));
        }

        let post = self.post_repo.get_by_id(&input.post_id).await?;

        if author_id != post.author_id
            && self
                .blocking_repo
                .is_blocked_either_way(author_id, &post.author_id)
                .await?
        {
            return Err(AppError::Blocked(
                "a block exists between you and the post author".to_string(),
            ));
        }

        if let Some(ref community_id) = post.community_id
            && self.ban_repo.is_banned(author_id, community_id).await?
        {
            return Err(AppError::Authorization(
                "banned from this community".to_string(),
            ));
        }

        if let Some(ref parent_id) = input.parent_id {
            let parent = self.comment_repo.get_by_id(parent_id).await?;
            if parent.post_id != input.post_id {
                return Err(AppError::Validation(
                    "parent comment must belong to the same post".to_string(),
                ));
            }
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            post_id: Set(input.post_id),
            parent_id: Set(input.parent_id),
            body: Set(input.body),
            status: Set(CommentStatus::Accepted),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.comment_repo.create(model).await
    }

    /// Get a comment as seen by a viewer; hidden comments read as not
    /// found.
    pub async fn get(
        &self,
        viewer_id: Option<&str>,
        comment_id: &str,
    ) -> AppResult<comment::Model> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;

        let post = self.post_repo.get_by_id(&comment.post_id).await?;

        let ctx = self.visibility.context_for(viewer_id).await?;
        if ctx.is_hidden(&comment.author_id, post.community_id.as_deref()) {
            return Err(AppError::NotFound(format!("comment {comment_id}")));
        }

        Ok(comment)
    }

    /// List a post's comments, pre-filtered for the viewer.
    pub async fn list_for_post(
        &self,
        viewer_id: Option<&str>,
        post_id: &str,
    ) -> AppResult<Vec<comment::Model>> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let comments = self.comment_repo.find_by_post(post_id).await?;

        let ctx = self.visibility.context_for(viewer_id).await?;
        Ok(comments
            .into_iter()
            .filter(|c| !ctx.is_hidden(&c.author_id, post.community_id.as_deref()))
            .collect())
    }

    /// Live vote totals for a comment.
    pub async fn tally(&self, comment_id: &str) -> AppResult<VoteTally> {
        let upvotes = self
            .vote_repo
            .count_comment_votes(comment_id, VoteType::Up)
            .await?;
        let downvotes = self
            .vote_repo
            .count_comment_votes(comment_id, VoteType::Down)
            .await?;
        Ok(VoteTally { upvotes, downvotes })
    }
}
