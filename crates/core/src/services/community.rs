//! Community service.

use palaver_common::{AppError, AppResult, IdGenerator};
use palaver_db::{
    entities::{community, community_member},
    repositories::{BanRepository, CommunityRepository, MemberRepository},
};
use sea_orm::Set;
use std::collections::HashSet;

/// Community service for business logic.
#[derive(Clone)]
pub struct CommunityService {
    community_repo: CommunityRepository,
    member_repo: MemberRepository,
    ban_repo: BanRepository,
    id_gen: IdGenerator,
}

impl CommunityService {
    /// Create a new community service.
    #[must_use]
    pub const fn new(
        community_repo: CommunityRepository,
        member_repo: MemberRepository,
        ban_repo: BanRepository,
    ) -> Self {
        Self {
            community_repo,
            member_repo,
            ban_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a community.
    ///
    /// The creator's member row is written in the same transaction with the
    /// moderator flag set; "creator" itself stays a derived comparison
    /// against the community's owner field.
    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> AppResult<community::Model> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "community name is required".to_string(),
            ));
        }

        if self.community_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Duplicate(
                "community name is already taken".to_string(),
            ));
        }

        let community_id = self.id_gen.generate();
        let community = community::ActiveModel {
            id: Set(community_id.clone()),
            owner_id: Set(owner_id.to_string()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let owner_member = community_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(owner_id.to_string()),
            community_id: Set(community_id),
            is_moderator: Set(true),
            joined_at: Set(chrono::Utc::now().into()),
        };

        self.community_repo
            .create_with_owner(community, owner_member)
            .await
    }

    /// Join a community.
    pub async fn join(
        &self,
        user_id: &str,
        community_id: &str,
    ) -> AppResult<community_member::Model> {
        self.community_repo.get_by_id(community_id).await?;

        if self.ban_repo.is_banned(user_id, community_id).await? {
            return Err(AppError::Authorization(
                "banned from this community".to_string(),
            ));
        }

        if self.member_repo.is_member(user_id, community_id).await? {
            return Err(AppError::Duplicate("already a member".to_string()));
        }

        let model = community_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            community_id: Set(community_id.to_string()),
            is_moderator: Set(false),
            joined_at: Set(chrono::Utc::now().into()),
        };

        self.member_repo.create(model).await
    }

    /// Leave a community.
    pub async fn leave(&self, user_id: &str, community_id: &str) -> AppResult<()> {
        if !self.member_repo.is_member(user_id, community_id).await? {
            return Err(AppError::NotFound(
                "not a member of this community".to_string(),
            ));
        }

        self.member_repo
            .delete_by_pair(user_id, community_id)
            .await
    }

    /// Promote or demote a member's moderator flag.
    pub async fn set_moderator(
        &self,
        acting_user_id: &str,
        user_id: &str,
        community_id: &str,
        is_moderator: bool,
    ) -> AppResult<community_member::Model> {
        if !self
            .member_repo
            .is_moderator(acting_user_id, community_id)
            .await?
        {
            return Err(AppError::Authorization(
                "only moderators can manage moderators".to_string(),
            ));
        }

        let member = self
            .member_repo
            .find_by_pair(user_id, community_id)
            .await?
            .ok_or_else(|| AppError::NotFound("not a member of this community".to_string()))?;

        self.member_repo.set_moderator(member, is_moderator).await
    }

    /// Get a community as seen by a viewer.
    ///
    /// A viewer with an active ban does not see the community at all;
    /// hidden and missing are indistinguishable.
    pub async fn get(
        &self,
        viewer_id: Option<&str>,
        community_id: &str,
    ) -> AppResult<community::Model> {
        let community = self.community_repo.get_by_id(community_id).await?;

        if let Some(viewer_id) = viewer_id
            && self.ban_repo.is_banned(viewer_id, community_id).await?
        {
            return Err(AppError::NotFound(format!("community {community_id}")));
        }

        Ok(community)
    }

    /// List communities, excluding the ones the viewer is actively banned
    /// from.
    pub async fn list(&self, viewer_id: Option<&str>) -> AppResult<Vec<community::Model>> {
        let communities = self.community_repo.list().await?;

        let Some(viewer_id) = viewer_id else {
            return Ok(communities);
        };

        let banned: HashSet<String> = self
            .ban_repo
            .active_community_ids(viewer_id)
            .await?
            .into_iter()
            .collect();

        Ok(communities
            .into_iter()
            .filter(|c| !banned.contains(&c.id))
            .collect())
    }

    /// List a community's members.
    pub async fn get_members(
        &self,
        community_id: &str,
    ) -> AppResult<Vec<community_member::Model>> {
        self.member_repo.find_by_community(community_id).await
    }
}
