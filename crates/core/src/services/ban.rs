//! Ban service.
//!
//! A (user, community) pair is in one of three states: unbanned,
//! banned-temporary, or banned-permanent. The temporary-to-unbanned
//! transition is never executed; it falls out of the activity predicate
//! (`is_permanent OR expires_at > now`) evaluated at read time. The only
//! explicit transitions are creation, field updates on the same row, and
//! moderator deletion.

use crate::services::event_sink::EventSinkHandle;
use chrono::{DateTime, Utc};
use palaver_common::{AppError, AppResult, IdGenerator};
use palaver_db::{
    entities::community_ban,
    repositories::{BanRepository, MemberRepository},
};
use sea_orm::Set;

/// Input for creating a ban.
pub struct CreateBanInput {
    /// The user to ban.
    pub user_id: String,
    /// The community to ban them from.
    pub community_id: String,
    /// Reason shown in the audit history.
    pub reason: String,
    /// Permanent bans carry no expiry.
    pub is_permanent: bool,
    /// Required for temporary bans; must be in the future.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input for updating an existing ban in place.
pub struct UpdateBanInput {
    /// New reason, if changed.
    pub reason: Option<String>,
    /// New permanence flag.
    pub is_permanent: bool,
    /// New expiry; same mutual-exclusion rules as creation.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Ban service for business logic.
#[derive(Clone)]
pub struct BanService {
    ban_repo: BanRepository,
    member_repo: MemberRepository,
    event_sink: Option<EventSinkHandle>,
    id_gen: IdGenerator,
}

impl BanService {
    /// Create a new ban service.
    #[must_use]
    pub const fn new(ban_repo: BanRepository, member_repo: MemberRepository) -> Self {
        Self {
            ban_repo,
            member_repo,
            event_sink: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event sink.
    pub fn set_event_sink(&mut self, event_sink: EventSinkHandle) {
        self.event_sink = Some(event_sink);
    }

    /// Ban a user from a community.
    pub async fn ban(
        &self,
        moderator_id: &str,
        input: CreateBanInput,
    ) -> AppResult<community_ban::Model> {
        if !self
            .member_repo
            .is_moderator(moderator_id, &input.community_id)
            .await?
        {
            return Err(AppError::Authorization(
                "only moderators can ban".to_string(),
            ));
        }

        // A moderator never bans a fellow moderator of the same community.
        if self
            .member_repo
            .is_moderator(&input.user_id, &input.community_id)
            .await?
        {
            return Err(AppError::Authorization(
                "cannot ban a moderator of this community".to_string(),
            ));
        }

        validate_ban_window(input.is_permanent, input.expires_at, Utc::now())?;

        if self
            .ban_repo
            .is_banned(&input.user_id, &input.community_id)
            .await?
        {
            return Err(AppError::AlreadyBanned(
                "user already has an active ban in this community".to_string(),
            ));
        }

        let model = community_ban::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(input.user_id.clone()),
            community_id: Set(input.community_id.clone()),
            moderator_id: Set(moderator_id.to_string()),
            reason: Set(input.reason),
            is_permanent: Set(input.is_permanent),
            expires_at: Set(input.expires_at.map(Into::into)),
            created_at: Set(Utc::now().into()),
        };

        let created = self.ban_repo.create(model).await?;

        if let Some(ref event_sink) = self.event_sink
            && let Err(e) = event_sink
                .publish_banned(&input.user_id, &input.community_id, &created.id)
                .await
        {
            tracing::warn!(error = %e, "Failed to publish banned event");
        }

        Ok(created)
    }

    /// Update a ban's permanence, expiry, or reason on the same row.
    ///
    /// There is no temporary/permanent transition besides this in-place
    /// update, and it re-validates the mutual-exclusion invariant.
    pub async fn update(
        &self,
        moderator_id: &str,
        ban_id: &str,
        input: UpdateBanInput,
    ) -> AppResult<community_ban::Model> {
        let ban = self
            .ban_repo
            .find_by_id(ban_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ban {ban_id}")))?;

        if !self
            .member_repo
            .is_moderator(moderator_id, &ban.community_id)
            .await?
        {
            return Err(AppError::Authorization(
                "only moderators can update bans".to_string(),
            ));
        }

        validate_ban_window(input.is_permanent, input.expires_at, Utc::now())?;

        // Widening this row's window must not produce a second active ban
        // for the pair.
        if let Some(active) = self
            .ban_repo
            .find_active(&ban.user_id, &ban.community_id)
            .await?
            && active.id != ban.id
        {
            return Err(AppError::AlreadyBanned(
                "user already has an active ban in this community".to_string(),
            ));
        }

        let mut model: community_ban::ActiveModel = ban.into();
        if let Some(reason) = input.reason {
            model.reason = Set(reason);
        }
        model.is_permanent = Set(input.is_permanent);
        model.expires_at = Set(input.expires_at.map(Into::into));

        self.ban_repo.update(model).await
    }

    /// Lift a user's active ban by deleting the row.
    pub async fn unban(
        &self,
        moderator_id: &str,
        user_id: &str,
        community_id: &str,
    ) -> AppResult<()> {
        if !self
            .member_repo
            .is_moderator(moderator_id, community_id)
            .await?
        {
            return Err(AppError::Authorization(
                "only moderators can lift bans".to_string(),
            ));
        }

        let ban = self
            .ban_repo
            .find_active(user_id, community_id)
            .await?
            .ok_or_else(|| AppError::NotFound("no active ban for this user".to_string()))?;

        self.ban_repo.delete(ban).await?;

        if let Some(ref event_sink) = self.event_sink
            && let Err(e) = event_sink.publish_unbanned(user_id, community_id).await
        {
            tracing::warn!(error = %e, "Failed to publish unbanned event");
        }

        Ok(())
    }

    /// Check if a user is currently banned from a community.
    ///
    /// Evaluated against wall-clock time on every call; nothing is cached.
    pub async fn is_banned(&self, user_id: &str, community_id: &str) -> AppResult<bool> {
        self.ban_repo.is_banned(user_id, community_id).await
    }

    /// A community's full ban history, for moderators.
    pub async fn get_community_bans(
        &self,
        moderator_id: &str,
        community_id: &str,
    ) -> AppResult<Vec<community_ban::Model>> {
        if !self
            .member_repo
            .is_moderator(moderator_id, community_id)
            .await?
        {
            return Err(AppError::Authorization(
                "only moderators can list bans".to_string(),
            ));
        }
        self.ban_repo.find_by_community(community_id).await
    }

    /// A user's own ban history.
    pub async fn get_user_bans(&self, user_id: &str) -> AppResult<Vec<community_ban::Model>> {
        self.ban_repo.find_by_user(user_id).await
    }
}

/// Validate the permanence/expiry combination of a ban window.
fn validate_ban_window(
    is_permanent: bool,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    match (is_permanent, expires_at) {
        (true, Some(_)) => Err(AppError::InvalidExpiry(
            "permanent ban cannot have an expiration date".to_string(),
        )),
        (false, None) => Err(AppError::InvalidExpiry(
            "non-permanent ban must have an expiration date".to_string(),
        )),
        (false, Some(expiry)) if expiry <= now => Err(AppError::InvalidExpiry(
            "ban expiration date cannot be in the past".to_string(),
        )),
        _ => Ok(()),
    }
}
