//! Community ban entity.
//!
//! A ban row is never explicitly "closed": a temporary ban stops being
//! active when its window elapses, and the row is kept for audit history.
//! Whether a ban is active is always computed from `is_permanent` and
//! `expires_at` against the clock, never stored.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "community_ban")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The banned user.
    pub user_id: String,

    pub community_id: String,

    /// The moderator who issued the ban.
    pub moderator_id: String,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    /// Mutually exclusive with a non-null `expires_at`.
    pub is_permanent: bool,

    /// End of the ban window; required when not permanent.
    #[sea_orm(nullable, indexed)]
    pub expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ModeratorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Moderator,

    #[sea_orm(
        belongs_to = "super::community::Entity",
        from = "Column::CommunityId",
        to = "super::community::Column::Id",
        on_delete = "Cascade"
    )]
    Community,
}

impl Related<super::community::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Community.def()
    }
}

impl Model {
    /// Whether this ban is in effect at the given instant.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        if self.is_permanent {
            return true;
        }
        self.expires_at.is_some_and(|expiry| expiry > now)
    }

    /// Whether this ban is in effect right now.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

impl ActiveModelBehavior for ActiveModel {}
