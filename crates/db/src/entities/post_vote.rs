//! Post vote entity.
//!
//! At most one vote exists per (user, post); the unique index is what makes
//! a duplicate concurrent create fail instead of double-applying a karma
//! delta.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum VoteType {
    #[sea_orm(string_value = "upvote")]
    Up,
    #[sea_orm(string_value = "downvote")]
    Down,
}

impl VoteType {
    /// The karma delta a live vote of this type contributes.
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// The relative delta of switching a live vote to `new`.
    ///
    /// Removing the old vote's effect and applying the new one collapse to
    /// ±2 around zero; switching to the same type is a no-op.
    #[must_use]
    pub const fn change_delta(self, new: Self) -> i64 {
        new.delta() - self.delta()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post_vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    pub post_id: String,

    pub vote_type: VoteType,

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
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_deltas() {
        assert_eq!(VoteType::Up.delta(), 1);
        assert_eq!(VoteType::Down.delta(), -1);
    }

    #[test]
    fn test_change_delta_doubles_around_zero() {
        assert_eq!(VoteType::Down.change_delta(VoteType::Up), 2);
        assert_eq!(VoteType::Up.change_delta(VoteType::Down), -2);
    }

    #[test]
    fn test_change_delta_same_type_is_zero() {
        assert_eq!(VoteType::Up.change_delta(VoteType::Up), 0);
        assert_eq!(VoteType::Down.change_delta(VoteType::Down), 0);
    }
}
