//! Community entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "community")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who created the community. "Creator" status is always the
    /// derived comparison `owner_id == user_id`, never a stored role.
    #[sea_orm(indexed)]
    pub owner_id: String,

    #[sea_orm(unique, indexed)]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,

    #[sea_orm(has_many = "super::community_member::Entity")]
    Members,

    #[sea_orm(has_many = "super::community_ban::Entity")]
    Bans,

    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::community_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::community_ban::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bans.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Model {
    /// Whether the given user created this community.
    #[must_use]
    pub fn is_creator(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_is_creator_is_derived_from_owner() {
        let community = Model {
            id: "c1".to_string(),
            owner_id: "user1".to_string(),
            name: "rust".to_string(),
            description: String::new(),
            created_at: Utc::now().into(),
        };
        assert!(community.is_creator("user1"));
        assert!(!community.is_creator("user2"));
    }
}
