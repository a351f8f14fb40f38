//! Database entities.

pub mod blocking;
pub mod comment;
pub mod comment_vote;
pub mod community;
pub mod community_ban;
pub mod community_member;
pub mod following;
pub mod post;
pub mod post_vote;
pub mod user;

pub use blocking::Entity as Blocking;
pub use comment::Entity as Comment;
pub use comment_vote::Entity as CommentVote;
pub use community::Entity as Community;
pub use community_ban::Entity as CommunityBan;
pub use community_member::Entity as CommunityMember;
pub use following::Entity as Following;
pub use post::Entity as Post;
pub use post_vote::Entity as PostVote;
pub use post_vote::VoteType;
pub use user::Entity as User;
