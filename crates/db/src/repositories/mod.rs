//! Database repositories.

pub mod ban;
pub mod blocking;
pub mod comment;
pub mod community;
pub mod following;
pub mod member;
pub mod post;
pub mod user;
pub mod vote;

pub use ban::BanRepository;
pub use blocking::BlockingRepository;
pub use comment::CommentRepository;
pub use community::CommunityRepository;
pub use following::FollowingRepository;
pub use member::MemberRepository;
pub use post::PostRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
