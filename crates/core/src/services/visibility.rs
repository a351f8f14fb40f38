//! Visibility service.
//!
//! One predicate decides, for a viewer and a content item, whether the item
//! may be shown: a block between viewer and author hides it, and an active
//! ban in the item's community hides it unless the viewer wrote it. The
//! predicate is pure over a prefetched [`ViewerContext`], so the same logic
//! serves both the single-item check and the collection pre-filter, and the
//! two can never disagree.
//!
//! Callers must treat "not visible" exactly like "not found"; hidden
//! content never reveals its existence.

use palaver_common::AppResult;
use palaver_db::entities::{comment, post};
use palaver_db::repositories::{BanRepository, BlockingRepository};
use std::collections::HashSet;

/// Everything needed to evaluate visibility for one viewer, loaded once.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    viewer_id: Option<String>,
    blocked_partners: HashSet<String>,
    banned_communities: HashSet<String>,
}

impl ViewerContext {
    /// Context for an unauthenticated viewer: no blocks or bans apply.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            viewer_id: None,
            blocked_partners: HashSet::new(),
            banned_communities: HashSet::new(),
        }
    }

    /// Context for an authenticated viewer with prefetched relation sets.
    #[must_use]
    pub fn new(
        viewer_id: String,
        blocked_partners: HashSet<String>,
        banned_communities: HashSet<String>,
    ) -> Self {
        Self {
            viewer_id: Some(viewer_id),
            blocked_partners,
            banned_communities,
        }
    }

    /// The viewer's ID, if authenticated.
    #[must_use]
    pub fn viewer_id(&self) -> Option<&str> {
        self.viewer_id.as_deref()
    }

    /// Whether content by `author_id` in `community_id` is hidden from this
    /// viewer.
    ///
    /// Authors always see their own content, even while banned: a ban
    /// blocks participation, not the author's view of their own posts.
    #[must_use]
    pub fn is_hidden(&self, author_id: &str, community_id: Option<&str>) -> bool {
        let Some(viewer_id) = self.viewer_id.as_deref() else {
            return false;
        };

        if self.blocked_partners.contains(author_id) {
            return true;
        }

        if let Some(community_id) = community_id
            && self.banned_communities.contains(community_id)
            && viewer_id != author_id
        {
            return true;
        }

        false
    }

    /// Convenience wrapper over [`is_hidden`](Self::is_hidden) for
    /// self-describing items.
    #[must_use]
    pub fn is_visible<T: Visible>(&self, item: &T) -> bool {
        !self.is_hidden(item.author_id(), item.community_id())
    }

    /// Retain only the items visible to this viewer.
    pub fn filter<T: Visible>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().filter(|i| self.is_visible(i)).collect()
    }
}

/// Content that can describe its own visibility inputs.
pub trait Visible {
    /// The item's author.
    fn author_id(&self) -> &str;
    /// The community the item belongs to, if any.
    fn community_id(&self) -> Option<&str>;
}

impl Visible for post::Model {
    fn author_id(&self) -> &str {
        &self.author_id
    }

    fn community_id(&self) -> Option<&str> {
        self.community_id.as_deref()
    }
}

/// Comments resolve their community through the owning post, so a comment
/// is paired with its post's community id for filtering.
impl Visible for (comment::Model, Option<String>) {
    fn author_id(&self) -> &str {
        &self.0.author_id
    }

    fn community_id(&self) -> Option<&str> {
        self.1.as_deref()
    }
}

/// Visibility service: loads viewer contexts and applies the predicate.
#[derive(Clone)]
pub struct VisibilityService {
    blocking_repo: BlockingRepository,
    ban_repo: BanRepository,
}

impl VisibilityService {
    /// Create a new visibility service.
    #[must_use]
    pub const fn new(blocking_repo: BlockingRepository, ban_repo: BanRepository) -> Self {
        Self {
            blocking_repo,
            ban_repo,
        }
    }

    /// Load the context for a viewer: block partners in either direction
    /// and the communities they are actively banned from.
    pub async fn context_for(&self, viewer_id: Option<&str>) -> AppResult<ViewerContext> {
        let Some(viewer_id) = viewer_id else {
            return Ok(ViewerContext::anonymous());
        };

        let blocked_partners = self
            .blocking_repo
            .partner_ids(viewer_id)
            .await?
            .into_iter()
            .collect();
        let banned_communities = self
            .ban_repo
            .active_community_ids(viewer_id)
            .await?
            .into_iter()
            .collect();

        Ok(ViewerContext::new(
            viewer_id.to_string(),
            blocked_partners,
            banned_communities,
        ))
    }

    /// Single-item visibility check.
    pub async fn is_visible<T: Visible>(&self, viewer_id: Option<&str>, item: &T) -> AppResult<bool> {
        Ok(self.context_for(viewer_id).await?.is_visible(item))
    }

    /// Pre-filter a candidate set down to what the viewer may see.
    pub async fn filter<T: Visible>(
        &self,
        viewer_id: Option<&str>,
        items: Vec<T>,
    ) -> AppResult<Vec<T>> {
        Ok(self.context_for(viewer_id).await?.filter(items))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use palaver_db::entities::post::{PostKind, PostStatus};

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

    fn context(viewer: &str, blocked: &[&str], banned: &[&str]) -> ViewerContext {
        ViewerContext::new(
            viewer.to_string(),
            blocked.iter().map(ToString::to_string).collect(),
            banned.iter().map(ToString::to_string).collect(),
        )
    }

    #[test]
    fn test_blocked_author_is_hidden() {
        let ctx = context("viewer", &["author"], &[]);
        assert!(ctx.is_hidden("author", None));
        assert!(ctx.is_hidden("author", Some("c1")));
    }

    #[test]
    fn test_banned_community_hides_others_content() {
        let ctx = context("viewer", &[], &["c1"]);
        assert!(ctx.is_hidden("author", Some("c1")));
        assert!(!ctx.is_hidden("author", Some("c2")));
        assert!(!ctx.is_hidden("author", None));
    }

    #[test]
    fn test_banned_author_still_sees_own_content() {
        // A ban prevents participation, not the author's view of their own
        // posts.
        let ctx = context("author", &[], &["c1"]);
        assert!(!ctx.is_hidden("author", Some("c1")));
    }

    #[test]
    fn test_anonymous_viewer_sees_everything() {
        let ctx = ViewerContext::anonymous();
        assert!(!ctx.is_hidden("author", Some("c1")));
        assert!(!ctx.is_hidden("author", None));
    }

    #[test]
    fn test_filter_and_single_item_check_agree() {
        let ctx = context("viewer", &["enemy"], &["c1"]);
        let posts = vec![
            create_test_post("p1", "friend", None),
            create_test_post("p2", "enemy", None),
            create_test_post("p3", "friend", Some("c1")),
            create_test_post("p4", "viewer", Some("c1")),
            create_test_post("p5", "friend", Some("c2")),
        ];

        let kept: Vec<String> = ctx
            .filter(posts.clone())
            .into_iter()
            .map(|p| p.id)
            .collect();

        // the pre-filter must keep exactly the posts the single-item check
        // would accept
        let singly: Vec<String> = posts
            .iter()
            .filter(|p| ctx.is_visible(*p))
            .map(|p| p.id.clone())
            .collect();

        assert_eq!(kept, singly);
        assert_eq!(kept, vec!["p1", "p4", "p5"]);
    }

    #[test]
    fn test_comment_visibility_resolves_through_post_community() {
        let ctx = context("viewer", &[], &["c1"]);
        let comment = comment::Model {
            id: "cm1".to_string(),
            author_id: "author".to_string(),
            post_id: "p1".to_string(),
            parent_id: None,
            body: "hi".to_string(),
            status: comment::CommentStatus::Accepted,
            created_at: Utc::now().into(),
        };

        assert!(!ctx.is_visible(&(comment.clone(), Some("c1".to_string()))));
        assert!(ctx.is_visible(&(comment, None)));
    }
}
