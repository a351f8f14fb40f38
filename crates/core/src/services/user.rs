//! User service.

use palaver_common::{AppError, AppResult, IdGenerator};
use palaver_db::{
    entities::user,
    repositories::{BlockingRepository, UserRepository},
};
use sea_orm::Set;
use std::collections::HashSet;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    blocking_repo: BlockingRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, blocking_repo: BlockingRepository) -> Self {
        Self {
            user_repo,
            blocking_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user. Karma counters start at zero and are only ever
    /// touched by the vote ledger afterwards.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        bio: &str,
    ) -> AppResult<user::Model> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("username is required".to_string()));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(AppError::Validation("a valid email is required".to_string()));
        }

        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::Duplicate(
                "email is already registered".to_string(),
            ));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            bio: Set(bio.to_string()),
            post_karma: Set(0),
            comment_karma: Set(0),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.user_repo.create(model).await
    }

    /// Get a user's profile as seen by a viewer.
    ///
    /// A blocked profile is reported as not found, in either direction;
    /// hidden and missing are indistinguishable to the caller.
    pub async fn get_user(
        &self,
        viewer_id: Option<&str>,
        user_id: &str,
    ) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

        if let Some(viewer_id) = viewer_id
            && viewer_id != user_id
            && self
                .blocking_repo
                .is_blocked_either_way(viewer_id, user_id)
                .await?
        {
            return Err(AppError::NotFound(format!("user {user_id}")));
        }

        Ok(user)
    }

    /// List users, excluding anyone block-related to the viewer.
    pub async fn list_users(&self, viewer_id: Option<&str>) -> AppResult<Vec<user::Model>> {
        let users = self.user_repo.list().await?;

        let Some(viewer_id) = viewer_id else {
            return Ok(users);
        };

        let partners: HashSet<String> = self
            .blocking_repo
            .partner_ids(viewer_id)
            .await?
            .into_iter()
            .collect();

        Ok(users
            .into_iter()
            .filter(|u| !partners.contains(&u.id))
            .collect())
    }

    /// Delete a user account. Blocks, follows, memberships, content and
    /// votes cascade at the store level.
    pub async fn delete(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.delete(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use palaver_db::entities::blocking;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, email: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: "tester".to_string(),
            email: email.to_string(),
            bio: String::new(),
            post_karma: 0,
            comment_karma: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_empty_username() {
        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = UserService::new(UserRepository::new(db1), BlockingRepository::new(db2));
        let result = service.register("  ", "a@example.com", "").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let existing = create_test_user("u1", "a@example.com");

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = UserService::new(UserRepository::new(db1), BlockingRepository::new(db2));
        let result = service.register("tester", "a@example.com", "").await;

        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_get_user_hides_blocked_profile_as_not_found() {
        let user = create_test_user("u2", "b@example.com");
        let block = blocking::Model {
            id: "b1".to_string(),
            blocker_id: "u2".to_string(),
            blockee_id: "u1".to_string(),
            created_at: Utc::now().into(),
        };

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let db2 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[block]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db1), BlockingRepository::new(db2));
        let result = service.get_user(Some("u1"), "u2").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_user_anonymous_sees_profile() {
        let user = create_test_user("u2", "b@example.com");

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = UserService::new(UserRepository::new(db1), BlockingRepository::new(db2));
        let found = service.get_user(None, "u2").await.unwrap();

        assert_eq!(found.id, "u2");
    }
}
