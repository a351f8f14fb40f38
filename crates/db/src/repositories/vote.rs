//! Vote repository.
//!
//! Every mutating operation here is one store transaction covering the vote
//! row and the author's karma counter, and the counter is always adjusted
//! with a relative column expression (`karma = karma + delta`). No caller
//! ever reads a counter, computes, and writes it back, so concurrent votes
//! on the same author can never lose an update.

use std::sync::Arc;

use crate::entities::{CommentVote, PostVote, User, VoteType, comment_vote, post_vote, user};
use palaver_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, Set, SqlErr, TransactionError, TransactionTrait,
    sea_query::Expr,
};

/// Map a failed vote transaction into the application taxonomy.
///
/// A unique-index violation means a concurrent create already applied its
/// delta for the same (user, target); it must surface as a duplicate, never
/// as a partially applied ledger write.
fn map_vote_txn_err(err: TransactionError<DbErr>) -> AppError {
    match err {
        TransactionError::Transaction(db_err)
            if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
        {
            AppError::Duplicate("vote already exists for this target".to_string())
        }
        other => AppError::Database(other.to_string()),
    }
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Post votes ==========

    /// Find a user's vote on a post.
    pub async fn find_post_vote(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<post_vote::Model>> {
        PostVote::find()
            .filter(post_vote::Column::UserId.eq(user_id))
            .filter(post_vote::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a post vote and adjust the author's post karma atomically.
    pub async fn insert_post_vote(
        &self,
        model: post_vote::ActiveModel,
        author_id: &str,
        delta: i64,
    ) -> AppResult<()> {
        let author_id = author_id.to_string();
        self.db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    PostVote::insert(model).exec(txn).await?;
                    apply_post_karma(txn, &author_id, delta).await
                })
            })
            .await
            .map_err(map_vote_txn_err)
    }

    /// Switch a post vote's type and adjust the author's post karma
    /// atomically.
    pub async fn update_post_vote_type(
        &self,
        vote: post_vote::Model,
        new_type: VoteType,
        author_id: &str,
        delta: i64,
    ) -> AppResult<()> {
        let author_id = author_id.to_string();
        self.db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    let mut model: post_vote::ActiveModel = vote.into();
                    model.vote_type = Set(new_type);
                    model.update(txn).await?;
                    apply_post_karma(txn, &author_id, delta).await
                })
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post vote and adjust the author's post karma atomically.
    pub async fn delete_post_vote(
        &self,
        vote: post_vote::Model,
        author_id: &str,
        delta: i64,
    ) -> AppResult<()> {
        let author_id = author_id.to_string();
        self.db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    vote.delete(txn).await?;
                    apply_post_karma(txn, &author_id, delta).await
                })
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a post's votes of the given type.
    pub async fn count_post_votes(&self, post_id: &str, vote_type: VoteType) -> AppResult<u64> {
        PostVote::find()
            .filter(post_vote::Column::PostId.eq(post_id))
            .filter(post_vote::Column::VoteType.eq(vote_type))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Comment votes ==========

    /// Find a user's vote on a comment.
    pub async fn find_comment_vote(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> AppResult<Option<comment_vote::Model>> {
        CommentVote::find()
            .filter(comment_vote::Column::UserId.eq(user_id))
            .filter(comment_vote::Column::CommentId.eq(comment_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a comment vote and adjust the author's comment karma
    /// atomically.
    pub async fn insert_comment_vote(
        &self,
        model: comment_vote::ActiveModel,
        author_id: &str,
        delta: i64,
    ) -> AppResult<()> {
        let author_id = author_id.to_string();
        self.db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    CommentVote::insert(model).exec(txn).await?;
                    apply_comment_karma(txn, &author_id, delta).await
                })
            })
            .await
            .map_err(map_vote_txn_err)
    }

    /// Switch a comment vote's type and adjust the author's comment karma
    /// atomically.
    pub async fn update_comment_vote_type(
        &self,
        vote: comment_vote::Model,
        new_type: VoteType,
        author_id: &str,
        delta: i64,
    ) -> AppResult<()> {
        let author_id = author_id.to_string();
        self.db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    let mut model: comment_vote::ActiveModel = vote.into();
                    model.vote_type = Set(new_type);
                    model.update(txn).await?;
                    apply_comment_karma(txn, &author_id, delta).await
                })
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment vote and adjust the author's comment karma
    /// atomically.
    pub async fn delete_comment_vote(
        &self,
        vote: comment_vote::Model,
        author_id: &str,
        delta: i64,
    ) -> AppResult<()> {
        let author_id = author_id.to_string();
        self.db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    vote.delete(txn).await?;
                    apply_comment_karma(txn, &author_id, delta).await
                })
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a comment's votes of the given type.
    pub async fn count_comment_votes(
        &self,
        comment_id: &str,
        vote_type: VoteType,
    ) -> AppResult<u64> {
        CommentVote::find()
            .filter(comment_vote::Column::CommentId.eq(comment_id))
            .filter(comment_vote::Column::VoteType.eq(vote_type))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Apply a relative post-karma delta at the store (`karma = karma + delta`).
async fn apply_post_karma<C: ConnectionTrait>(
    conn: &C,
    author_id: &str,
    delta: i64,
) -> Result<(), DbErr> {
    User::update_many()
        .col_expr(
            user::Column::PostKarma,
            Expr::col(user::Column::PostKarma).add(delta),
        )
        .filter(user::Column::Id.eq(author_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Apply a relative comment-karma delta at the store.
async fn apply_comment_karma<C: ConnectionTrait>(
    conn: &C,
    author_id: &str,
    delta: i64,
) -> Result<(), DbErr> {
    User::update_many()
        .col_expr(
            user::Column::CommentKarma,
            Expr::col(user::Column::CommentKarma).add(delta),
        )
        .filter(user::Column::Id.eq(author_id))
        .exec(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_post_vote(
        id: &str,
        user_id: &str,
        post_id: &str,
        vote_type: VoteType,
    ) -> post_vote::Model {
        post_vote::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            vote_type,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_vote_found() {
        let vote = create_test_post_vote("v1", "user1", "post1", VoteType::Up);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let found = repo.find_post_vote("user1", "post1").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().vote_type, VoteType::Up);
    }

    #[tokio::test]
    async fn test_find_post_vote_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_vote::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let found = repo.find_post_vote("user1", "post1").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_post_vote_runs_row_and_counter_in_one_transaction() {
        let vote = create_test_post_vote("v1", "user1", "post1", VoteType::Up);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    // DELETE of the vote row
                    sea_orm::MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    // relative karma UPDATE
                    sea_orm::MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        repo.delete_post_vote(vote, "author1", -1).await.unwrap();
    }
}
