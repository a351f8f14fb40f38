//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `palaver_test`)
//!   `TEST_DB_PASSWORD` (default: `palaver_test`)
//!   `TEST_DB_NAME` (default: `palaver_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use palaver_db::entities::{VoteType, post, post_vote, user};
use palaver_db::repositories::{PostRepository, UserRepository, VoteRepository};
use palaver_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;
use sea_orm_migration::MigratorTrait;

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.unwrap();
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

/// The central concurrency contract: two concurrent votes on the same
/// author's content must both land, and the author's counter must equal
/// the signed sum of the live vote rows afterwards.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_upvotes_never_lose_a_karma_update() {
    let db = TestDatabase::create_unique().await.unwrap();
    palaver_db::migrations::Migrator::up(db.connection(), None)
        .await
        .unwrap();

    let conn = db.connection_arc();
    let user_repo = UserRepository::new(Arc::clone(&conn));
    let post_repo = PostRepository::new(Arc::clone(&conn));
    let vote_repo = VoteRepository::new(Arc::clone(&conn));

    for (id, email) in [
        ("author", "author@example.com"),
        ("voter_a", "a@example.com"),
        ("voter_b", "b@example.com"),
    ] {
        user_repo
            .create(user::ActiveModel {
                id: Set(id.to_string()),
                username: Set(id.to_string()),
                email: Set(email.to_string()),
                bio: Set(String::new()),
                post_karma: Set(0),
                comment_karma: Set(0),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    post_repo
        .create(post::ActiveModel {
            id: Set("p1".to_string()),
            author_id: Set("author".to_string()),
            community_id: Set(None),
            title: Set("A post".to_string()),
            body: Set("Body".to_string()),
            kind: Set(post::PostKind::Text),
            link: Set(None),
            status: Set(post::PostStatus::Accepted),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let vote = |vote_id: &str, voter: &str| post_vote::ActiveModel {
        id: Set(vote_id.to_string()),
        user_id: Set(voter.to_string()),
        post_id: Set("p1".to_string()),
        vote_type: Set(VoteType::Up),
        created_at: Set(Utc::now().into()),
    };

    let (a, b) = tokio::join!(
        vote_repo.insert_post_vote(vote("v1", "voter_a"), "author", 1),
        vote_repo.insert_post_vote(vote("v2", "voter_b"), "author", 1),
    );
    a.unwrap();
    b.unwrap();

    let author = user_repo.get_by_id("author").await.unwrap();
    assert_eq!(author.post_karma, 2);

    let upvotes = vote_repo.count_post_votes("p1", VoteType::Up).await.unwrap();
    assert_eq!(upvotes, 2);

    db.drop_database().await.unwrap();
}

/// A duplicate concurrent create must fail on the unique index and leave
/// the counter untouched by the losing transaction.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_vote_insert_fails_atomically() {
    let db = TestDatabase::create_unique().await.unwrap();
    palaver_db::migrations::Migrator::up(db.connection(), None)
        .await
        .unwrap();

    let conn = db.connection_arc();
    let user_repo = UserRepository::new(Arc::clone(&conn));
    let post_repo = PostRepository::new(Arc::clone(&conn));
    let vote_repo = VoteRepository::new(Arc::clone(&conn));

    for (id, email) in [("author", "author@example.com"), ("voter", "v@example.com")] {
        user_repo
            .create(user::ActiveModel {
                id: Set(id.to_string()),
                username: Set(id.to_string()),
                email: Set(email.to_string()),
                bio: Set(String::new()),
                post_karma: Set(0),
                comment_karma: Set(0),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    post_repo
        .create(post::ActiveModel {
            id: Set("p1".to_string()),
            author_id: Set("author".to_string()),
            community_id: Set(None),
            title: Set("A post".to_string()),
            body: Set("Body".to_string()),
            kind: Set(post::PostKind::Text),
            link: Set(None),
            status: Set(post::PostStatus::Accepted),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let vote = |vote_id: &str| post_vote::ActiveModel {
        id: Set(vote_id.to_string()),
        user_id: Set("voter".to_string()),
        post_id: Set("p1".to_string()),
        vote_type: Set(VoteType::Up),
        created_at: Set(Utc::now().into()),
    };

    vote_repo
        .insert_post_vote(vote("v1"), "author", 1)
        .await
        .unwrap();
    let second = vote_repo.insert_post_vote(vote("v2"), "author", 1).await;
    assert!(matches!(
        second,
        Err(palaver_common::AppError::Duplicate(_))
    ));

    let author = user_repo.get_by_id("author").await.unwrap();
    assert_eq!(author.post_karma, 1);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
