use chrono::{Duration, Utc};
use inklet::{
    error::AppError,
    repository::{Repository, SqliteRepository},
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

// --- Test Context and Setup ---

/// Opens a fresh in-memory database and applies the schema. A single
/// connection keeps the whole test on one memory database.
async fn setup() -> (SqliteRepository, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    let repo = SqliteRepository::new(pool.clone());
    repo.init_schema().await.expect("Failed to apply schema");
    (repo, pool)
}

async fn post_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn user_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await
        .unwrap()
}

// --- User Tests ---

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (repo, pool) = setup().await;

    let first = repo.create_user("alice", "hash-one").await;
    assert!(first.is_ok());

    let second = repo.create_user("alice", "hash-two").await;
    assert!(
        matches!(second, Err(AppError::DuplicateUsername(ref name)) if name == "alice"),
        "second registration must fail with DuplicateUsername, got {:?}",
        second
    );

    assert_eq!(user_count(&pool).await, 1, "the losing insert must not write a row");
}

#[tokio::test]
async fn test_user_lookup_roundtrip() {
    let (repo, _pool) = setup().await;

    let id = repo.create_user("bob", "some-hash").await.unwrap();

    let by_name = repo.find_user_by_username("bob").await.unwrap();
    assert_eq!(by_name.as_ref().map(|u| u.id), Some(id));

    let by_id = repo.find_user(id).await.unwrap();
    assert_eq!(by_id.map(|u| u.username), Some("bob".to_string()));

    assert!(repo.find_user_by_username("nobody").await.unwrap().is_none());
    assert!(repo.find_user(9999).await.unwrap().is_none());
}

// --- Post Tests ---

#[tokio::test]
async fn test_create_post_requires_title() {
    let (repo, pool) = setup().await;
    let author = repo.create_user("alice", "hash").await.unwrap();

    let result = repo.create_post("", "some body", author).await;
    assert!(matches!(result, Err(AppError::MissingField("Title"))));
    assert_eq!(post_count(&pool).await, 0, "failed create must not write a row");
}

#[tokio::test]
async fn test_posts_ordered_newest_first() {
    let (repo, pool) = setup().await;
    let author = repo.create_user("alice", "hash").await.unwrap();

    // Seed three posts at t1 < t2 < t3 with explicit timestamps so the
    // ordering assertion does not depend on insert timing.
    let t3 = Utc::now();
    let t2 = t3 - Duration::minutes(1);
    let t1 = t3 - Duration::minutes(2);
    for (title, created) in [("first", t1), ("second", t2), ("third", t3)] {
        sqlx::query("INSERT INTO post (title, body, created, author_id) VALUES (?, ?, ?, ?)")
            .bind(title)
            .bind("")
            .bind(created)
            .bind(author)
            .execute(&pool)
            .await
            .unwrap();
    }

    let posts = repo.list_posts().await.unwrap();
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_created_is_always_set_by_the_store() {
    let (repo, pool) = setup().await;
    let author = repo.create_user("alice", "hash").await.unwrap();

    // The schema carries no default for `created`; every insert path must
    // bind it explicitly. An insert that omits it fails outright instead of
    // writing a timestamp in some other format.
    let bare = sqlx::query("INSERT INTO post (title, body, author_id) VALUES (?, ?, ?)")
        .bind("No timestamp")
        .bind("")
        .bind(author)
        .execute(&pool)
        .await;
    assert!(bare.is_err(), "insert without created must violate NOT NULL");

    // The store binds the server clock, and the stored value sorts against
    // explicitly seeded rows.
    let before = Utc::now() - Duration::seconds(1);
    let id = repo.create_post("Fresh", "", author).await.unwrap();
    let post = repo.get_post(id).await.unwrap();
    assert!(post.created >= before && post.created <= Utc::now());

    sqlx::query("INSERT INTO post (title, body, created, author_id) VALUES (?, ?, ?, ?)")
        .bind("Older")
        .bind("")
        .bind(before - Duration::hours(1))
        .bind(author)
        .execute(&pool)
        .await
        .unwrap();

    let posts = repo.list_posts().await.unwrap();
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Fresh", "Older"]);
}

#[tokio::test]
async fn test_list_joins_author_username() {
    let (repo, _pool) = setup().await;
    let author = repo.create_user("carol", "hash").await.unwrap();
    repo.create_post("Hello", "World", author).await.unwrap();

    let posts = repo.list_posts().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].username, "carol");
    assert_eq!(posts[0].author_id, author);
    assert_eq!(posts[0].body, "World");
}

#[tokio::test]
async fn test_get_post_not_found_names_the_id() {
    let (repo, _pool) = setup().await;

    let result = repo.get_post(42).await;
    match result {
        Err(err @ AppError::NotFound(42)) => {
            assert!(err.to_string().contains("42"));
        }
        other => panic!("expected NotFound(42), got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_post() {
    let (repo, _pool) = setup().await;
    let author = repo.create_user("alice", "hash").await.unwrap();
    let id = repo.create_post("Old title", "old body", author).await.unwrap();

    repo.update_post(id, "New title", "new body").await.unwrap();

    let post = repo.get_post(id).await.unwrap();
    assert_eq!(post.title, "New title");
    assert_eq!(post.body, "new body");

    // Empty title is rejected without touching the row.
    let result = repo.update_post(id, "", "whatever").await;
    assert!(matches!(result, Err(AppError::MissingField("Title"))));
    assert_eq!(repo.get_post(id).await.unwrap().title, "New title");

    // Absent id fails with NotFound.
    let result = repo.update_post(999, "Title", "body").await;
    assert!(matches!(result, Err(AppError::NotFound(999))));
}

#[tokio::test]
async fn test_delete_post() {
    let (repo, pool) = setup().await;
    let author = repo.create_user("alice", "hash").await.unwrap();
    let keep = repo.create_post("Keep", "", author).await.unwrap();
    let gone = repo.create_post("Gone", "", author).await.unwrap();

    repo.delete_post(gone).await.unwrap();
    assert_eq!(post_count(&pool).await, 1);

    // Deleting a nonexistent id fails and affects nothing.
    let result = repo.delete_post(gone).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(post_count(&pool).await, 1);

    assert!(repo.get_post(keep).await.is_ok());
}
