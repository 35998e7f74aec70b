use crate::{
    error::AppError,
    models::{PostWithAuthor, User},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// The schema applied by `init_schema`. Dropping and recreating both tables
/// is intentionally destructive, mirroring the `init-db` CLI contract.
const SCHEMA: &str = include_str!("../schema.sql");

/// Repository
///
/// The abstract contract for all persistence operations: post CRUD plus the
/// user lookups needed by the credential store and the session resolver.
/// Handlers interact with the data layer only through this trait, so tests
/// can substitute a mock without touching route logic.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Post Retrieval ---

    /// All posts joined with their author's username, newest first
    /// (`ORDER BY created DESC`).
    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, AppError>;

    /// A single post joined with its author. Fails with `NotFound` carrying
    /// the requested id.
    async fn get_post(&self, id: i64) -> Result<PostWithAuthor, AppError>;

    // --- Post Mutation (each a single-statement transaction) ---

    /// Inserts a post owned by `author_id` and returns the generated id.
    /// Fails with `MissingField` if the title is empty; nothing is written.
    async fn create_post(&self, title: &str, body: &str, author_id: i64)
    -> Result<i64, AppError>;

    /// Rewrites title and body of an existing post. `MissingField` on empty
    /// title, `NotFound` if the id is absent.
    async fn update_post(&self, id: i64, title: &str, body: &str) -> Result<(), AppError>;

    /// Deletes a post. `NotFound` if the id is absent; no other row is
    /// affected either way.
    async fn delete_post(&self, id: i64) -> Result<(), AppError>;

    // --- User / Auth ---

    /// Inserts a new user with an already-hashed password and returns the
    /// generated id. Fails with `DuplicateUsername` when the name is taken,
    /// including when a concurrent registration wins the race between the
    /// pre-check and the insert.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, AppError>;

    /// Looks a user up by username. `None` is a normal outcome (login with
    /// an unknown name), not an error.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Looks a user up by id, used by the session resolver. A token whose
    /// user has disappeared resolves to `None`.
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    // --- Schema ---

    /// Drops and recreates the schema. Destructive.
    async fn init_schema(&self) -> Result<(), AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The concrete implementation of `Repository`, backed by an embedded
/// file-backed SQLite database. SQLite's single-writer semantics provide all
/// the write serialization this application needs; each operation below is
/// one statement and therefore atomic on its own.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a new repository instance using the initialized connection
    /// pool. The pool hands one connection to each request and returns it on
    /// every exit path.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, AppError> {
        let posts = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT p.id, p.author_id, u.username, p.created, p.title, p.body
            FROM post p
            JOIN user u ON p.author_id = u.id
            ORDER BY p.created DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<PostWithAuthor, AppError> {
        sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT p.id, p.author_id, u.username, p.created, p.title, p.body
            FROM post p
            JOIN user u ON p.author_id = u.id
            WHERE p.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound(id))
    }

    async fn create_post(
        &self,
        title: &str,
        body: &str,
        author_id: i64,
    ) -> Result<i64, AppError> {
        if title.is_empty() {
            return Err(AppError::MissingField("Title"));
        }

        // `created` is bound from the server clock rather than left to the
        // column default, so ordering is well-defined at sub-second scale.
        let result = sqlx::query(
            "INSERT INTO post (title, body, created, author_id) VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(body)
        .bind(Utc::now())
        .bind(author_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update_post(&self, id: i64, title: &str, body: &str) -> Result<(), AppError> {
        if title.is_empty() {
            return Err(AppError::MissingField("Title"));
        }

        let result = sqlx::query("UPDATE post SET title = ?, body = ? WHERE id = ?")
            .bind(title)
            .bind(body)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_post(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM post WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(id));
        }
        Ok(())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, AppError> {
        // Check-then-insert. The pre-check gives the common case a clean
        // error; the UNIQUE constraint is the backstop for the race where
        // two registrations pass the check concurrently, and its violation
        // must still surface as DuplicateUsername.
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM user WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::DuplicateUsername(username.to_string()));
        }

        let result = sqlx::query("INSERT INTO user (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::DuplicateUsername(username.to_string())
                }
                _ => AppError::from(e),
            })?;

        Ok(result.last_insert_rowid())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM user WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, username, password FROM user WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn init_schema(&self) -> Result<(), AppError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}
