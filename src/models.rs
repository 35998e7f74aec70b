use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A registered account from the `user` table. Created at registration and
/// immutable thereafter; accounts are never deleted by this application.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,

    /// Salted Argon2 hash of the password. Maps the SQL column `password`;
    /// the plaintext is never stored, and the hash is never serialized to
    /// clients.
    #[sqlx(rename = "password")]
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// PostWithAuthor
///
/// A post from the `post` table joined with its author's username, the shape
/// every read path returns. The join is performed at the store boundary so
/// handlers never see raw rows. Posts are mutated and deleted only by their
/// author; `created` is set from the server clock at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct PostWithAuthor {
    pub id: i64,
    pub author_id: i64,
    pub username: String,
    pub created: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

// --- Request Payloads (Input Schemas) ---

/// Credentials
///
/// Input payload shared by the registration and login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// PostForm
///
/// Input payload for creating or updating a post. The title is required
/// (validated at the repository boundary); the body defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostForm {
    pub title: String,
    #[serde(default)]
    pub body: String,
}
