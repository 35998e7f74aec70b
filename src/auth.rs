use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::User,
    repository::{Repository, RepositoryState},
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

// --- Credential Store ---

/// register
///
/// Creates a new account. Validates that both fields are present, hashes the
/// password (the plaintext is never persisted), and delegates uniqueness
/// enforcement to the repository. Returns the new user id.
pub async fn register(
    repo: &dyn Repository,
    username: &str,
    password: &str,
) -> Result<i64, AppError> {
    if username.is_empty() {
        return Err(AppError::MissingField("Username"));
    }
    if password.is_empty() {
        return Err(AppError::MissingField("Password"));
    }

    let password_hash = hash_password(password)?;
    repo.create_user(username, &password_hash).await
}

/// authenticate
///
/// Verifies a username/password pair against the stored hash and returns the
/// full user record on success. Fails with `UnknownUser` when no such
/// account exists and `BadPassword` when verification fails; the login
/// handler decides whether those two are distinguishable to clients (see
/// `apply_login_policy`).
pub async fn authenticate(
    repo: &dyn Repository,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = repo
        .find_user_by_username(username)
        .await?
        .ok_or(AppError::UnknownUser)?;

    if !verify_password(password, &user.password_hash) {
        return Err(AppError::BadPassword);
    }
    Ok(user)
}

/// apply_login_policy
///
/// Collapses `UnknownUser` and `BadPassword` into the generic
/// `BadCredentials` unless the configuration explicitly opts into
/// distinguishable login errors. With the default (unified) policy, the
/// login response is identical for both failure modes, so it cannot be used
/// to enumerate registered usernames.
pub fn apply_login_policy(err: AppError, config: &AppConfig) -> AppError {
    match err {
        AppError::UnknownUser | AppError::BadPassword if !config.distinguish_login_errors => {
            AppError::BadCredentials
        }
        other => other,
    }
}

/// hash_password
///
/// Produces a salted Argon2 hash in PHC string format.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// verify_password
///
/// Checks a candidate password against a stored PHC hash. The comparison is
/// delegated to the Argon2 verifier; stored hashes that fail to parse count
/// as a failed verification rather than an internal error.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// --- Session Identity Resolver ---

/// Claims
///
/// Payload of the signed session token. The token is opaque to clients but
/// server-trusted: its signature is validated on every authenticated request
/// before the embedded user id is looked up.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the id of the logged-in user.
    pub sub: i64,
    /// Expiration time. Tokens past this instant are rejected.
    pub exp: usize,
    /// Issued-at time.
    pub iat: usize,
}

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// issue_token
///
/// Signs a fresh session token binding `user_id` for the configured TTL.
pub fn issue_token(config: &AppConfig, user_id: i64) -> Result<String, AppError> {
    let now = unix_now();
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + config.session_ttl_secs as usize,
    };
    let key = EncodingKey::from_secret(config.session_secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// start_session
///
/// Clears any existing session cookie, then issues and sets a fresh token
/// bound to `user_id` (clear-then-set, so stale identity never survives a
/// login). The cookie is HTTP-only and scoped to the whole site; in
/// production it is additionally marked Secure.
pub fn start_session(
    config: &AppConfig,
    jar: CookieJar,
    user_id: i64,
) -> Result<CookieJar, AppError> {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    let token = issue_token(config, user_id)?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.env == Env::Production);

    Ok(jar.add(cookie))
}

/// end_session
///
/// Clears the identity binding by removing the session cookie.
pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

// --- AuthUser Extractor ---

/// AuthUser
///
/// The resolved identity of an authenticated request: the session token was
/// present, its signature and expiry checked out, and the embedded user id
/// still maps to a row in the store. Handlers take this as an argument for
/// every operation that requires a logged-in user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's `FromRequestParts`, making `AuthUser` usable as a
/// function argument in any protected handler and as the guard inside the
/// authenticated-router middleware. Resolution happens once per request,
/// before any route logic:
///
/// 1. Read the session cookie.
/// 2. Validate the token signature and expiry.
/// 3. Look the user up in the store (a token for a deleted user resolves to
///    nothing).
///
/// Rejection: `AuthRequired`, rendered as a redirect to the login page. Any
/// malformed, tampered, or expired token is treated the same as an absent
/// one.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(AppError::AuthRequired)?;

        let key = DecodingKey::from_secret(config.session_secret.as_bytes());
        let token_data = decode::<Claims>(&token, &key, &Validation::default())
            .map_err(|_| AppError::AuthRequired)?;

        let user = repo
            .find_user(token_data.claims.sub)
            .await?
            .ok_or(AppError::AuthRequired)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}

// --- Authorization Gate ---

/// require_owner
///
/// The ownership check gating every post mutation: fails with `Forbidden`
/// unless the resolved user is the post's author. Public read paths simply
/// never call this; `NotFound` for a missing post is produced by the lookup
/// itself, before ownership is considered.
pub fn require_owner(user: &AuthUser, post: &crate::models::PostWithAuthor) -> Result<(), AppError> {
    if post.author_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}
