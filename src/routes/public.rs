use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints accessible to any client, anonymous or logged in: the post
/// listing and detail reads, plus the account endpoints that establish or
/// tear down identity. None of these resolve a session before running.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness endpoint for monitoring and load
        // balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET / — every post, newest first, joined with author usernames.
        .route("/", get(handlers::index))
        // GET /{id} — single post, public read (no edit intent, no
        // ownership check).
        .route("/{id}", get(handlers::post_detail))
        // GET+POST /auth/register — account creation.
        .route(
            "/auth/register",
            get(handlers::register_form).post(handlers::register),
        )
        // GET+POST /auth/login — credential verification and session start.
        .route(
            "/auth/login",
            get(handlers::login_form).post(handlers::login),
        )
        // GET /auth/logout — clears the session cookie. Deliberately public:
        // logging out without a session is a no-op, not an error.
        .route("/auth/logout", get(handlers::logout))
}
