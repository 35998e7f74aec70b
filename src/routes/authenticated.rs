use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route here requires a resolved session identity: the router is
/// wrapped in the auth middleware layer at assembly time, and each handler
/// additionally takes `AuthUser` as an argument. Mutations on existing posts
/// enforce the ownership gate inside the handler, after the post lookup.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET+POST /create — compose and submit a new post. The author id is
        // always the session's user, never client-supplied.
        .route(
            "/create",
            get(handlers::create_form).post(handlers::create_post),
        )
        // GET+POST /{id}/update — owner-only edit of title and body.
        .route(
            "/{id}/update",
            get(handlers::edit_post).post(handlers::update_post),
        )
        // POST /{id}/delete — owner-only removal.
        .route("/{id}/delete", post(handlers::delete_post))
}
