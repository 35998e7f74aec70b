use crate::{
    AppState,
    auth::{self, AuthUser},
    error::AppError,
    models::{Credentials, PostForm, PostWithAuthor},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;

// --- Auth Handlers ---

/// register_form
///
/// [Public Route] Placeholder for the registration form; rendering is the
/// presentation layer's concern, so this only confirms the route exists.
#[utoipa::path(
    get,
    path = "/auth/register",
    responses((status = 200, description = "Registration form"))
)]
pub async fn register_form() -> StatusCode {
    StatusCode::OK
}

/// register
///
/// [Public Route] Creates a new account and sends the client to the login
/// form. Validation failures and duplicate usernames come back as 400 with
/// the message the form should flash.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = Credentials,
    responses(
        (status = 303, description = "Registered, continue to login"),
        (status = 400, description = "Missing field or duplicate username")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Redirect, AppError> {
    let user_id = auth::register(state.repo.as_ref(), &payload.username, &payload.password).await?;
    tracing::info!(user_id, "registered new user");
    Ok(Redirect::to("/auth/login"))
}

/// login_form
///
/// [Public Route] Placeholder for the login form.
#[utoipa::path(
    get,
    path = "/auth/login",
    responses((status = 200, description = "Login form"))
)]
pub async fn login_form() -> StatusCode {
    StatusCode::OK
}

/// login
///
/// [Public Route] Verifies credentials, starts a session (clearing any prior
/// one), and redirects to the index. Failures are filtered through the
/// login-error policy so that, by default, unknown usernames and wrong
/// passwords are indistinguishable.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = Credentials,
    responses(
        (status = 303, description = "Session started, continue to index"),
        (status = 400, description = "Incorrect credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<Credentials>,
) -> Result<(CookieJar, Redirect), AppError> {
    let user = auth::authenticate(state.repo.as_ref(), &payload.username, &payload.password)
        .await
        .map_err(|e| auth::apply_login_policy(e, &state.config))?;

    let jar = auth::start_session(&state.config, jar, user.id)?;
    tracing::info!(user_id = user.id, "session started");
    Ok((jar, Redirect::to("/")))
}

/// logout
///
/// [Public Route] Clears the session cookie and redirects to the index.
/// Safe to call without a session.
#[utoipa::path(
    get,
    path = "/auth/logout",
    responses((status = 303, description = "Session cleared"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (auth::end_session(jar), Redirect::to("/"))
}

// --- Blog Handlers ---

/// index
///
/// [Public Route] Lists every post joined with its author's username, newest
/// first. Anonymous read access; no identity is resolved.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All posts, newest first", body = [PostWithAuthor]))
)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<PostWithAuthor>>, AppError> {
    let posts = state.repo.list_posts().await?;
    Ok(Json(posts))
}

/// post_detail
///
/// [Public Route] A single post by id, readable without identity: viewing a
/// post carries no edit intent, so the ownership gate is bypassed here.
#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostWithAuthor),
        (status = 404, description = "No such post")
    )
)]
pub async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostWithAuthor>, AppError> {
    let post = state.repo.get_post(id).await?;
    Ok(Json(post))
}

/// create_form
///
/// [Authenticated Route] Placeholder for the post composition form.
#[utoipa::path(
    get,
    path = "/create",
    responses((status = 200, description = "Create form"))
)]
pub async fn create_form(_user: AuthUser) -> StatusCode {
    StatusCode::OK
}

/// create_post
///
/// [Authenticated Route] Creates a post owned by the logged-in user. The
/// author id comes from the resolved session, never from the payload.
#[utoipa::path(
    post,
    path = "/create",
    request_body = PostForm,
    responses(
        (status = 303, description = "Created, continue to index"),
        (status = 400, description = "Title is required")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PostForm>,
) -> Result<Redirect, AppError> {
    let post_id = state
        .repo
        .create_post(&payload.title, &payload.body, user.id)
        .await?;
    tracing::info!(post_id, author_id = user.id, "created post");
    Ok(Redirect::to("/"))
}

/// edit_post
///
/// [Authenticated Route] Fetches a post for editing (form prefill). The
/// lookup runs before the ownership check, so a missing post is a 404 and a
/// foreign post is a 403.
#[utoipa::path(
    get,
    path = "/{id}/update",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post, owned by the caller", body = PostWithAuthor),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn edit_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostWithAuthor>, AppError> {
    let post = state.repo.get_post(id).await?;
    auth::require_owner(&user, &post)?;
    Ok(Json(post))
}

/// update_post
///
/// [Authenticated Route] Rewrites the title and body of the caller's own
/// post. Lookup first (404), then ownership (403), then the single-statement
/// update.
#[utoipa::path(
    post,
    path = "/{id}/update",
    params(("id" = i64, Path, description = "Post id")),
    request_body = PostForm,
    responses(
        (status = 303, description = "Updated, continue to index"),
        (status = 400, description = "Title is required"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PostForm>,
) -> Result<Redirect, AppError> {
    let post = state.repo.get_post(id).await?;
    auth::require_owner(&user, &post)?;

    state.repo.update_post(id, &payload.title, &payload.body).await?;
    tracing::info!(post_id = id, author_id = user.id, "updated post");
    Ok(Redirect::to("/"))
}

/// delete_post
///
/// [Authenticated Route] Deletes the caller's own post, with the same
/// lookup-then-ownership gate as update.
#[utoipa::path(
    post,
    path = "/{id}/delete",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 303, description = "Deleted, continue to index"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let post = state.repo.get_post(id).await?;
    auth::require_owner(&user, &post)?;

    state.repo.delete_post(id).await?;
    tracing::info!(post_id = id, author_id = user.id, "deleted post");
    Ok(Redirect::to("/"))
}
