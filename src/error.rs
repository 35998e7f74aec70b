use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

/// AppError
///
/// The single error taxonomy for the whole application. Every fallible
/// operation in the auth and repository layers returns this type, and
/// handlers propagate it with `?`. The `IntoResponse` impl below is the one
/// place where domain errors are mapped to HTTP outcomes, so route code
/// never hand-rolls status codes.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required form field was empty. The field name is capitalized for
    /// direct display, e.g. "Title is required."
    #[error("{0} is required.")]
    MissingField(&'static str),

    /// Registration attempted with a username that already exists. Also
    /// produced when two concurrent registrations race past the pre-check
    /// and the UNIQUE constraint rejects the second insert.
    #[error("User {0} is already registered.")]
    DuplicateUsername(String),

    /// Login with a username that has no user record.
    #[error("Incorrect username.")]
    UnknownUser,

    /// Login where the password hash comparison failed.
    #[error("Incorrect password.")]
    BadPassword,

    /// Unified login failure. The login handler collapses `UnknownUser` and
    /// `BadPassword` into this variant unless the config opts into
    /// distinguishable errors, so the response cannot be used to enumerate
    /// registered usernames.
    #[error("Incorrect username or password.")]
    BadCredentials,

    /// The request carried no resolvable session identity. Rendered as a
    /// redirect to the login page rather than a bare 401.
    #[error("Login required.")]
    AuthRequired,

    /// The resolved user is not the author of the post they tried to mutate.
    #[error("You are not the author of this post.")]
    Forbidden,

    /// No post with the given id. The identifier is included in the message.
    #[error("Post id {0} doesn't exist.")]
    NotFound(i64),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed")]
    Hash(argon2::password_hash::Error),

    #[error("session token error")]
    Token(#[from] jsonwebtoken::errors::Error),
}

// `password_hash::Error` does not implement `std::error::Error` on all
// feature sets, so the conversion is written out instead of `#[from]`.
impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AppError::Hash(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Validation and credential failures re-render the form with a
            // flash message; headless, that is a 400 with the message body.
            AppError::MissingField(_)
            | AppError::DuplicateUsername(_)
            | AppError::UnknownUser
            | AppError::BadPassword
            | AppError::BadCredentials => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),

            // Anonymous access to a protected route: send the client to the
            // login form, mirroring the original `login_required` behavior.
            AppError::AuthRequired => Redirect::to("/auth/login").into_response(),

            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),

            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),

            // Infrastructure failures: log the detail, return a generic body.
            AppError::Database(ref e) => {
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
            AppError::Hash(ref e) => {
                tracing::error!("password hash error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
            AppError::Token(ref e) => {
                tracing::error!("session token error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
