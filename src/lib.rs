use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing segregation (public vs. authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Core state types for the application entry point (main.rs) and tests.
pub use config::AppConfig;
pub use error::AppError;
pub use repository::{RepositoryState, SqliteRepository};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the application from the
/// `#[utoipa::path]` handler annotations and the `ToSchema` models. Served
/// as JSON at `/api-docs/openapi.json`, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::index, handlers::post_detail,
        handlers::register_form, handlers::register,
        handlers::login_form, handlers::login, handlers::logout,
        handlers::create_form, handlers::create_post,
        handlers::edit_post, handlers::update_post, handlers::delete_post,
    ),
    components(
        schemas(
            models::PostWithAuthor, models::Credentials, models::PostForm,
        )
    ),
    tags(
        (name = "inklet", description = "Minimal multi-user blog API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding the services every request
/// needs: the persistence layer behind its trait object and the immutable
/// configuration. Shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: post CRUD and user lookups over the SQLite pool.
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow extractors (notably AuthUser) to pull individual components out of
// the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces a resolved session identity for the authenticated router. The
/// `AuthUser` extractor performs the cookie read, token validation, and user
/// lookup; if it rejects, the request never reaches the handler and the
/// client is redirected to the login form.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the full routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name used for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // API documentation.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no identity resolution.
        .merge(public::public_routes())
        // Authenticated routes: identity enforced by the middleware layer
        // before any handler logic runs.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers, outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Unique id per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Wrap the request/response lifecycle in a tracing span that
                // carries the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the request id to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the `TraceLayer` span so every log line for a request is
/// correlated by the generated x-request-id alongside the method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
