use inklet::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{Repository, RepositoryState, SqliteRepository},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Asynchronous entry point: initializes configuration, logging, the SQLite
/// pool, and the HTTP server. Also exposes the one CLI command, `init-db`,
/// which destructively (re)creates the schema and exits.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading (fail-fast).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, with a sensible local default.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inklet=debug,tower_http=info,axum=trace".into());

    // 3. Log format follows the environment: pretty output for humans
    // locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database initialization. The database file is created on first run.
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("FATAL: invalid DATABASE_URL")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("FATAL: failed to open the SQLite database. Check DATABASE_URL.");

    let repo = Arc::new(SqliteRepository::new(pool)) as RepositoryState;

    // 5. CLI surface: `inklet init-db` drops and recreates the schema, then
    // exits. Destructive by contract.
    if std::env::args().nth(1).as_deref() == Some("init-db") {
        repo.init_schema()
            .await
            .expect("FATAL: schema initialization failed");
        println!("Initialized the database.");
        return;
    }

    // 6. Unified state assembly and server startup.
    let app_state = AppState { repo, config };
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("FATAL: failed to bind 0.0.0.0:3000");

    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API documentation available at http://localhost:3000/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("server error");
}
