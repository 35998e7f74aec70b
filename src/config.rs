use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state, loaded once at startup
/// and immutable thereafter. It is pulled into the application state via
/// `FromRef` so extractors and handlers can borrow exactly the pieces they
/// need.
#[derive(Clone)]
pub struct AppConfig {
    // SQLite connection string, e.g. "sqlite://inklet.db".
    pub database_url: String,
    // Secret used to sign and validate session tokens.
    pub session_secret: String,
    // Lifetime of an issued session token, in seconds.
    pub session_ttl_secs: u64,
    // Policy switch for login failures: when false (the default), unknown
    // usernames and wrong passwords produce the same generic error so the
    // login form cannot be used to enumerate accounts. The original
    // implementation distinguished them; opt back in with
    // LOGIN_ERRORS=distinct.
    pub distinguish_login_errors: bool,
    // Runtime environment marker. Controls log format and cookie security.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, switching between development conveniences
/// (pretty logs, fallback secrets) and production behavior (JSON logs,
/// mandatory secrets, Secure cookies).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Provides a safe, non-panicking config instance for test setup, without
    /// requiring any environment variables.
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            session_secret: "dev-session-secret-not-for-production".to_string(),
            session_ttl_secs: 60 * 60 * 24,
            distinguish_login_errors: false,
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// The canonical function for initializing configuration at startup.
    /// Reads all parameters from environment variables and fails fast.
    ///
    /// # Panics
    /// Panics if a variable required for the current runtime environment is
    /// missing, so the server never starts with an incomplete or insecure
    /// configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The signing secret is mandatory in production; local development
        // gets a fixed fallback.
        let session_secret = match env {
            Env::Production => env::var("SESSION_SECRET")
                .expect("FATAL: SESSION_SECRET must be set in production."),
            _ => env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "dev-session-secret-not-for-production".to_string()),
        };

        let database_url = match env {
            Env::Production => {
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in production")
            }
            _ => env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://inklet.db".to_string()),
        };

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60 * 60 * 24);

        let distinguish_login_errors = env::var("LOGIN_ERRORS")
            .map(|v| v == "distinct")
            .unwrap_or(false);

        Self {
            database_url,
            session_secret,
            session_ttl_secs,
            distinguish_login_errors,
            env,
        }
    }
}
