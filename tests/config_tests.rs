use inklet::config::{AppConfig, Env};
use serial_test::serial;
use std::{env, panic};

/// Runs a test body and restores the named environment variables afterward,
/// whether the body passes or panics.
fn run_with_env<T, R>(test: T, cleanup_vars: Vec<&'static str>) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

#[test]
#[serial]
fn test_defaults_are_local_and_unified() {
    run_with_env(
        || {
            unsafe {
                env::remove_var("APP_ENV");
                env::remove_var("DATABASE_URL");
                env::remove_var("SESSION_SECRET");
                env::remove_var("LOGIN_ERRORS");
            }
            let config = AppConfig::load();
            assert_eq!(config.env, Env::Local);
            assert!(!config.distinguish_login_errors);
            assert_eq!(config.database_url, "sqlite://inklet.db");
        },
        vec!["APP_ENV", "DATABASE_URL", "SESSION_SECRET", "LOGIN_ERRORS"],
    );
}

#[test]
#[serial]
fn test_login_error_policy_is_configurable() {
    run_with_env(
        || {
            unsafe {
                env::remove_var("APP_ENV");
                env::set_var("LOGIN_ERRORS", "distinct");
            }
            let config = AppConfig::load();
            assert!(config.distinguish_login_errors);
        },
        vec!["APP_ENV", "LOGIN_ERRORS"],
    );
}

#[test]
#[serial]
fn test_production_fails_fast_without_secrets() {
    run_with_env(
        || {
            // Missing SESSION_SECRET in production must refuse to start.
            let result = panic::catch_unwind(|| {
                unsafe {
                    env::set_var("APP_ENV", "production");
                    env::remove_var("SESSION_SECRET");
                    env::set_var("DATABASE_URL", "sqlite://prod.db");
                }
                AppConfig::load()
            });
            assert!(result.is_err(), "production load without SESSION_SECRET must panic");
        },
        vec!["APP_ENV", "SESSION_SECRET", "DATABASE_URL"],
    );
}
