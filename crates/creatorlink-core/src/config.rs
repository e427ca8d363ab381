use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Base URL used in development when no explicit override is configured.
/// Points at the local dev server's proxy path rather than the API itself.
pub const DEV_PROXY_BASE_URL: &str = "http://localhost:5173/api";

/// Production API origin.
pub const PRODUCTION_BASE_URL: &str = "https://api.creatorlink.app";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let non_zero = |var: &str, value: u64| -> Result<u64, ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("CREATORLINK_ENV", "development"))?;
    let api_override = lookup("CREATORLINK_API_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let api_base_url = resolve_base_url(api_override.as_deref(), env);

    let log_level = or_default("CREATORLINK_LOG_LEVEL", "info");
    let request_timeout_secs = non_zero(
        "CREATORLINK_REQUEST_TIMEOUT_SECS",
        parse_u64("CREATORLINK_REQUEST_TIMEOUT_SECS", "30")?,
    )?;
    let poll_interval_secs = non_zero(
        "CREATORLINK_POLL_INTERVAL_SECS",
        parse_u64("CREATORLINK_POLL_INTERVAL_SECS", "5")?,
    )?;
    let poll_max_attempts = parse_u32("CREATORLINK_POLL_MAX_ATTEMPTS", "60")?;
    non_zero("CREATORLINK_POLL_MAX_ATTEMPTS", u64::from(poll_max_attempts))?;

    let login_path = or_default("CREATORLINK_LOGIN_PATH", "/login");
    let credentials_path = PathBuf::from(or_default(
        "CREATORLINK_CREDENTIALS_PATH",
        "./.creatorlink/credentials.json",
    ));
    let federated_token = lookup("CREATORLINK_FEDERATED_TOKEN")
        .ok()
        .filter(|v| !v.trim().is_empty());

    Ok(AppConfig {
        env,
        api_base_url,
        log_level,
        request_timeout_secs,
        poll_interval_secs,
        poll_max_attempts,
        login_path,
        credentials_path,
        federated_token,
    })
}

/// Picks the API base URL: explicit override, then the dev proxy outside
/// production, then the production origin.
#[must_use]
pub fn resolve_base_url(override_url: Option<&str>, env: Environment) -> String {
    if let Some(url) = override_url {
        return url.trim_end_matches('/').to_string();
    }
    match env {
        Environment::Development | Environment::Test => DEV_PROXY_BASE_URL.to_string(),
        Environment::Production => PRODUCTION_BASE_URL.to_string(),
    }
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CREATORLINK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
