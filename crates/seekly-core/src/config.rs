//! Environment-variable configuration loading.
//!
//! Every variable has a default; the service starts with an empty
//! environment. Parsing is decoupled from `std::env` so tests can drive it
//! with a plain `HashMap` lookup instead of mutating process state.

use crate::app_config::{AppConfig, Environment};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but unparseable.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but unparseable.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function. This is the core parsing/validation logic, testable with a pure
/// lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("SEEKLY_ENV", "development"));
    let bind_addr = parse_addr("SEEKLY_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("SEEKLY_LOG_LEVEL", "info");

    let fetch_timeout_secs = parse_u64("SEEKLY_FETCH_TIMEOUT_SECS", "30")?;
    let render_timeout_secs = parse_u64("SEEKLY_RENDER_TIMEOUT_SECS", "20")?;
    let render_concurrency = parse_usize("SEEKLY_RENDER_CONCURRENCY", "2")?;
    let max_pages = parse_u32("SEEKLY_MAX_PAGES", "3")?;
    let page_delay_ms = parse_u64("SEEKLY_PAGE_DELAY_MS", "500")?;
    let user_agent = or_default(
        "SEEKLY_USER_AGENT",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    );

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        fetch_timeout_secs,
        render_timeout_secs,
        render_concurrency,
        max_pages,
        page_delay_ms,
        user_agent,
    })
}

fn parse_environment(raw: &str) -> Environment {
    if raw.eq_ignore_ascii_case("production") {
        Environment::Production
    } else {
        Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, std::env::VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(std::env::VarError::NotPresent)
        }
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let map = HashMap::new();
        let config = build_app_config(lookup_from(&map)).expect("defaults parse");
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.page_delay_ms, 500);
        assert_eq!(config.render_concurrency, 2);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn overrides_are_honored() {
        let map = HashMap::from([
            ("SEEKLY_ENV", "production"),
            ("SEEKLY_BIND_ADDR", "127.0.0.1:9001"),
            ("SEEKLY_MAX_PAGES", "7"),
            ("SEEKLY_USER_AGENT", "seekly-test/0.1"),
        ]);
        let config = build_app_config(lookup_from(&map)).expect("overrides parse");
        assert_eq!(config.env, Environment::Production);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9001");
        assert_eq!(config.max_pages, 7);
        assert_eq!(config.user_agent, "seekly-test/0.1");
    }

    #[test]
    fn invalid_numeric_value_is_an_error() {
        let map = HashMap::from([("SEEKLY_MAX_PAGES", "three")]);
        let err = build_app_config(lookup_from(&map)).expect_err("bad value rejected");
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "SEEKLY_MAX_PAGES"));
    }

    #[test]
    fn unknown_environment_falls_back_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
        assert_eq!(parse_environment("PRODUCTION"), Environment::Production);
    }
}
