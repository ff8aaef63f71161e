use crate::app_config::{AppConfig, Environment, TelegramConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
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

    let backend_url = require("ILUMA_BACKEND_URL")?
        .trim_end_matches('/')
        .to_string();

    let env = parse_environment(&or_default("ILUMA_ENV", "development"))?;

    let bind_addr = parse_addr("ILUMA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("ILUMA_LOG_LEVEL", "info");
    let facets_path = PathBuf::from(or_default("ILUMA_FACETS_PATH", "./config/facets.yaml"));

    let backend_timeout_secs = parse_u64("ILUMA_BACKEND_TIMEOUT_SECS", "10")?;
    let backend_page_size = parse_u32("ILUMA_BACKEND_PAGE_SIZE", "50")?;
    if backend_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ILUMA_BACKEND_PAGE_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let backend_max_retries = parse_u32("ILUMA_BACKEND_MAX_RETRIES", "1")?;
    let backend_retry_backoff_ms = parse_u64("ILUMA_BACKEND_RETRY_BACKOFF_MS", "250")?;
    let user_agent = or_default("ILUMA_USER_AGENT", "iluma-store/0.1 (storefront)");

    let category_cache_ttl_secs = parse_u64("ILUMA_CATEGORY_CACHE_TTL_SECS", "120")?;
    let product_cache_ttl_secs = parse_u64("ILUMA_PRODUCT_CACHE_TTL_SECS", "300")?;

    let telegram = match (
        optional("ILUMA_TELEGRAM_BOT_TOKEN"),
        optional("ILUMA_TELEGRAM_CHAT_ID"),
    ) {
        (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
            api_url: or_default("ILUMA_TELEGRAM_API_URL", "https://api.telegram.org")
                .trim_end_matches('/')
                .to_string(),
            bot_token,
            chat_id,
        }),
        _ => None,
    };

    let site_name = or_default("ILUMA_SITE_NAME", "iluma-store.ru");
    let pickup_address = or_default(
        "ILUMA_PICKUP_ADDRESS",
        "г. Москва, ул. Примерная, д. 123, офис 45",
    );
    let order_rate_limit_per_min = parse_usize("ILUMA_ORDER_RATE_LIMIT_PER_MIN", "30")?;

    Ok(AppConfig {
        backend_url,
        env,
        bind_addr,
        log_level,
        facets_path,
        backend_timeout_secs,
        backend_page_size,
        backend_max_retries,
        backend_retry_backoff_ms,
        user_agent,
        category_cache_ttl_secs,
        product_cache_ttl_secs,
        telegram,
        site_name,
        pickup_address,
        order_rate_limit_per_min,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ILUMA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
