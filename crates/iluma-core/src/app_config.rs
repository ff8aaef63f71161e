use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Credentials for the order-notification chat. Present only when both the
/// bot token and the chat id are configured.
#[derive(Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_url", &self.api_url)
            .field("bot_token", &"[redacted]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub facets_path: PathBuf,
    pub backend_timeout_secs: u64,
    pub backend_page_size: u32,
    pub backend_max_retries: u32,
    pub backend_retry_backoff_ms: u64,
    pub user_agent: String,
    pub category_cache_ttl_secs: u64,
    pub product_cache_ttl_secs: u64,
    pub telegram: Option<TelegramConfig>,
    pub site_name: String,
    pub pickup_address: String,
    pub order_rate_limit_per_min: usize,
}

impl AppConfig {
    #[must_use]
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    #[must_use]
    pub fn category_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.category_cache_ttl_secs)
    }

    #[must_use]
    pub fn product_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.product_cache_ttl_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend_url", &self.backend_url)
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("facets_path", &self.facets_path)
            .field("backend_timeout_secs", &self.backend_timeout_secs)
            .field("backend_page_size", &self.backend_page_size)
            .field("backend_max_retries", &self.backend_max_retries)
            .field("backend_retry_backoff_ms", &self.backend_retry_backoff_ms)
            .field("user_agent", &self.user_agent)
            .field("category_cache_ttl_secs", &self.category_cache_ttl_secs)
            .field("product_cache_ttl_secs", &self.product_cache_ttl_secs)
            .field("telegram", &self.telegram)
            .field("site_name", &self.site_name)
            .field("pickup_address", &self.pickup_address)
            .field("order_rate_limit_per_min", &self.order_rate_limit_per_min)
            .finish()
    }
}
