//! HTTP client for the upstream product and order API.

mod fetch_all;
mod orders;

use std::time::Duration;

use iluma_core::{AppConfig, Category, RawProduct};
use reqwest::Client;

use crate::error::BackendError;
use crate::retry::retry_with_backoff;
use crate::types::parse_category_response;

/// Maximum number of pages to fetch for one category before returning an
/// error. Guards against a backend that ignores `skip`.
///
/// Each page request may be retried up to `max_retries` times, so the
/// worst-case request count is `MAX_PAGES * (1 + max_retries)`.
pub(super) const MAX_PAGES: usize = 200;

/// Client for `GET /products/{category}` and `POST /orders`.
///
/// Category reads are retried on transient errors (429, network failures,
/// 5xx) with exponential backoff; order submission is never retried.
#[derive(Clone)]
pub struct BackendClient {
    pub(super) client: Client,
    base_url: String,
    /// `limit` used for skip/limit paging.
    pub(super) page_size: u32,
    /// Maximum number of retry attempts after the first failure.
    pub(super) max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^attempt`.
    pub(super) backoff_base_ms: u64,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Creates a client with a request timeout, `User-Agent` and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, or [`BackendError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
        page_size: u32,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, BackendError> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| BackendError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            page_size: page_size.max(1),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from the `ILUMA_BACKEND_*` settings.
    ///
    /// # Errors
    ///
    /// See [`BackendClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, BackendError> {
        Self::new(
            &config.backend_url,
            config.backend_timeout(),
            &config.user_agent,
            config.backend_page_size,
            config.backend_max_retries,
            config.backend_retry_backoff_ms,
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetches one `skip`/`limit` window of a category, retrying transient
    /// errors.
    ///
    /// # Errors
    ///
    /// - [`BackendError::RateLimited`]: HTTP 429 after all retries.
    /// - [`BackendError::NotFound`]: HTTP 404 (not retried).
    /// - [`BackendError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`BackendError::Http`]: network failure or timeout after all retries.
    /// - [`BackendError::Deserialize`]: body is not JSON (not retried).
    pub async fn fetch_category_page(
        &self,
        category: Category,
        skip: usize,
        limit: u32,
    ) -> Result<Vec<RawProduct>, BackendError> {
        let url = self.category_url(category, skip, limit);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(BackendError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(BackendError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(BackendError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                parse_category_response(&body, category).map_err(|e| BackendError::Deserialize {
                    context: format!("{category} page at skip={skip}"),
                    source: e,
                })
            }
        })
        .await
    }

    fn category_url(&self, category: Category, skip: usize, limit: u32) -> String {
        format!(
            "{}/products/{}?skip={skip}&limit={limit}",
            self.base_url,
            category.as_str()
        )
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
