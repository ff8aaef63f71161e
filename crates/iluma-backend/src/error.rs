use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by backend (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("pagination limit reached for {category}: exceeded {max_pages} pages")]
    PaginationLimit { category: String, max_pages: usize },

    #[error("invalid backend URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl BackendError {
    /// `true` for server-side failures worth retrying (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, BackendError::UnexpectedStatus { status, .. } if *status >= 500)
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport failure. The request URL is stripped since it embeds the bot token.
    #[error("notification request failed: {0}")]
    Http(reqwest::Error),

    #[error("notification rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Http(err.without_url())
    }
}
