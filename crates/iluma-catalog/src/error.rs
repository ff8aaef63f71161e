use iluma_backend::BackendError;
use iluma_core::{Category, CoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("upstream request for {category} failed: {source}")]
    Upstream {
        category: Category,
        #[source]
        source: BackendError,
    },

    #[error("upstream request for {category} timed out after {timeout_ms}ms")]
    Timeout { category: Category, timeout_ms: u128 },

    #[error("no product category could be fetched from upstream")]
    UpstreamUnavailable,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("order submission failed: {0}")]
    Upstream(#[from] BackendError),
}

impl CheckoutError {
    /// Message suitable for showing to the customer.
    #[must_use]
    pub fn customer_message(&self) -> String {
        match self {
            CheckoutError::Invalid(CoreError::InvalidOrder(msg)) => msg.clone(),
            CheckoutError::Invalid(other) => other.to_string(),
            CheckoutError::Upstream(_) => {
                "Не удалось оформить заказ. Попробуйте позже.".to_string()
            }
        }
    }
}
