//! Client for the upstream product/order API and the order notifier.

pub mod client;
pub mod error;
pub mod notify;
mod retry;
pub mod types;

pub use client::BackendClient;
pub use error::{BackendError, NotifyError};
pub use notify::TelegramNotifier;
pub use types::parse_category_response;
