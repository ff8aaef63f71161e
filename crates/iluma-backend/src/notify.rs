//! Order notifications through the Telegram Bot API.

use std::time::Duration;

use iluma_core::TelegramConfig;
use reqwest::Client;
use serde::Serialize;

use crate::error::NotifyError;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Posts Markdown messages to one chat via `sendMessage`.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TelegramConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    /// Sends `text` with `parse_mode = Markdown`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] on transport failure and
    /// [`NotifyError::Rejected`] when the Bot API answers non-2xx.
    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url, self.config.bot_token
        );
        let body = SendMessage {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(chat_id = %self.config.chat_id, "order notification sent");
        Ok(())
    }
}
