//! Order placement: validate, forward upstream, notify.

use iluma_backend::{BackendClient, TelegramNotifier};
use iluma_core::{format_order_message, AppConfig, CoreError, OrderRequest};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;

use crate::error::CheckoutError;

/// Outcome of a successful checkout.
#[derive(Debug)]
pub struct PlacedOrder {
    pub order: OrderRequest,
    pub total: Decimal,
    /// Background notification task, when a notifier is configured.
    /// Dropping the handle does not cancel the task.
    pub notification: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone)]
pub struct CheckoutService {
    backend: BackendClient,
    notifier: Option<TelegramNotifier>,
    site_name: String,
    pickup_address: String,
}

impl CheckoutService {
    #[must_use]
    pub fn new(
        backend: BackendClient,
        notifier: Option<TelegramNotifier>,
        site_name: impl Into<String>,
        pickup_address: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            notifier,
            site_name: site_name.into(),
            pickup_address: pickup_address.into(),
        }
    }

    #[must_use]
    pub fn from_config(
        backend: BackendClient,
        notifier: Option<TelegramNotifier>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            backend,
            notifier,
            config.site_name.clone(),
            config.pickup_address.clone(),
        )
    }

    /// Validates `order`, submits it upstream, then sends the notification
    /// in the background. Notification failures are logged and never fail
    /// the order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Invalid`] for a malformed order (nothing is
    /// sent upstream) and [`CheckoutError::Upstream`] when the backend
    /// rejects or cannot be reached (no notification is sent).
    pub async fn place_order(&self, order: OrderRequest) -> Result<PlacedOrder, CheckoutError> {
        let order = order.into_validated()?;
        let total = order.total().ok_or_else(|| {
            CoreError::InvalidOrder("Сумма заказа слишком велика".to_string())
        })?;
        self.backend.submit_order(&order).await?;

        tracing::info!(
            items = order.ordered_items.len(),
            %total,
            delivery = order.is_delivery,
            "order placed"
        );

        let notification = self.notifier.clone().map(|notifier| {
            let text = format_order_message(&order, &self.site_name, &self.pickup_address);
            tokio::spawn(async move {
                if let Err(e) = notifier.send(&text).await {
                    tracing::warn!(error = %e, "order notification failed");
                }
            })
        });

        Ok(PlacedOrder {
            order,
            total,
            notification,
        })
    }
}
