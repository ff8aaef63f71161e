use iluma_core::OrderRequest;

use crate::error::BackendError;

use super::BackendClient;

impl BackendClient {
    /// Forwards a validated order to `POST /orders`.
    ///
    /// Any 2xx status is success; the response body is not interpreted.
    /// The request is sent once: a retried order could be placed twice.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] on transport failure or
    /// [`BackendError::UnexpectedStatus`] for any non-2xx response.
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<(), BackendError> {
        let url = self.orders_url();
        let response = self.client.post(&url).json(order).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                items = order.ordered_items.len(),
                "backend rejected order"
            );
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        Ok(())
    }
}
