use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use iluma_catalog::CheckoutError;
use iluma_core::OrderRequest;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct OrderAccepted {
    message: &'static str,
}

/// `POST /api/orders`
pub(super) async fn create_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<OrderAccepted>>), ApiError> {
    let Json(order) = body.map_err(|e| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("Некорректные данные заказа: {}", e.body_text()),
        )
    })?;

    match state.checkout.place_order(order).await {
        Ok(_placed) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::new(
                req_id.0,
                OrderAccepted {
                    message: "Заказ успешно оформлен",
                },
            )),
        )),
        Err(e @ CheckoutError::Invalid(_)) => Err(ApiError::new(
            req_id.0,
            "validation_error",
            e.customer_message(),
        )),
        Err(e @ CheckoutError::Upstream(_)) => {
            tracing::error!(request_id = %req_id.0, error = %e, "order submission failed");
            Err(ApiError::new(
                req_id.0,
                "upstream_error",
                e.customer_message(),
            ))
        }
    }
}
