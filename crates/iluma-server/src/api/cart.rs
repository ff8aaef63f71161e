use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use iluma_catalog::{StockCheckItem, StockStatus};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct VerifyCartRequest {
    items: Vec<StockCheckItem>,
}

/// `POST /api/cart/verify`: live stock for each cart line.
pub(super) async fn verify_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<VerifyCartRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<StockStatus>>>, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    match state.catalog.verify_stock(&request.items).await {
        Ok(statuses) => Ok(Json(ApiResponse::new(req_id.0, statuses))),
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "stock re-check failed");
            Err(ApiError::upstream(req_id.0))
        }
    }
}
