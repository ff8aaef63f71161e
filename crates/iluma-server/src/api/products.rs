use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use iluma_catalog::{ProductCard, DEFAULT_SIMILAR_LIMIT};
use iluma_core::{CatalogQuery, Category};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

const MAX_SIMILAR_LIMIT: usize = 24;

#[derive(Debug, Deserialize)]
pub(super) struct SimilarQuery {
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /api/products/{slug}`: a category slug lists that category, any
/// other slug resolves to a single product.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    if slug.parse::<Category>().is_ok() {
        let query = CatalogQuery::from_query_pairs(&slug, params);
        let page = state.catalog.query(&query).await;
        return Ok(Json(ApiResponse::new(req_id.0, page)).into_response());
    }

    match state.catalog.find_product(&slug).await {
        Ok(Some(product)) => {
            Ok(Json(ApiResponse::new(req_id.0, product.as_ref())).into_response())
        }
        Ok(None) => Err(ApiError::new(req_id.0, "not_found", "Товар не найден")),
        Err(e) => {
            tracing::error!(slug = %slug, error = %e, "product lookup failed");
            Err(ApiError::upstream(req_id.0))
        }
    }
}

/// `GET /api/products/similar?productId=&category=&limit=`
pub(super) async fn similar_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<ApiResponse<Vec<ProductCard>>>, ApiError> {
    let (Some(product_id), Some(category)) = (
        query.product_id.filter(|s| !s.trim().is_empty()),
        query.category.filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "productId and category are required",
        ));
    };

    let category: Category = category.parse().map_err(|e: iluma_core::CoreError| {
        ApiError::new(req_id.0.clone(), "bad_request", e.to_string())
    })?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SIMILAR_LIMIT)
        .clamp(1, MAX_SIMILAR_LIMIT);

    let products = state.catalog.similar(&product_id, category, limit).await;
    Ok(Json(ApiResponse::new(req_id.0, products)))
}
