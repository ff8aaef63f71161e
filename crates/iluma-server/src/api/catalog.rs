use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use iluma_catalog::ProductCard;
use iluma_core::{CatalogPage, CatalogQuery, Category, CategoryFacets, Highlight, SearchRequest};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

fn parse_category(request_id: &str, slug: &str) -> Result<Category, ApiError> {
    slug.parse()
        .map_err(|_| ApiError::new(request_id, "not_found", format!("unknown category: {slug}")))
}

/// `GET /api/catalog/{category}` with filters, sort and paging in the
/// query string.
pub(super) async fn list_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<CatalogPage>>, ApiError> {
    let category = parse_category(&req_id.0, &category)?;
    let query = CatalogQuery::from_query_pairs(category.as_str(), params);
    let page = state.catalog.query(&query).await;
    Ok(Json(ApiResponse::new(req_id.0, page)))
}

/// `POST /api/catalog/{category}/search` with a pre-merged filter object.
pub(super) async fn search_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CatalogPage>>, ApiError> {
    let category = parse_category(&req_id.0, &category)?;
    let Json(request) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    let page = state.catalog.query(&request.into_query(category)).await;
    Ok(Json(ApiResponse::new(req_id.0, page)))
}

/// `GET /api/catalog/{category}/facets`
pub(super) async fn get_facets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<CategoryFacets>>, ApiError> {
    let category = parse_category(&req_id.0, &category)?;
    let facets = state.facets.for_category(category).cloned().ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("no filters configured for {category}"),
        )
    })?;
    Ok(Json(ApiResponse::new(req_id.0, facets)))
}

#[derive(Debug, Deserialize)]
pub(super) struct ShowcaseQuery {
    pub limit: Option<usize>,
}

async fn showcase(
    state: &AppState,
    request_id: String,
    highlight: Highlight,
    limit: Option<usize>,
) -> Json<ApiResponse<Vec<ProductCard>>> {
    let cards = state.catalog.highlighted(highlight, limit).await;
    Json(ApiResponse::new(request_id, cards))
}

/// `GET /api/catalog/bestsellers?limit=`
pub(super) async fn bestsellers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ShowcaseQuery>,
) -> Json<ApiResponse<Vec<ProductCard>>> {
    showcase(&state, req_id.0, Highlight::Bestsellers, query.limit).await
}

/// `GET /api/catalog/new-products?limit=`
pub(super) async fn new_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ShowcaseQuery>,
) -> Json<ApiResponse<Vec<ProductCard>>> {
    showcase(&state, req_id.0, Highlight::NewProducts, query.limit).await
}
