//! Read-only catalog commands: listing, product detail, similar products
//! and facet validation.

use std::path::Path;
use std::sync::Arc;

use iluma_catalog::{CatalogService, ProductCard};
use iluma_core::{
    CatalogPage, CatalogQuery, Category, FacetsFile, Highlight, NormalizedProduct, SortKey,
};

/// Parses a `--filter key=value` argument.
pub(crate) fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid filter '{s}', expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid filter '{s}', key is empty"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Builds the listing query from command-line filters. An unknown category
/// lists `terea` instead.
///
/// # Errors
///
/// Returns an error for an unknown sort key.
pub(crate) fn build_query(
    category: &str,
    filters: &[(String, String)],
    sort: Option<&str>,
    page: usize,
    per_page: usize,
) -> anyhow::Result<CatalogQuery> {
    let mut query = CatalogQuery::from_query_pairs(category, filters.iter().cloned());
    query.sort = sort
        .map(str::parse::<SortKey>)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;
    query.page = page.max(1);
    query.per_page = per_page.max(1);
    Ok(query)
}

pub(crate) async fn run_catalog(catalog: &CatalogService, query: &CatalogQuery) -> CatalogPage {
    catalog.query(query).await
}

/// # Errors
///
/// Returns an error when no category can be fetched or nothing matches.
pub(crate) async fn run_product(
    catalog: &CatalogService,
    slug: &str,
) -> anyhow::Result<Arc<NormalizedProduct>> {
    catalog
        .find_product(slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product '{slug}' not found"))
}

/// # Errors
///
/// Returns an error for an unknown category.
pub(crate) async fn run_similar(
    catalog: &CatalogService,
    product_id: &str,
    category: &str,
    limit: usize,
) -> anyhow::Result<Vec<ProductCard>> {
    let category: Category = category.parse()?;
    Ok(catalog.similar(product_id, category, limit.max(1)).await)
}

pub(crate) async fn run_highlighted(
    catalog: &CatalogService,
    highlight: Highlight,
    limit: Option<usize>,
) -> Vec<ProductCard> {
    catalog.highlighted(highlight, limit).await
}

/// Loads and validates the facets file.
///
/// # Errors
///
/// Returns the load or validation error.
pub(crate) fn run_facets(path: &Path) -> anyhow::Result<FacetsFile> {
    let facets = iluma_core::load_facets(path)?;
    tracing::info!(
        path = %path.display(),
        categories = facets.categories.len(),
        "facets file is valid"
    );
    Ok(facets)
}
