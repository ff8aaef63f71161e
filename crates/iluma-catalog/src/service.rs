//! Cached catalog reads on top of [`BackendClient`].

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use iluma_backend::BackendClient;
use iluma_core::{
    normalize_product, run_query, select_highlighted, AppConfig, CartItem, CatalogPage,
    CatalogQuery, Category, Highlight, NormalizedProduct, ProductId, RawProduct, Variant,
    VariantKind,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::cache::TtlCache;
use crate::error::CatalogError;

pub const DEFAULT_SIMILAR_LIMIT: usize = 4;

/// Cache lifetimes and the per-category fetch deadline.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSettings {
    pub category_ttl: Duration,
    pub product_ttl: Duration,
    pub fetch_timeout: Duration,
}

impl CatalogSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            category_ttl: config.category_cache_ttl(),
            product_ttl: config.product_cache_ttl(),
            fetch_timeout: config.backend_timeout(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            category_ttl: Duration::from_secs(120),
            product_ttl: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// Card shape returned by the similar-products and showcase listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: Option<ProductId>,
    pub name: String,
    pub price: f64,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub variants: Vec<Variant>,
    pub nalichie: bool,
}

impl From<&NormalizedProduct> for ProductCard {
    fn from(product: &NormalizedProduct) -> Self {
        Self {
            id: product.id.clone(),
            name: product.display_name().to_string(),
            price: product.display_price(),
            image_url: product.display_image().map(str::to_string),
            url: product.url_path(),
            description: product.description.clone(),
            variants: product.variants.clone(),
            nalichie: product.nalichie,
        }
    }
}

/// One cart line to re-check against live stock.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StockCheckItem {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub variant: Option<VariantKind>,
    /// Narrows the live fetch; every category is fetched when absent.
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockStatus {
    /// Composite cart id, as built by [`CartItem::composite_id`].
    pub id: String,
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    backend: BackendClient,
    categories: TtlCache<Category, Vec<RawProduct>>,
    products: TtlCache<String, NormalizedProduct>,
    fetch_timeout: Duration,
}

impl CatalogService {
    #[must_use]
    pub fn new(backend: BackendClient, settings: CatalogSettings) -> Self {
        Self {
            backend,
            categories: TtlCache::new("category", settings.category_ttl),
            products: TtlCache::new("product", settings.product_ttl),
            fetch_timeout: settings.fetch_timeout,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// Raw product list of `category`, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Upstream`] or [`CatalogError::Timeout`] when
    /// the list is not cached and the live fetch fails.
    pub async fn category_products(
        &self,
        category: Category,
    ) -> Result<Arc<Vec<RawProduct>>, CatalogError> {
        self.categories
            .get_or_fetch(category, || self.fetch_live(category))
            .await
    }

    /// Fetches `category` from upstream, bypassing the cache.
    async fn fetch_live(&self, category: Category) -> Result<Vec<RawProduct>, CatalogError> {
        match tokio::time::timeout(self.fetch_timeout, self.backend.fetch_category(category)).await
        {
            Ok(Ok(products)) => {
                tracing::debug!(%category, count = products.len(), "fetched category");
                Ok(products)
            }
            Ok(Err(source)) => Err(CatalogError::Upstream { category, source }),
            Err(_) => Err(CatalogError::Timeout {
                category,
                timeout_ms: self.fetch_timeout.as_millis(),
            }),
        }
    }

    /// Runs the listing pipeline. An unreachable upstream yields an empty
    /// page rather than an error.
    pub async fn query(&self, query: &CatalogQuery) -> CatalogPage {
        match self.category_products(query.category).await {
            Ok(raw) => run_query(&raw, query),
            Err(e) => {
                tracing::warn!(
                    category = %query.category,
                    error = %e,
                    "serving empty catalog page"
                );
                CatalogPage::empty(query.page.max(1))
            }
        }
    }

    /// Finds a product by `ref`, `id` or name slug across every category.
    ///
    /// Categories that fail to load are skipped; `Ok(None)` means no loaded
    /// category contains a match.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UpstreamUnavailable`] when no category could
    /// be loaded at all.
    pub async fn find_product(
        &self,
        slug: &str,
    ) -> Result<Option<Arc<NormalizedProduct>>, CatalogError> {
        let key = slug.to_lowercase();
        if let Some(hit) = self.products.get(&key).await {
            tracing::debug!(slug, "product cache hit");
            return Ok(Some(hit));
        }

        let results = join_all(Category::ALL.map(|c| self.category_products(c))).await;
        let mut loaded = 0_usize;
        let mut found = None;
        for (category, result) in Category::ALL.into_iter().zip(results) {
            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(%category, error = %e, "skipping category in product lookup");
                    continue;
                }
            };
            loaded += 1;
            if found.is_none() {
                found = raw
                    .iter()
                    .cloned()
                    .map(normalize_product)
                    .find(|p| p.matches_slug(slug));
            }
        }

        if loaded == 0 {
            return Err(CatalogError::UpstreamUnavailable);
        }

        match found {
            Some(product) => Ok(Some(self.products.insert(key, product).await)),
            None => Ok(None),
        }
    }

    /// Up to `limit` random in-stock products of `category`, excluding the
    /// product identified by `product_id`. Upstream failure yields no
    /// suggestions.
    pub async fn similar(
        &self,
        product_id: &str,
        category: Category,
        limit: usize,
    ) -> Vec<ProductCard> {
        let raw = match self.category_products(category).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%category, error = %e, "similar products unavailable");
                return Vec::new();
            }
        };

        let mut candidates: Vec<NormalizedProduct> = raw
            .iter()
            .cloned()
            .map(normalize_product)
            .filter(|p| p.nalichie && !is_same_product(p, product_id))
            .collect();
        candidates.shuffle(&mut rand::rng());
        candidates.truncate(limit);
        candidates.iter().map(ProductCard::from).collect()
    }

    /// In-stock products flagged for `highlight` across every category, in
    /// category then upstream order, truncated to `limit` when given.
    ///
    /// Categories that fail to load are skipped, so an unreachable upstream
    /// yields an empty showcase.
    pub async fn highlighted(
        &self,
        highlight: Highlight,
        limit: Option<usize>,
    ) -> Vec<ProductCard> {
        let results = join_all(Category::ALL.map(|c| self.category_products(c))).await;
        let mut cards = Vec::new();
        for (category, result) in Category::ALL.into_iter().zip(results) {
            match result {
                Ok(raw) => {
                    let normalized = raw.iter().cloned().map(normalize_product);
                    cards.extend(
                        select_highlighted(normalized, highlight)
                            .iter()
                            .map(ProductCard::from),
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        %category,
                        %highlight,
                        error = %e,
                        "skipping category in showcase"
                    );
                }
            }
        }
        if let Some(limit) = limit {
            cards.truncate(limit);
        }
        cards
    }

    /// Re-checks cart lines against a fresh upstream read.
    ///
    /// A line is available when its product is found and in stock, using
    /// the variant's own stock when the product has that variant. Lines
    /// whose product cannot be found are reported unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UpstreamUnavailable`] when none of the
    /// needed categories could be fetched.
    pub async fn verify_stock(
        &self,
        items: &[StockCheckItem],
    ) -> Result<Vec<StockStatus>, CatalogError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let wanted: Vec<Category> = if items.iter().all(|i| i.category.is_some()) {
            Category::ALL
                .into_iter()
                .filter(|c| items.iter().any(|i| i.category == Some(*c)))
                .collect()
        } else {
            Category::ALL.to_vec()
        };

        let results = join_all(wanted.iter().map(|c| self.fetch_live(*c))).await;
        let mut live = Vec::new();
        let mut loaded = 0_usize;
        for result in results {
            match result {
                Ok(raw) => {
                    loaded += 1;
                    live.extend(raw.into_iter().map(normalize_product));
                }
                Err(e) => tracing::warn!(error = %e, "stock check skipped a category"),
            }
        }
        if loaded == 0 {
            return Err(CatalogError::UpstreamUnavailable);
        }

        Ok(items
            .iter()
            .map(|item| {
                let available = live
                    .iter()
                    .find(|p| p.matches_slug(&item.reference))
                    .is_some_and(|p| {
                        item.variant
                            .and_then(|kind| p.variant(kind))
                            .map_or(p.nalichie, |v| v.nalichie)
                    });
                StockStatus {
                    id: CartItem::composite_id(&item.reference, item.variant),
                    available,
                }
            })
            .collect())
    }
}

fn is_same_product(product: &NormalizedProduct, product_id: &str) -> bool {
    product
        .id
        .as_ref()
        .is_some_and(|id| id.to_string() == product_id)
        || product.reference.as_deref() == Some(product_id)
}
