//! The pure part of the catalog pipeline: normalize, filter, sort, paginate.
//!
//! Fetching and caching live in `iluma-catalog`; this module only sees the
//! raw list a category resolved to.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::category::Category;
use crate::filter::{apply_filters, FilterSet};
use crate::normalize::normalize_product;
use crate::products::{NormalizedProduct, RawProduct};
use crate::sort::{sort_products, SortKey};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub category: Category,
    pub filters: FilterSet,
    pub sort: Option<SortKey>,
    pub page: usize,
    pub per_page: usize,
}

impl CatalogQuery {
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            filters: FilterSet::default(),
            sort: None,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Builds a query from a category path segment and query-string pairs.
    /// An unknown category falls back to `terea`.
    pub fn from_query_pairs<I, K, V>(category_slug: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs: Vec<(K, V)> = pairs.into_iter().collect();
        let lookup = |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_ref())
        };

        Self {
            category: Category::from_slug_or_default(category_slug),
            sort: lookup("sort").and_then(SortKey::parse),
            page: parse_positive(lookup("page"), DEFAULT_PAGE),
            per_page: parse_positive(lookup("perPage"), DEFAULT_PER_PAGE),
            filters: FilterSet::from_query_pairs(
                pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())),
            ),
        }
    }
}

fn parse_positive(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

fn value_to_positive(raw: Option<&Value>, default: usize) -> usize {
    match raw {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n >= 1)
            .unwrap_or(default),
        Some(Value::String(s)) => parse_positive(Some(s), default),
        _ => default,
    }
}

/// Pre-merged filter object accepted by the structured search endpoint:
/// `{"filters": {...}, "sort": "price-asc", "page": 1, "perPage": 12}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub filters: Map<String, Value>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<Value>,
    #[serde(default, rename = "perPage")]
    pub per_page: Option<Value>,
}

impl SearchRequest {
    #[must_use]
    pub fn into_query(self, category: Category) -> CatalogQuery {
        CatalogQuery {
            category,
            filters: FilterSet::from_json_map(&self.filters),
            sort: self.sort.as_deref().and_then(SortKey::parse),
            page: value_to_positive(self.page.as_ref(), DEFAULT_PAGE),
            per_page: value_to_positive(self.per_page.as_ref(), DEFAULT_PER_PAGE),
        }
    }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogPage {
    pub products: Vec<NormalizedProduct>,
    pub total: usize,
    pub page: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl CatalogPage {
    /// The "no results" page returned when the upstream is unavailable.
    #[must_use]
    pub fn empty(page: usize) -> Self {
        Self {
            products: Vec::new(),
            total: 0,
            page,
            total_pages: 0,
            has_more: false,
        }
    }
}

/// Slices the `page`-th window of `per_page` items (1-based).
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> (Vec<T>, usize, usize, bool) {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(per_page);
    let end = page.saturating_mul(per_page);
    let window = items.into_iter().skip(start).take(per_page).collect();
    (window, total, total.div_ceil(per_page), end < total)
}

/// Normalizes `raw`, drops out-of-stock products, applies the query's
/// filters and sort, and returns the requested page.
#[must_use]
pub fn run_query(raw: &[RawProduct], query: &CatalogQuery) -> CatalogPage {
    let normalized: Vec<NormalizedProduct> = raw.iter().cloned().map(normalize_product).collect();
    let filtered = apply_filters(normalized, &query.filters, query.category);
    let sorted = sort_products(filtered, query.sort);
    let page = query.page.max(1);
    let (products, total, total_pages, has_more) = paginate(sorted, page, query.per_page);
    CatalogPage {
        products,
        total,
        page,
        total_pages,
        has_more,
    }
}
