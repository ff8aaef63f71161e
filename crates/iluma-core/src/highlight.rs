//! Curated cross-category listings: bestsellers and new arrivals.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::products::NormalizedProduct;
use crate::stock::resolve_stock;
use crate::CoreError;

/// A storefront showcase driven by a per-product upstream flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Highlight {
    /// Products flagged `hit`.
    Bestsellers,
    /// Products flagged `new`.
    NewProducts,
}

impl Highlight {
    pub const ALL: [Highlight; 2] = [Highlight::Bestsellers, Highlight::NewProducts];

    /// URL slug of the showcase page.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Highlight::Bestsellers => "bestsellers",
            Highlight::NewProducts => "new-products",
        }
    }

    /// Upstream record field carrying the flag.
    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Highlight::Bestsellers => "hit",
            Highlight::NewProducts => "new",
        }
    }
}

impl std::fmt::Display for Highlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Highlight {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Highlight::ALL
            .into_iter()
            .find(|h| h.as_str() == lowered)
            .ok_or_else(|| CoreError::UnknownHighlight(s.to_string()))
    }
}

/// `true` when `product` carries the showcase flag. The flag is read with
/// the same rules as stock, so `1`, `"1"`, `true` and `"да"` all count.
#[must_use]
pub fn is_highlighted(product: &NormalizedProduct, highlight: Highlight) -> bool {
    product
        .extra
        .get(highlight.flag())
        .is_some_and(resolve_stock)
}

/// Keeps the in-stock products flagged for `highlight`, in input order.
#[must_use]
pub fn select_highlighted(
    products: impl IntoIterator<Item = NormalizedProduct>,
    highlight: Highlight,
) -> Vec<NormalizedProduct> {
    products
        .into_iter()
        .filter(|p| p.nalichie && is_highlighted(p, highlight))
        .collect()
}
