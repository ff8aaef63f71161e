//! Named filter predicates over normalized products.
//!
//! Filters arrive either as query-string pairs or as a pre-merged JSON
//! object. Both encodings are decoded into one [`FilterSet`]; unknown keys are
//! ignored and malformed values are dropped with a warning, never failing
//! the whole query.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::category::Category;
use crate::products::{value_to_text, NormalizedProduct, VariantKind};

/// Keys handled by sorting and pagination rather than filtering.
const NON_FILTER_KEYS: [&str; 3] = ["sort", "page", "perPage"];

/// Inclusive price bounds; a missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl PriceRange {
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// Decoded filter selection. Empty lists and `None` mean "no constraint".
///
/// `price` and `minPrice`/`maxPrice` are independent inputs; when both are
/// present a product must satisfy both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceRange>,
    #[serde(rename = "minPrice", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brand: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub country: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub color: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flavor: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub package_type: Vec<VariantKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl FilterSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == FilterSet::default()
    }

    /// Decodes query-string pairs.
    ///
    /// `price` must be a JSON object. Values containing a comma become lists
    /// (except `search`); other values are JSON-decoded when possible and kept
    /// as plain strings otherwise.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();
            if NON_FILTER_KEYS.contains(&key) {
                continue;
            }
            let decoded = match key {
                "search" => Value::String(value.to_string()),
                "price" => match serde_json::from_str::<Value>(value) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(key, value, error = %e, "dropping malformed price filter");
                        continue;
                    }
                },
                _ if value.contains(',') => Value::Array(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Value::String(s.to_string()))
                        .collect(),
                ),
                _ => serde_json::from_str::<Value>(value)
                    .unwrap_or_else(|_| Value::String(value.to_string())),
            };
            map.insert(key.to_string(), decoded);
        }
        Self::from_json_map(&map)
    }

    /// Decodes a pre-merged filter object such as
    /// `{"brand": ["Kazakhstan"], "price": {"min": 100}}`.
    #[must_use]
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let mut filters = FilterSet::default();
        for (key, value) in map {
            match key.as_str() {
                "price" => filters.price = decode_price_range(value),
                "minPrice" => filters.min_price = decode_bound(key, value),
                "maxPrice" => filters.max_price = decode_bound(key, value),
                "brand" => filters.brand = decode_list(value),
                "country" => filters.country = decode_list(value),
                "color" => filters.color = decode_list(value),
                "flavor" => {
                    filters.flavor = decode_list(value)
                        .into_iter()
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                "package_type" => {
                    filters.package_type = decode_list(value)
                        .iter()
                        .filter_map(|s| {
                            let kind = VariantKind::parse(s);
                            if kind.is_none() {
                                tracing::warn!(value = %s, "ignoring unknown package_type");
                            }
                            kind
                        })
                        .collect();
                }
                "search" => {
                    filters.search = match value {
                        Value::Null => None,
                        other => Some(value_to_text(other)),
                    }
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                }
                k if NON_FILTER_KEYS.contains(&k) => {}
                other => tracing::debug!(key = other, "ignoring unknown filter key"),
            }
        }
        filters
    }
}

fn decode_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn decode_bound(key: &str, value: &Value) -> Option<f64> {
    if value.is_null() {
        return None;
    }
    let bound = decode_number(value);
    if bound.is_none() {
        tracing::warn!(key, value = %value, "dropping malformed price bound");
    }
    bound
}

fn decode_price_range(value: &Value) -> Option<PriceRange> {
    match value {
        Value::Null => None,
        Value::Object(obj) => {
            let bound = |name: &str| obj.get(name).and_then(|v| decode_bound(name, v));
            Some(PriceRange {
                min: bound("min"),
                max: bound("max"),
            })
        }
        // A JSON-encoded object passed through as a string.
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(decoded @ Value::Object(_)) => decode_price_range(&decoded),
            _ => {
                tracing::warn!(value = %s, "dropping malformed price filter");
                None
            }
        },
        other => {
            tracing::warn!(value = %other, "dropping malformed price filter");
            None
        }
    }
}

fn decode_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(value_to_text)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        other => {
            let text = value_to_text(other);
            if text.trim().is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    }
}

/// Case-insensitive exact match of `field` against any of `wanted`.
/// An empty selection always passes; a missing field never matches one.
fn any_equals(field: Option<&str>, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let Some(field) = field else {
        return false;
    };
    let field = field.trim().to_lowercase();
    wanted.iter().any(|w| w.trim().to_lowercase() == field)
}

fn flavor_matches(tokens: &[String], wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    wanted.iter().any(|selected| {
        tokens
            .iter()
            .any(|token| selected.contains(token.as_str()) || token.contains(selected.as_str()))
    })
}

fn search_matches(product: &NormalizedProduct, query: &str) -> bool {
    let query = query.to_lowercase();
    let brand = product.extra.get("brand").and_then(Value::as_str);
    let flavor = product.flavor_text();
    let found = [
        product.name.as_deref(),
        product.description.as_deref(),
        product.country.as_deref(),
        product.brend.as_deref(),
        brand,
        product.category_name(),
        flavor.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&query));
    found
}

/// Evaluates every named filter against `product` (stock is not checked).
#[must_use]
pub fn matches(product: &NormalizedProduct, filters: &FilterSet, category: Category) -> bool {
    let price = product.price_value;
    if let Some(range) = &filters.price {
        if !range.contains(price) {
            return false;
        }
    }
    if filters.min_price.is_some_and(|min| price < min) {
        return false;
    }
    if filters.max_price.is_some_and(|max| price > max) {
        return false;
    }

    let brand_field = if category.is_hardware() {
        product.category_name()
    } else {
        product.brend.as_deref()
    };
    if !any_equals(brand_field, &filters.brand) {
        return false;
    }

    if !any_equals(product.color.as_deref(), &filters.color) {
        return false;
    }

    if category == Category::Terea {
        if !any_equals(product.country.as_deref(), &filters.country) {
            return false;
        }
        if !flavor_matches(&product.flavor_normalized, &filters.flavor) {
            return false;
        }
        if !filters.package_type.is_empty()
            && !filters
                .package_type
                .iter()
                .any(|kind| product.has_variant(*kind))
        {
            return false;
        }
    }

    match filters.search.as_deref() {
        Some(query) if !query.is_empty() => search_matches(product, query),
        _ => true,
    }
}

/// Drops out-of-stock products, then keeps those matching every filter.
/// Input order is preserved.
#[must_use]
pub fn apply_filters(
    products: Vec<NormalizedProduct>,
    filters: &FilterSet,
    category: Category,
) -> Vec<NormalizedProduct> {
    products
        .into_iter()
        .filter(|p| p.nalichie)
        .filter(|p| matches(p, filters, category))
        .collect()
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
