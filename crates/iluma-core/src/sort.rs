use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::products::NormalizedProduct;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "name-asc")]
    NameAsc,
    #[serde(rename = "name-desc")]
    NameDesc,
}

impl SortKey {
    /// Parses a sort key; unrecognized keys yield `None` (input order kept).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "name-asc" => Ok(SortKey::NameAsc),
            "name-desc" => Ok(SortKey::NameDesc),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

/// Primary collation key: lower-cased, with `ё` folded into `е` the way
/// Russian collation orders it.
fn primary_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .collect()
}

/// Compares by [`primary_key`], then case-folded, then by code point, so
/// `"amber"` and `"Amber"` sort together but still deterministically.
fn compare_names(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Returns `products` ordered by `key`. The sort is stable; `None` keeps the
/// input order.
#[must_use]
pub fn sort_products(
    mut products: Vec<NormalizedProduct>,
    key: Option<SortKey>,
) -> Vec<NormalizedProduct> {
    let Some(key) = key else {
        return products;
    };
    match key {
        SortKey::PriceAsc => products.sort_by(|a, b| a.price_value.total_cmp(&b.price_value)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price_value.total_cmp(&a.price_value)),
        SortKey::NameAsc => {
            products.sort_by(|a, b| compare_names(a.display_name(), b.display_name()));
        }
        SortKey::NameDesc => {
            products.sort_by(|a, b| compare_names(b.display_name(), a.display_name()));
        }
    }
    products
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::normalize::normalize_product;

    fn named(name: &str, price: f64) -> NormalizedProduct {
        let raw = serde_json::from_value(json!({"name": name, "price": price})).unwrap();
        normalize_product(raw)
    }

    fn names(products: &[NormalizedProduct]) -> Vec<&str> {
        products.iter().map(NormalizedProduct::display_name).collect()
    }

    #[test]
    fn price_asc_orders_cheapest_first() {
        let input = vec![named("B", 10.0), named("A", 20.0)];
        let sorted = sort_products(input, Some(SortKey::PriceAsc));
        assert_eq!(names(&sorted), vec!["B", "A"]);
    }

    #[test]
    fn name_asc_orders_alphabetically() {
        let input = vec![named("B", 10.0), named("A", 20.0)];
        let sorted = sort_products(input, Some(SortKey::NameAsc));
        assert_eq!(names(&sorted), vec!["A", "B"]);
    }

    #[test]
    fn descending_keys_reverse_order() {
        let input = vec![named("amber", 5.0), named("Sienna", 7.0), named("Bronze", 6.0)];
        let by_price = sort_products(input.clone(), Some(SortKey::PriceDesc));
        assert_eq!(names(&by_price), vec!["Sienna", "Bronze", "amber"]);
        let by_name = sort_products(input, Some(SortKey::NameDesc));
        assert_eq!(names(&by_name), vec!["Sienna", "Bronze", "amber"]);
    }

    #[test]
    fn equal_prices_keep_input_order() {
        let input = vec![named("first", 5.0), named("second", 5.0), named("cheap", 1.0)];
        let sorted = sort_products(input, Some(SortKey::PriceAsc));
        assert_eq!(names(&sorted), vec!["cheap", "first", "second"]);
    }

    #[test]
    fn missing_key_keeps_input_order() {
        let sorted = sort_products(vec![named("B", 1.0), named("A", 2.0)], None);
        assert_eq!(names(&sorted), vec!["B", "A"]);
    }

    #[test]
    fn unknown_key_does_not_parse() {
        assert_eq!(SortKey::parse("popularity"), None);
        assert_eq!(SortKey::parse("name-desc"), Some(SortKey::NameDesc));
    }

    #[test]
    fn cyrillic_names_sort_case_insensitively() {
        let sorted = sort_products(
            vec![named("янтарь", 1.0), named("Бронза", 1.0), named("амбер", 1.0)],
            Some(SortKey::NameAsc),
        );
        assert_eq!(names(&sorted), vec!["амбер", "Бронза", "янтарь"]);
    }

    #[test]
    fn yo_sorts_with_ye_not_after_ya() {
        let sorted = sort_products(
            vec![named("Ёлка", 1.0), named("Яблоко", 1.0), named("Ежевика", 1.0)],
            Some(SortKey::NameAsc),
        );
        assert_eq!(names(&sorted), vec!["Ежевика", "Ёлка", "Яблоко"]);
    }
}
