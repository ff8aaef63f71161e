//! Wire shapes of the upstream product API.

use iluma_core::{Category, RawProduct};
use serde_json::Value;

/// Extracts the product list from a category response body.
///
/// The backend answers `GET /products/{category}` with
/// `{"<category>": [...]}`. A `products` key is accepted as a fallback and any
/// other shape is an empty page. List entries that are not product objects
/// are skipped.
///
/// # Errors
///
/// Returns a `serde_json::Error` if the body is not JSON at all.
pub fn parse_category_response(
    body: &str,
    category: Category,
) -> Result<Vec<RawProduct>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    let Value::Object(mut root) = value else {
        tracing::warn!(%category, "category response is not a JSON object");
        return Ok(Vec::new());
    };

    let list = match root
        .remove(category.as_str())
        .or_else(|| root.remove("products"))
    {
        Some(Value::Array(items)) => items,
        Some(_) | None => {
            tracing::warn!(%category, "category response has no product list");
            return Ok(Vec::new());
        }
    };

    let total = list.len();
    let products: Vec<RawProduct> = list
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if products.len() < total {
        tracing::warn!(
            %category,
            skipped = total - products.len(),
            "skipped malformed product entries"
        );
    }
    Ok(products)
}
