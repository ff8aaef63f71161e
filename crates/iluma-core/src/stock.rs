use serde_json::Value;

/// Free-text stock markers the backend uses for "in stock".
const AFFIRMATIVE: [&str; 7] = ["да", "есть", "true", "1", "available", "in stock", "yes"];

/// Classifies a loosely typed `nalichie` value as in stock or not.
///
/// Numbers count only when exactly `1`; numeric strings follow the same rule.
/// Other strings are matched, trimmed and lower-cased, against a fixed set of
/// affirmative markers. Everything else is out of stock.
///
/// Used for both product-level and per-variant stock.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn resolve_stock(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v == 1.0),
        Value::String(s) => resolve_text(s),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

#[allow(clippy::float_cmp)]
fn resolve_text(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return false;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return n == 1.0;
    }
    let lowered = trimmed.to_lowercase();
    AFFIRMATIVE.contains(&lowered.as_str())
}
