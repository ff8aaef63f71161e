//! Conversion from raw backend records to [`NormalizedProduct`].
//!
//! Normalization never fails: malformed prices become `0`, malformed stock
//! becomes `false`, and a product always ends up with at least one variant.

use serde_json::Value;

use crate::products::{NormalizedProduct, RawProduct, RawVariantStock, Variant, VariantKind};
use crate::stock::resolve_stock;

/// Keys computed here; upstream copies are dropped from the passthrough map.
const DERIVED_KEYS: [&str; 3] = ["priceValue", "pricePackValue", "flavorNormalized"];

/// Converts a number or numeric string to a finite `f64`, or `0` for
/// anything else (empty strings, `null`, text, non-finite values).
#[must_use]
pub fn parse_numeric_or_zero(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Expands a raw record into its canonical, variant-expanded form.
#[must_use]
pub fn normalize_product(raw: RawProduct) -> NormalizedProduct {
    let nalichie = resolve_stock(&raw.nalichie);
    let price_value = parse_numeric_or_zero(&raw.price);
    let price_pack_value = parse_numeric_or_zero(&raw.price_pack);
    let flavor_normalized = normalize_flavor(&raw.flavor);

    let variant_stock = |kind: VariantKind| -> bool {
        raw.variants
            .as_deref()
            .and_then(|stock| find_variant_stock(stock, kind))
            .map_or(nalichie, |entry| resolve_stock(&entry.nalichie))
    };

    let name = raw.name.clone().unwrap_or_default();
    let has_pack_image = raw.image_pack.as_deref().is_some_and(|s| !s.is_empty());

    let variants = if raw.kind.as_deref() == Some("terea") && has_pack_image {
        // Pack falls back to the block price when no pack price is set.
        let pack_price = if price_pack_value == 0.0 {
            price_value
        } else {
            price_pack_value
        };
        vec![
            Variant {
                kind: VariantKind::Pack,
                image_url: raw.image_pack.clone(),
                price: pack_price.max(0.0),
                name: format!("{name} (пачка)"),
                nalichie: variant_stock(VariantKind::Pack),
            },
            Variant {
                kind: VariantKind::Block,
                image_url: raw.image.clone(),
                price: price_value.max(0.0),
                name: format!("{name} (блок)"),
                nalichie: variant_stock(VariantKind::Block),
            },
        ]
    } else {
        vec![Variant {
            kind: VariantKind::Pack,
            image_url: raw.image.clone(),
            price: price_value.max(0.0),
            name,
            nalichie: variant_stock(VariantKind::Pack),
        }]
    };

    let mut extra = raw.extra;
    for key in DERIVED_KEYS {
        extra.remove(key);
    }

    NormalizedProduct {
        id: raw.id,
        reference: raw.reference,
        name: raw.name,
        kind: raw.kind,
        price: raw.price,
        price_pack: raw.price_pack,
        image: raw.image,
        image_pack: raw.image_pack,
        flavor: raw.flavor,
        category: raw.category,
        country: raw.country,
        color: raw.color,
        brend: raw.brend,
        description: raw.description,
        extra,
        variants,
        price_value,
        price_pack_value,
        flavor_normalized,
        nalichie,
    }
}

fn find_variant_stock(stock: &[RawVariantStock], kind: VariantKind) -> Option<&RawVariantStock> {
    stock.iter().find(|entry| {
        entry
            .kind
            .as_deref()
            .and_then(VariantKind::parse)
            .is_some_and(|k| k == kind)
    })
}

/// Lower-cased, trimmed flavor tokens. Strings are split on `,`, `/` and `|`.
fn normalize_flavor(flavor: &Value) -> Vec<String> {
    match flavor {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split([',', '/', '|'])
            .map(|piece| piece.trim().to_lowercase())
            .filter(|piece| !piece.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
