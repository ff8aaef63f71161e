use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upstream product identifier. The backend emits numeric ids, but older
/// payloads and hand-edited fixtures carry them as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductId::Int(n) => write!(f, "{n}"),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

/// `category` sub-object of a raw record. For `iqos`/`devices` the
/// `category_name` doubles as the model/brand used by the `brand` filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Backend-supplied stock for one packaging variant, e.g.
/// `{"type": "block", "nalichie": 0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVariantStock {
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(default)]
    pub nalichie: Value,
}

/// A product record exactly as the upstream API returns it.
///
/// Every field is optional and loosely typed: prices arrive as numbers or
/// numeric strings, `nalichie` as a number, boolean or free-text string, and
/// `flavor` as a string or a list. Unknown fields are kept in `extra` and
/// passed through to the normalized record untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(
        rename = "ref",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// `terea`, `iqos` or `devices`.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub price: Value,
    #[serde(rename = "pricePack", default, skip_serializing_if = "Value::is_null")]
    pub price_pack: Value,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    #[serde(
        rename = "imagePack",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_pack: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub nalichie: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub flavor: Value,
    #[serde(
        default,
        deserialize_with = "lenient::opt_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<RawCategory>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub brend: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_variants",
        skip_serializing_if = "Option::is_none"
    )]
    pub variants: Option<Vec<RawVariantStock>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Packaging of a purchasable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// A single pack.
    Pack,
    /// A carton of packs.
    Block,
}

impl VariantKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Pack => "pack",
            VariantKind::Block => "block",
        }
    }

    /// Case-insensitive parse; `None` for anything other than `pack`/`block`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pack" => Some(VariantKind::Pack),
            "block" => Some(VariantKind::Block),
            _ => None,
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(rename = "type")]
    pub kind: VariantKind,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub price: f64,
    pub name: String,
    pub nalichie: bool,
}

/// Canonical, variant-expanded product derived from a [`RawProduct`].
///
/// Serializes as the raw record's fields plus `variants`, `priceValue`,
/// `pricePackValue`, `flavorNormalized` and a boolean `nalichie`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub price: Value,
    #[serde(rename = "pricePack", skip_serializing_if = "Value::is_null")]
    pub price_pack: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "imagePack", skip_serializing_if = "Option::is_none")]
    pub image_pack: Option<String>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub flavor: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<RawCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Never empty; the first entry is the default display variant.
    pub variants: Vec<Variant>,
    #[serde(rename = "priceValue")]
    pub price_value: f64,
    #[serde(rename = "pricePackValue")]
    pub price_pack_value: f64,
    #[serde(rename = "flavorNormalized")]
    pub flavor_normalized: Vec<String>,
    pub nalichie: bool,
}

impl NormalizedProduct {
    /// Display name, empty when the upstream record has none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(|c| c.category_name.as_deref())
    }

    #[must_use]
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    #[must_use]
    pub fn variant(&self, kind: VariantKind) -> Option<&Variant> {
        self.variants.iter().find(|v| v.kind == kind)
    }

    #[must_use]
    pub fn has_variant(&self, kind: VariantKind) -> bool {
        self.variant(kind).is_some()
    }

    /// Price shown on cards: the default variant's price, falling back to
    /// `priceValue` when that is zero.
    #[must_use]
    pub fn display_price(&self) -> f64 {
        self.default_variant()
            .map(|v| v.price)
            .filter(|p| *p != 0.0)
            .unwrap_or(self.price_value)
    }

    #[must_use]
    pub fn display_image(&self) -> Option<&str> {
        self.default_variant()
            .and_then(|v| v.image_url.as_deref())
            .or(self.image.as_deref())
    }

    /// Storefront path of the product page, preferring `ref` over `id`.
    #[must_use]
    pub fn url_path(&self) -> String {
        let key = self
            .reference
            .clone()
            .or_else(|| self.id.as_ref().map(ToString::to_string))
            .unwrap_or_default();
        format!("/product/{key}")
    }

    /// Raw flavor rendered as text: a string as-is, a list joined with `", "`.
    #[must_use]
    pub fn flavor_text(&self) -> Option<String> {
        match &self.flavor {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(value_to_text)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }

    /// `true` when `slug` names this product by `ref` (case-insensitive),
    /// by `id`, or by the URL slug of its name.
    #[must_use]
    pub fn matches_slug(&self, slug: &str) -> bool {
        let lowered = slug.to_lowercase();
        let by_ref = self
            .reference
            .as_deref()
            .is_some_and(|r| r.to_lowercase() == lowered);
        let by_id = self.id.as_ref().is_some_and(|id| id.to_string() == slug);
        let by_name = self
            .name
            .as_deref()
            .is_some_and(|n| product_slug(n) == lowered);
        by_ref || by_id || by_name
    }
}

/// Builds the URL slug of a product name: lower-cased, whitespace runs
/// collapsed to `-`, then everything outside `[A-Za-z0-9_-]` dropped.
///
/// Cyrillic letters are dropped too; ref/id lookups cover those products.
#[must_use]
pub fn product_slug(name: &str) -> String {
    let mut dashed = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                dashed.push('-');
            }
            in_space = true;
        } else {
            dashed.push(c);
            in_space = false;
        }
    }
    dashed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Tolerant field deserializers: a wrongly typed optional field degrades to
/// `None` instead of failing the whole product list.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{ProductId, RawCategory, RawVariantStock};

    pub(super) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }))
    }

    pub(super) fn opt_id<'de, D>(deserializer: D) -> Result<Option<ProductId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| ProductId::Text(n.to_string()), ProductId::Int),
            ),
            Value::String(s) if !s.is_empty() => Some(ProductId::Text(s)),
            _ => None,
        }))
    }

    pub(super) fn opt_category<'de, D>(deserializer: D) -> Result<Option<RawCategory>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            Value::Object(_) => serde_json::from_value(v).ok(),
            _ => None,
        }))
    }

    pub(super) fn opt_variants<'de, D>(
        deserializer: D,
    ) -> Result<Option<Vec<RawVariantStock>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
            ),
            _ => None,
        }))
    }
}
