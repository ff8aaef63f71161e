//! Client-local cart and wishlist state.
//!
//! Both are persisted as JSON blobs under the keys [`CART_KEY`] and
//! [`FAVORITES_KEY`] of whatever key-value store the client has. A corrupt
//! blob loads as an empty collection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::{NormalizedProduct, VariantKind};

pub const CART_KEY: &str = "cart";
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartVariant {
    #[serde(rename = "type")]
    pub kind: VariantKind,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<CartVariant>,
}

impl CartItem {
    /// `"{ref}-{variant type}"`, or `"{ref}-default"` without a variant.
    #[must_use]
    pub fn composite_id(reference: &str, variant: Option<VariantKind>) -> String {
        let suffix = variant.map_or("default", VariantKind::as_str);
        format!("{reference}-{suffix}")
    }

    /// Builds a line for `quantity` units of one variant of `product`.
    ///
    /// Returns `None` when the product has no such variant or no `ref`/`id`
    /// to identify it by.
    #[must_use]
    pub fn from_product(
        product: &NormalizedProduct,
        kind: VariantKind,
        quantity: u32,
    ) -> Option<Self> {
        let variant = product.variant(kind)?;
        let reference = product
            .reference
            .clone()
            .or_else(|| product.id.as_ref().map(ToString::to_string))?;
        Some(Self {
            id: Self::composite_id(&reference, Some(kind)),
            reference,
            name: variant.name.clone(),
            price: Decimal::try_from(variant.price).unwrap_or_default(),
            quantity,
            image: variant.image_url.clone(),
            variant: Some(CartVariant {
                kind,
                name: variant.name.clone(),
            }),
        })
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Parses a stored blob; anything unreadable yields an empty cart.
    #[must_use]
    pub fn from_blob(blob: Option<&str>) -> Self {
        load_blob(blob, CART_KEY)
    }

    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the cart cannot be serialized.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Adds `item`, merging quantities with an existing line of the same id.
    pub fn add_item(&mut self, mut item: CartItem) {
        item.id = CartItem::composite_id(&item.reference, item.variant.as_ref().map(|v| v.kind));
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    /// Sets the quantity of line `id`; zero or less removes the line.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) {
        let Ok(quantity) = u32::try_from(quantity) else {
            if quantity <= 0 {
                self.remove_item(id);
            }
            return;
        };
        if quantity == 0 {
            self.remove_item(id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.line_total()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FavoriteItem {
    /// Returns `None` when the product has neither `ref` nor `id`.
    #[must_use]
    pub fn from_product(product: &NormalizedProduct) -> Option<Self> {
        let id = product
            .reference
            .clone()
            .or_else(|| product.id.as_ref().map(ToString::to_string))?;
        Some(Self {
            id,
            reference: product.reference.clone(),
            name: product.display_name().to_string(),
            price: Decimal::try_from(product.display_price()).unwrap_or_default(),
            image: product.display_image().map(str::to_string),
            category: product.kind.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    pub items: Vec<FavoriteItem>,
}

impl Wishlist {
    #[must_use]
    pub fn from_blob(blob: Option<&str>) -> Self {
        load_blob(blob, FAVORITES_KEY)
    }

    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the wishlist cannot be serialized.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Adds `item` unless an entry with the same id is already present.
    /// Returns `true` when the item was added.
    pub fn add(&mut self, item: FavoriteItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn load_blob<T>(blob: Option<&str>, key: &str) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    let Some(blob) = blob.filter(|b| !b.trim().is_empty()) else {
        return T::default();
    };
    serde_json::from_str(blob).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "discarding unreadable stored blob");
        T::default()
    })
}
