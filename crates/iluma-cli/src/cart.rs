//! `cart` and `wishlist` command handlers.
//!
//! Both lists live in the local store; only `add` talks to the upstream,
//! to resolve the product being added.

use clap::Subcommand;
use iluma_catalog::CatalogService;
use iluma_core::{Cart, CartItem, FavoriteItem, VariantKind, Wishlist};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::store::LocalStore;

/// Sub-commands available under `cart`.
#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// Add a product (by ref, id or name slug) to the cart
    Add {
        slug: String,
        /// Variant to add: pack or block
        #[arg(long, default_value = "pack", value_parser = parse_variant)]
        variant: VariantKind,
        #[arg(long, default_value = "1")]
        qty: u32,
    },
    /// Remove a cart line by its id (e.g. amber-block)
    Remove { id: String },
    /// Set the quantity of a cart line; 0 or less removes it
    SetQty {
        id: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Print the cart with totals
    Show,
    /// Empty the cart
    Clear,
}

/// Sub-commands available under `wishlist`.
#[derive(Debug, Subcommand)]
pub enum WishlistCommands {
    /// Add a product (by ref, id or name slug) to the wishlist
    Add { slug: String },
    /// Remove an entry by its id
    Remove { id: String },
    /// Print the wishlist
    Show,
    /// Empty the wishlist
    Clear,
}

pub(crate) fn parse_variant(s: &str) -> Result<VariantKind, String> {
    VariantKind::parse(s).ok_or_else(|| format!("unknown variant '{s}', expected pack or block"))
}

#[derive(Debug, Serialize)]
pub(crate) struct CartSummary {
    pub items: Vec<CartItem>,
    #[serde(rename = "totalItems")]
    pub total_items: u64,
    #[serde(rename = "totalPrice", with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.clone(),
            total_items: cart.total_items(),
            total_price: cart.total_price(),
        }
    }
}

/// Resolves `slug` and adds `qty` of one of its variants to the cart.
///
/// # Errors
///
/// Returns an error if the product cannot be found, is out of stock, has
/// no such variant, or the store cannot be written.
pub(crate) async fn add_to_cart(
    store: &LocalStore,
    catalog: &CatalogService,
    slug: &str,
    variant: VariantKind,
    qty: u32,
) -> anyhow::Result<CartSummary> {
    if qty == 0 {
        anyhow::bail!("quantity must be at least 1");
    }
    let product = catalog
        .find_product(slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product '{slug}' not found"))?;

    let in_stock = product.variant(variant).is_some_and(|v| v.nalichie);
    if !in_stock {
        anyhow::bail!("'{}' ({variant}) is out of stock", product.display_name());
    }
    let item = CartItem::from_product(&product, variant, qty).ok_or_else(|| {
        anyhow::anyhow!("'{}' has no {variant} variant", product.display_name())
    })?;

    let mut cart = store.load_cart()?;
    cart.add_item(item);
    store.save_cart(&cart)?;
    Ok(CartSummary::from(&cart))
}

/// Runs every cart command that needs no upstream access.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub(crate) fn run_local_cart(
    store: &LocalStore,
    command: &CartCommands,
) -> anyhow::Result<CartSummary> {
    let mut cart = store.load_cart()?;
    match command {
        CartCommands::Remove { id } => cart.remove_item(id),
        CartCommands::SetQty { id, qty } => cart.update_quantity(id, *qty),
        CartCommands::Clear => cart.clear(),
        CartCommands::Show => return Ok(CartSummary::from(&cart)),
        CartCommands::Add { .. } => anyhow::bail!("cart add needs the product catalog"),
    }
    store.save_cart(&cart)?;
    Ok(CartSummary::from(&cart))
}

/// # Errors
///
/// Returns an error if the product cannot be found or the store cannot be
/// written.
pub(crate) async fn add_to_wishlist(
    store: &LocalStore,
    catalog: &CatalogService,
    slug: &str,
) -> anyhow::Result<Wishlist> {
    let product = catalog
        .find_product(slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product '{slug}' not found"))?;
    let item = FavoriteItem::from_product(&product)
        .ok_or_else(|| anyhow::anyhow!("product '{slug}' has no ref or id"))?;

    let mut wishlist = store.load_wishlist()?;
    if !wishlist.add(item) {
        tracing::info!(slug, "already in wishlist");
    }
    store.save_wishlist(&wishlist)?;
    Ok(wishlist)
}

/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub(crate) fn run_local_wishlist(
    store: &LocalStore,
    command: &WishlistCommands,
) -> anyhow::Result<Wishlist> {
    let mut wishlist = store.load_wishlist()?;
    match command {
        WishlistCommands::Remove { id } => wishlist.remove(id),
        WishlistCommands::Clear => wishlist.clear(),
        WishlistCommands::Show => return Ok(wishlist),
        WishlistCommands::Add { .. } => anyhow::bail!("wishlist add needs the product catalog"),
    }
    store.save_wishlist(&wishlist)?;
    Ok(wishlist)
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
