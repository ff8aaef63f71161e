//! Cached catalog reads and order checkout for the iluma storefront.
//!
//! Sits between the pure pipeline in `iluma-core` and the HTTP/CLI
//! surfaces: category lists are cached for a short TTL, resolved product
//! pages for longer, and stock re-checks always go to the upstream.

pub mod cache;
pub mod checkout;
pub mod error;
pub mod service;

pub use cache::TtlCache;
pub use checkout::{CheckoutService, PlacedOrder};
pub use error::{CatalogError, CheckoutError};
pub use service::{
    CatalogService, CatalogSettings, ProductCard, StockCheckItem, StockStatus,
    DEFAULT_SIMILAR_LIMIT,
};
