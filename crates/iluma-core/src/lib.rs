//! Domain model and pure catalog logic for the iluma storefront.
//!
//! Everything in this crate is synchronous and free of network I/O so that
//! every consumer (listing route, detail route, similar-products route, CLI)
//! shares one implementation of product normalization, filtering and sorting.

pub mod app_config;
pub mod cart;
pub mod category;
pub mod config;
pub mod facets;
pub mod filter;
pub mod highlight;
pub mod normalize;
pub mod orders;
pub mod products;
pub mod query;
pub mod sort;
pub mod stock;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, TelegramConfig};
pub use cart::{Cart, CartItem, CartVariant, FavoriteItem, Wishlist, CART_KEY, FAVORITES_KEY};
pub use category::Category;
pub use config::{load_app_config, load_app_config_from_env};
pub use facets::{load_facets, CategoryFacets, FacetDef, FacetKind, FacetOption, FacetsFile};
pub use filter::{apply_filters, matches, FilterSet, PriceRange};
pub use highlight::{is_highlighted, select_highlighted, Highlight};
pub use normalize::{normalize_product, parse_numeric_or_zero};
pub use orders::{
    format_order_message, format_rub, ContactDetails, DeliveryAddress, OrderRequest, OrderedItem,
    MAX_ITEM_QUANTITY,
};
pub use products::{
    product_slug, NormalizedProduct, ProductId, RawCategory, RawProduct, RawVariantStock, Variant,
    VariantKind,
};
pub use query::{paginate, run_query, CatalogPage, CatalogQuery, SearchRequest};
pub use sort::{sort_products, SortKey};
pub use stock::resolve_stock;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read facets file {path}: {source}")]
    FacetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse facets file: {0}")]
    FacetsFileParse(#[from] serde_yaml::Error),

    #[error("facets validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown showcase: {0}")]
    UnknownHighlight(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}
