//! storefront: browse a product catalog API from your terminal.
//!
//! The `storefront` binary (feature `cli`, on by default) opens a TUI with
//! two routes, `/products` and `/product-details/{id}`. This library
//! re-exports the catalog model and fetch functions for use elsewhere.
//!
//! ```rust,no_run
//! use storefront::{CatalogSource, ListQuery, fetch_product_list};
//!
//! let page = fetch_product_list(&CatalogSource::default(), &ListQuery::default())?;
//! for product in &page.products {
//!     println!("{} {}", product.id, product.title);
//! }
//! # Ok::<(), storefront::FetchError>(())
//! ```

pub use sfhelper_catalog::{
    CatalogSource, DEFAULT_API_URL, EXCLUDED_DETAIL_KEYS, FetchError, ListQuery, ProductDetail,
    ProductPage, ProductSummary, RemoteCatalog, SortOrder, collection_url, display_value,
    fetch_product_detail, fetch_product_list, item_url,
};
