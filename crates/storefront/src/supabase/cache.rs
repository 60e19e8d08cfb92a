//! Cache types for catalog responses.

use tanrlemn_core::{Artwork, Product};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Artworks,
    Products,
    Product(String),
    Collection(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Artworks(Vec<Artwork>),
    Products(Vec<Product>),
    Product(Box<Product>),
}
