//! Shop product records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A print listed in the shop.
///
/// Prices are stored as plain numerics in the backend and are always USD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
    /// Primary listing image.
    pub small_thumbnail: String,
    #[serde(default)]
    pub additional_images: Option<Vec<String>>,
    #[serde(default)]
    pub limited_edition: bool,
    #[serde(default)]
    pub num_editions: Option<u32>,
    #[serde(default)]
    pub num_available: Option<u32>,
    /// Lowercase collection name this print belongs to, if any.
    #[serde(default)]
    pub collection: Option<String>,
}

impl Product {
    /// The regular price.
    #[must_use]
    pub const fn list_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// The sale price, when the product is on sale and one is set.
    #[must_use]
    pub fn sale_price(&self) -> Option<Price> {
        if self.on_sale {
            self.sale_price.map(Price::usd)
        } else {
            None
        }
    }

    /// Images beyond the thumbnail, empty when there are none.
    #[must_use]
    pub fn additional_images(&self) -> &[String] {
        self.additional_images.as_deref().unwrap_or_default()
    }

    /// The collection tag, if the product is in a collection.
    #[must_use]
    pub fn collection_tag(&self) -> Option<CollectionTag> {
        self.collection
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(CollectionTag::new)
    }
}

/// Tag naming the collection a product is displayed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionTag {
    pub collection: String,
}

impl CollectionTag {
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json(on_sale: bool) -> String {
        format!(
            r#"{{
                "id": 9,
                "slug": "night-swim",
                "title": "Night Swim",
                "price": 40,
                "on_sale": {on_sale},
                "sale_price": 12.5,
                "small_thumbnail": "https://cdn.example.com/ns.jpg",
                "additional_images": null,
                "limited_edition": true,
                "num_editions": 50,
                "num_available": 12,
                "collection": "exclusive"
            }}"#
        )
    }

    #[test]
    fn test_deserialize_numeric_prices() {
        let product: Product = serde_json::from_str(&product_json(true)).unwrap();
        assert_eq!(product.price, Decimal::from(40));
        assert_eq!(product.sale_price, Some(Decimal::new(125, 1)));
        assert!(product.additional_images().is_empty());
    }

    #[test]
    fn test_sale_price_only_when_on_sale() {
        let on_sale: Product = serde_json::from_str(&product_json(true)).unwrap();
        assert_eq!(on_sale.sale_price().map(|p| p.display()).as_deref(), Some("$12.50"));

        let full_price: Product = serde_json::from_str(&product_json(false)).unwrap();
        assert_eq!(full_price.sale_price(), None);
        assert_eq!(full_price.list_price().display(), "$40.00");
    }

    #[test]
    fn test_collection_tag() {
        let product: Product = serde_json::from_str(&product_json(true)).unwrap();
        let tag = product.collection_tag().unwrap();
        assert_eq!(tag, CollectionTag::new("exclusive"));
    }

    #[test]
    fn test_empty_collection_is_no_tag() {
        let mut product: Product = serde_json::from_str(&product_json(true)).unwrap();
        product.collection = Some(String::new());
        assert_eq!(product.collection_tag(), None);
    }
}
