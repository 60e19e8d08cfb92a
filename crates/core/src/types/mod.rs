//! Core types for the gallery and shop.

pub mod artwork;
pub mod id;
pub mod price;
pub mod product;
pub mod profile;

pub use artwork::Artwork;
pub use id::*;
pub use price::Price;
pub use product::{CollectionTag, Product};
pub use profile::{Profile, ProfileUpsert};
