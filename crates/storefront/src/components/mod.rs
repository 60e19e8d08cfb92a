//! Presentational view models rendered by page templates.
//!
//! Each component turns a domain record into display-ready values; the
//! matching partial under `templates/partials/` only prints them.

pub mod artwork_card;
pub mod product_card;
pub mod toast;

pub use artwork_card::ArtworkCardView;
pub use product_card::{CollectionBadge, CollectionStyle, EditionInfo, HoverReveal, ProductCardView};
pub use toast::{Toast, ToastPosition, ToastStatus};
