//! Product card shown in shop listings.
//!
//! Derives everything the card displays from a [`Product`] and its optional
//! [`CollectionTag`]: links, price lines, edition text, the collection badge
//! and its styling, and the secondary image revealed on hover. The CSS
//! for the collection and hover states is generated here too and served
//! with the theme.

use std::fmt::Write as _;

use tanrlemn_core::{CollectionTag, Product};

/// Collection that gets its own badge label and styling.
const EXCLUSIVE: &str = "Exclusive";
/// Collection rendered without a border or badge background.
const GENERAL: &str = "General";

/// Visual treatment selected by the collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStyle {
    Exclusive,
    General,
    Other,
}

impl CollectionStyle {
    pub const ALL: [Self; 3] = [Self::Exclusive, Self::General, Self::Other];

    /// Pick the style for a capitalized collection name.
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        match name {
            EXCLUSIVE => Self::Exclusive,
            GENERAL => Self::General,
            _ => Self::Other,
        }
    }

    /// Bottom border of the primary image.
    #[must_use]
    pub const fn image_border(self) -> &'static str {
        match self {
            Self::Exclusive => "var(--exclusive-border)",
            Self::General => "none",
            Self::Other => "var(--collection-border)",
        }
    }

    /// Background of the collection badge.
    #[must_use]
    pub const fn tag_background(self) -> &'static str {
        match self {
            Self::Exclusive => "var(--orange-lightest)",
            Self::General => "transparent",
            Self::Other => "var(--pink-light)",
        }
    }

    /// Border of the collection badge.
    #[must_use]
    pub const fn tag_border(self) -> &'static str {
        match self {
            Self::Exclusive => "1px solid var(--orange-mid)",
            Self::General => "var(--blue-light-border)",
            Self::Other => "none",
        }
    }

    /// BEM modifier carried by the card and badge markup.
    #[must_use]
    pub const fn modifier(self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::General => "general",
            Self::Other => "collection",
        }
    }

    /// Border and badge rules for every collection style.
    #[must_use]
    pub fn stylesheet() -> String {
        let mut css = String::new();
        for style in Self::ALL {
            let modifier = style.modifier();
            let _ = writeln!(
                css,
                ".product-card--{modifier} .product-card__primary {{ border-bottom: {}; }}",
                style.image_border()
            );
            let _ = writeln!(
                css,
                ".collection-tag--{modifier} {{ background: {}; border: {}; }}",
                style.tag_background(),
                style.tag_border()
            );
        }
        css
    }
}

/// Collection badge under the card body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionBadge {
    /// Collection name with the first letter upper-cased.
    pub name: String,
    /// Badge text, e.g. "Exclusive Collection – Hug & Up".
    pub label: String,
    pub href: String,
    pub style: CollectionStyle,
}

impl CollectionBadge {
    #[must_use]
    pub fn new(tag: &CollectionTag) -> Self {
        let name = capitalize(&tag.collection);
        let style = CollectionStyle::for_name(&name);
        let label = if style == CollectionStyle::Exclusive {
            format!("{name} Collection – Hug & Up")
        } else {
            format!("{name} Collection")
        };
        let href = format!("/shop/collections/{}", name.to_lowercase());

        Self {
            name,
            label,
            href,
            style,
        }
    }
}

/// Edition availability lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionInfo {
    pub limited: bool,
    /// Upper-cased heading line.
    pub label: &'static str,
    pub detail: String,
}

impl EditionInfo {
    #[must_use]
    pub fn for_product(product: &Product) -> Self {
        if !product.limited_edition {
            return Self {
                limited: false,
                label: "General release",
                detail: "Unlimited prints available".to_string(),
            };
        }

        let prints = product
            .num_editions
            .map_or_else(|| "Limited".to_string(), |n| n.to_string());
        let detail = match product.num_available {
            Some(remaining) => format!("{prints} prints ({remaining} remaining)"),
            None => format!("{prints} prints"),
        };

        Self {
            limited: true,
            label: "Limited edition",
            detail,
        }
    }
}

/// Hover state of the card's image stack.
///
/// The secondary image sits on top of the primary one at opacity 0 and
/// fades in while the pointer is over the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverReveal {
    hovering: bool,
}

impl HoverReveal {
    /// Pointer entered the card.
    pub const fn enter(&mut self) {
        self.hovering = true;
    }

    /// Pointer left the card.
    pub const fn leave(&mut self) {
        self.hovering = false;
    }

    #[must_use]
    pub const fn is_hovering(self) -> bool {
        self.hovering
    }

    /// Opacity of the secondary image.
    #[must_use]
    pub fn secondary_opacity(self) -> f32 {
        if self.is_hovering() { 1.0 } else { 0.0 }
    }

    /// Class applied to the secondary image; `main.css` transitions
    /// opacity between the two states.
    #[must_use]
    pub const fn css_state(self) -> &'static str {
        if self.is_hovering() { "is-revealed" } else { "" }
    }

    /// Opacity rules for the secondary image at rest and revealed.
    #[must_use]
    pub fn stylesheet() -> String {
        let rest = Self::default();
        let mut revealed = rest;
        revealed.enter();
        format!(
            ".product-card__secondary {{ opacity: {}; }}\n\
             .product-card__secondary.{} {{ opacity: {}; }}\n",
            rest.secondary_opacity(),
            revealed.css_state(),
            revealed.secondary_opacity()
        )
    }
}

/// Everything a product card renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCardView {
    pub href: String,
    pub title: String,
    pub image_alt: String,
    pub primary_image: String,
    /// Shown on hover; absent when the product has no extra images.
    pub secondary_image: Option<String>,
    /// Regular price, e.g. "$40.00".
    pub price: String,
    /// Active sale price, e.g. "$12.50".
    pub sale_price: Option<String>,
    pub edition: EditionInfo,
    pub collection: Option<CollectionBadge>,
    pub hover: HoverReveal,
}

impl ProductCardView {
    /// Build a card for a product shown under an optional collection.
    #[must_use]
    pub fn new(product: &Product, collection: Option<&CollectionTag>) -> Self {
        Self {
            href: format!("/shop/{}", product.slug),
            title: product.title.clone(),
            image_alt: format!("image for {}", product.title),
            primary_image: product.small_thumbnail.clone(),
            secondary_image: product.additional_images().first().cloned(),
            price: product.list_price().display(),
            sale_price: product.sale_price().map(|p| p.display()),
            edition: EditionInfo::for_product(product),
            collection: collection.map(CollectionBadge::new),
            hover: HoverReveal::default(),
        }
    }

    /// Whether the regular price is struck through.
    #[must_use]
    pub const fn is_discounted(&self) -> bool {
        self.sale_price.is_some()
    }

    /// Card border modifier; cards outside any collection use "none".
    #[must_use]
    pub fn style_modifier(&self) -> &'static str {
        self.collection
            .as_ref()
            .map_or("none", |badge| badge.style.modifier())
    }
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self::new(product, product.collection_tag().as_ref())
    }
}

/// Upper-case the first character, leaving the rest untouched.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
