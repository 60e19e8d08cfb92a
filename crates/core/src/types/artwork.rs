//! Gallery artwork records.

use serde::{Deserialize, Serialize};

use super::id::ArtworkId;

/// A piece shown in the gallery.
///
/// Created and edited with the backend's admin tooling; the storefront only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    /// Public URL of the full image.
    pub image_url: String,
    /// Style tags (e.g., "portrait", "abstract"). Absent on older rows.
    #[serde(default)]
    pub styles: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl Artwork {
    /// Style tags, empty when the row has none.
    #[must_use]
    pub fn styles(&self) -> &[String] {
        self.styles.as_deref().unwrap_or_default()
    }
}
