//! Gallery artwork card.

use tanrlemn_core::Artwork;

/// What a gallery tile renders for one artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkCardView {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub alt: String,
    pub styles: Vec<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
}

impl From<&Artwork> for ArtworkCardView {
    fn from(artwork: &Artwork) -> Self {
        Self {
            id: artwork.id.as_i64(),
            title: artwork.title.clone(),
            image_url: artwork.image_url.clone(),
            alt: format!("image for {}", artwork.title),
            styles: artwork.styles().to_vec(),
            year: artwork.year,
            description: artwork
                .description
                .as_ref()
                .filter(|d| !d.trim().is_empty())
                .cloned(),
        }
    }
}

impl ArtworkCardView {
    /// Style tags joined for the caption, e.g. "portrait · oil".
    #[must_use]
    pub fn style_line(&self) -> String {
        self.styles.join(" · ")
    }
}

#[cfg(test)]
mod tests {
    use tanrlemn_core::ArtworkId;

    use super::*;

    #[test]
    fn test_card_from_artwork() {
        let artwork = Artwork {
            id: ArtworkId::new(7),
            title: "Blue Hour".to_string(),
            image_url: "https://cdn.example.com/blue.jpg".to_string(),
            styles: Some(vec!["portrait".to_string(), "oil".to_string()]),
            description: Some("  ".to_string()),
            year: Some(2016),
        };

        let card = ArtworkCardView::from(&artwork);
        assert_eq!(card.id, 7);
        assert_eq!(card.alt, "image for Blue Hour");
        assert_eq!(card.style_line(), "portrait · oil");
        assert_eq!(card.description, None);
        assert_eq!(card.year, Some(2016));
    }

    #[test]
    fn test_card_without_styles() {
        let artwork = Artwork {
            id: ArtworkId::new(1),
            title: "Untitled".to_string(),
            image_url: "https://cdn.example.com/u.jpg".to_string(),
            styles: None,
            description: None,
            year: None,
        };

        let card = ArtworkCardView::from(&artwork);
        assert!(card.styles.is_empty());
        assert_eq!(card.style_line(), "");
    }
}
