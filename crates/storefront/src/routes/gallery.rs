//! Artwork gallery page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::catalog::CatalogLoader;
use crate::components::ArtworkCardView;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Gallery page template.
#[derive(Template, WebTemplate)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub signed_in: bool,
    pub artworks: Vec<ArtworkCardView>,
}

/// Display every artwork in a masonry grid.
///
/// A backend failure renders the same page as an empty gallery.
#[instrument(skip(state, user))]
pub async fn index(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    let mut loader = CatalogLoader::new();
    let artworks = loader
        .load(state.loading(), state.supabase().list_artworks())
        .await
        .iter()
        .map(ArtworkCardView::from)
        .collect::<Vec<_>>();

    tracing::debug!(count = artworks.len(), "Rendering gallery");

    GalleryTemplate {
        signed_in: user.is_some(),
        artworks,
    }
}
