//! Print shop pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use tanrlemn_core::CollectionTag;

use crate::catalog::CatalogLoader;
use crate::components::{CollectionBadge, ProductCardView};
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;
use crate::supabase::SupabaseError;

/// Product listing template, shared by the shop and collection pages.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub signed_in: bool,
    pub heading: String,
    pub collection: Option<CollectionBadge>,
    pub products: Vec<ProductCardView>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/show.html")]
pub struct ProductShowTemplate {
    pub signed_in: bool,
    pub product: ProductCardView,
    pub images: Vec<String>,
}

/// Unknown product template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub signed_in: bool,
    pub slug: String,
}

/// Display every product.
#[instrument(skip(state, user))]
pub async fn index(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    let mut loader = CatalogLoader::new();
    let products = loader
        .load(state.loading(), state.supabase().list_products())
        .await
        .iter()
        .map(ProductCardView::from)
        .collect();

    ShopIndexTemplate {
        signed_in: user.is_some(),
        heading: "Shop prints".to_string(),
        collection: None,
        products,
    }
}

/// Display the products in one collection.
#[instrument(skip(state, user))]
pub async fn collection(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(collection): Path<String>,
) -> impl IntoResponse {
    let tag = CollectionTag::new(collection.to_lowercase());
    let badge = CollectionBadge::new(&tag);

    let mut loader = CatalogLoader::new();
    let products = loader
        .load(
            state.loading(),
            state.supabase().list_products_in_collection(&tag.collection),
        )
        .await
        .iter()
        .map(|product| ProductCardView::new(product, Some(&tag)))
        .collect();

    ShopIndexTemplate {
        signed_in: user.is_some(),
        heading: badge.label.clone(),
        collection: Some(badge),
        products,
    }
}

/// Display one product.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let signed_in = user.is_some();

    let product = match state.supabase().get_product_by_slug(&slug).await {
        Ok(product) => product,
        Err(SupabaseError::NotFound(_)) => {
            return Ok((
                StatusCode::NOT_FOUND,
                ProductNotFoundTemplate { signed_in, slug },
            )
                .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let images = std::iter::once(product.small_thumbnail.clone())
        .chain(product.additional_images().iter().cloned())
        .collect();

    Ok(ProductShowTemplate {
        signed_in,
        product: ProductCardView::from(&product),
        images,
    }
    .into_response())
}
