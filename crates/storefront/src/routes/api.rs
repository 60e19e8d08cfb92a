//! JSON API endpoints.
//!
//! Field names follow the backend's column names, so the bodies match what
//! the backend itself returns.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use tanrlemn_core::{Artwork, Product, Profile};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Body of `GET /api/supabase/getArtworks`.
#[derive(Debug, Serialize)]
pub struct ArtworksResponse {
    pub artworks: Vec<Artwork>,
}

/// Body of `GET /api/supabase/getProducts`.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// Body of `GET /api/supabase/getProfile`.
///
/// A failed read is reported in `error` with an empty `data`, mirroring the
/// backend client's `{ data, error }` result shape.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub data: Vec<Profile>,
    pub error: Option<String>,
}

/// Body of `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub loading: bool,
    pub in_flight: usize,
}

/// List every artwork.
///
/// # Errors
///
/// Returns `502` when the backend fails.
#[instrument(skip(state))]
pub async fn get_artworks(State(state): State<AppState>) -> Result<Json<ArtworksResponse>, AppError> {
    let _guard = state.loading().begin();
    let artworks = state.supabase().list_artworks().await?;
    Ok(Json(ArtworksResponse { artworks }))
}

/// List every product.
///
/// # Errors
///
/// Returns `502` when the backend fails.
#[instrument(skip(state))]
pub async fn get_products(State(state): State<AppState>) -> Result<Json<ProductsResponse>, AppError> {
    let _guard = state.loading().begin();
    let products = state.supabase().list_products().await?;
    Ok(Json(ProductsResponse { products }))
}

/// Read the signed-in user's profile rows.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<ProfileResponse> {
    let response = match state
        .supabase()
        .fetch_profile(user.id, &user.access_token)
        .await
    {
        Ok(data) => ProfileResponse { data, error: None },
        Err(e) => {
            tracing::warn!(error = %e, "Profile read failed");
            ProfileResponse {
                data: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    };
    Json(response)
}

/// Report whether catalog fetches are in flight.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let loading = state.loading();
    Json(StatusResponse {
        loading: loading.is_loading(),
        in_flight: loading.in_flight(),
    })
}
