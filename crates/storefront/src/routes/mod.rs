//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                - Redirect to the gallery
//! GET  /gallery                         - Artwork gallery
//! GET  /theme.css                       - Palette as CSS custom properties
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (backend reachable)
//!
//! # Shop
//! GET  /shop                            - All products
//! GET  /shop/collections/{collection}   - Products in one collection
//! GET  /shop/{slug}                     - Product detail
//!
//! # Account (requires auth)
//! GET  /account                         - Profile summary and edit drawer
//! POST /account/profile                 - Save profile (HTMX fragment or redirect)
//! POST /account/avatar                  - Upload avatar and save profile
//!
//! # Auth
//! GET  /auth/login                      - Login page
//! POST /auth/login                      - Login action
//! POST /auth/logout                     - Logout action
//!
//! # JSON API
//! GET  /api/supabase/getArtworks        - { artworks }
//! GET  /api/supabase/getProducts        - { products }
//! GET  /api/supabase/getProfile         - { data, error } (requires auth)
//! GET  /api/status                      - Catalog loading indicator
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod gallery;
pub mod health;
pub mod home;
pub mod shop;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderMap,
    routing::{get, post},
};

use crate::state::AppState;

/// Whether the request was issued by the page script expecting a fragment.
pub(crate) fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .route("/collections/{collection}", get(shop::collection))
        .route("/{slug}", get(shop::show))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route(
            "/avatar",
            post(account::upload_avatar)
                .layer(DefaultBodyLimit::max(account::MAX_AVATAR_UPLOAD_BYTES)),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/supabase/getArtworks", get(api::get_artworks))
        .route("/supabase/getProducts", get(api::get_products))
        .route("/supabase/getProfile", get(api::get_profile))
        .route("/status", get(api::status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/gallery", get(gallery::index))
        .route("/theme.css", get(home::theme_css))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/shop", shop_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
