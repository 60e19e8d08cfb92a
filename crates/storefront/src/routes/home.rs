//! Home redirect and theme stylesheet.

use axum::{
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Redirect},
};

use crate::state::AppState;

/// The gallery is the landing page.
pub async fn home() -> Redirect {
    Redirect::to("/gallery")
}

/// Serve the theme palette and the component rules built from it.
pub async fn theme_css(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/css; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        state.theme().stylesheet().to_owned(),
    )
}
