//! Fetch-then-render lifecycle for catalog listing pages.
//!
//! A listing page (gallery, shop) owns one [`CatalogLoader`]. The loader
//! moves `Idle → Loading → Loaded` exactly once: it marks the shared
//! [`LoadingContext`] while the fetch runs and keeps the result for the
//! template. A failed fetch is logged and loads as an empty list, so the
//! page renders the same as an empty catalog.

mod loading;

pub use loading::{LoadingContext, LoadingGuard};

use std::fmt::Display;
use std::future::Future;

/// Where a loader is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadPhase<T> {
    Idle,
    Loading,
    Loaded(Vec<T>),
}

/// Loads one catalog list and holds it for rendering.
#[derive(Debug, Clone)]
pub struct CatalogLoader<T> {
    phase: LoadPhase<T>,
}

impl<T> Default for CatalogLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CatalogLoader<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: LoadPhase::Idle,
        }
    }

    /// Run `fetch` unless the list is already loaded, then return the items.
    ///
    /// The loading context is set for exactly the duration of the fetch.
    pub async fn load<F, E>(&mut self, loading: &LoadingContext, fetch: F) -> &[T]
    where
        F: Future<Output = Result<Vec<T>, E>>,
        E: Display,
    {
        if !self.is_loaded() {
            let guard = loading.begin();
            self.phase = LoadPhase::Loading;

            let items = match fetch.await {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!(error = %e, "Catalog fetch failed, rendering empty list");
                    Vec::new()
                }
            };

            self.phase = LoadPhase::Loaded(items);
            guard.clear();
        }

        self.items()
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self.phase, LoadPhase::Loaded(_))
    }

    /// Loaded items; empty before the load completes.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match &self.phase {
            LoadPhase::Loaded(items) => items,
            LoadPhase::Idle | LoadPhase::Loading => &[],
        }
    }
}
