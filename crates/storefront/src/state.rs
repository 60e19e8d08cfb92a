//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::LoadingContext;
use crate::config::StorefrontConfig;
use crate::middleware::security_headers::content_security_policy;
use crate::supabase::SupabaseClient;
use crate::theme::ThemeProvider;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    supabase: SupabaseClient,
    loading: LoadingContext,
    theme: ThemeProvider,
    csp: String,
}

impl AppState {
    /// Create the state with a backend client built from the config.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let supabase = SupabaseClient::new(&config.supabase, config.catalog_cache_ttl);
        Self::with_parts(config, supabase, ThemeProvider::default())
    }

    /// Create the state from already-built parts.
    #[must_use]
    pub fn with_parts(
        config: StorefrontConfig,
        supabase: SupabaseClient,
        theme: ThemeProvider,
    ) -> Self {
        let csp = content_security_policy(&config.supabase.origin());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                loading: LoadingContext::new(),
                theme,
                csp,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Process-wide loading indicator for catalog fetches.
    #[must_use]
    pub fn loading(&self) -> &LoadingContext {
        &self.inner.loading
    }

    #[must_use]
    pub fn theme(&self) -> &ThemeProvider {
        &self.inner.theme
    }

    /// Content-Security-Policy header value, computed once.
    #[must_use]
    pub fn content_security_policy(&self) -> &str {
        &self.inner.csp
    }
}
