//! Supabase REST, Auth and Storage client.
//!
//! # Architecture
//!
//! - Plain `reqwest` calls against the project's PostgREST (`/rest/v1`),
//!   GoTrue (`/auth/v1`) and Storage (`/storage/v1`) endpoints
//! - The backend is source of truth - NO local database, direct API calls
//! - In-memory caching via `moka` for catalog reads (artworks, products);
//!   profile reads always go to the backend
//!
//! # Example
//!
//! ```rust,ignore
//! use tanrlemn_storefront::supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase, config.catalog_cache_ttl);
//!
//! let artworks = client.list_artworks().await?;
//! let session = client.sign_in_with_password("ada@example.com", "hunter2").await?;
//! let rows = client.fetch_profile(session.user.id, &session.access_token).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::SupabaseClient;
pub use types::{AuthSession, AuthUser};

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A URL could not be built from the project URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Row or object not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The access token was rejected or is missing.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl SupabaseError {
    /// HTTP status reported by the backend, when there was a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Unauthorized(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            Self::Http(_) | Self::Parse(_) | Self::Url(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_backend_message_only() {
        let err = SupabaseError::Api {
            status: 409,
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint"
        );
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_not_found_display() {
        let err = SupabaseError::NotFound("product night-swim".to_string());
        assert_eq!(err.to_string(), "Not found: product night-swim");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_rate_limited_error() {
        let err = SupabaseError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
