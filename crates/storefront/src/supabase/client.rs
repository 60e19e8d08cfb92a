//! Supabase client implementation.
//!
//! Catalog tables are read with the anon key and cached using `moka`.
//! Profile reads and writes carry the signed-in user's access token so the
//! backend's row-level policies apply.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::{ParseError, Url};
use uuid::Uuid;

use tanrlemn_core::{Artwork, Product, Profile, ProfileUpsert, UserId};

use super::SupabaseError;
use super::cache::{CacheKey, CacheValue};
use super::types::{ApiErrorBody, AuthSession, PasswordGrant, StoredObject};
use crate::config::SupabaseConfig;

/// Maximum number of cached catalog entries.
const CACHE_CAPACITY: u64 = 1000;

/// How much of an unexpected body to keep in logs.
const LOG_BODY_CHARS: usize = 500;

// =============================================================================
// SupabaseClient
// =============================================================================

/// Client for the project's REST, auth and storage APIs.
///
/// Cheap to clone; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    avatar_bucket: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl SupabaseClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &SupabaseConfig, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.clone(),
                anon_key: config.anon_key.clone(),
                avatar_bucket: config.avatar_bucket.clone(),
                cache,
            }),
        }
    }

    /// Build a URL under the project root from path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SupabaseError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SupabaseError::Url(ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a PostgREST table with the given query pairs.
    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, SupabaseError> {
        let mut url = self.endpoint(&["rest", "v1", table])?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    /// Attach the API key and bearer token.
    ///
    /// Requests without a user token authenticate as the anon role.
    fn authorize(&self, request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        let anon_key = self.inner.anon_key.expose_secret();
        request
            .header("apikey", anon_key)
            .bearer_auth(access_token.unwrap_or(anon_key))
    }

    /// Send a request and return the raw body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, SupabaseError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SupabaseError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(ApiErrorBody::into_message)
            .unwrap_or_else(|| format!("HTTP {status}"));

        tracing::warn!(
            status = %status,
            body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
            "Backend returned non-success status"
        );

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                SupabaseError::Unauthorized(message)
            }
            _ => SupabaseError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Send a request and parse the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SupabaseError> {
        let body = self.send(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
                "Failed to parse backend response"
            );
            SupabaseError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get every artwork, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_artworks(&self) -> Result<Vec<Artwork>, SupabaseError> {
        if let Some(CacheValue::Artworks(artworks)) =
            self.inner.cache.get(&CacheKey::Artworks).await
        {
            debug!("Cache hit for artworks");
            return Ok(artworks);
        }

        let url = self.table_url("artworks", &[("select", "*"), ("order", "id.asc")])?;
        let request = self.authorize(self.inner.client.get(url), None);
        let artworks: Vec<Artwork> = self.execute(request).await?;

        self.inner
            .cache
            .insert(CacheKey::Artworks, CacheValue::Artworks(artworks.clone()))
            .await;

        Ok(artworks)
    }

    /// Get every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, SupabaseError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.table_url("products", &[("select", "*"), ("order", "id.asc")])?;
        let request = self.authorize(self.inner.client.get(url), None);
        let products: Vec<Product> = self.execute(request).await?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get the products tagged with a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(collection = %collection))]
    pub async fn list_products_in_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<Product>, SupabaseError> {
        let collection = collection.to_lowercase();
        let cache_key = CacheKey::Collection(collection.clone());

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(products);
        }

        let filter = format!("eq.{collection}");
        let url = self.table_url(
            "products",
            &[("select", "*"), ("collection", filter.as_str()), ("order", "id.asc")],
        )?;
        let request = self.authorize(self.inner.client.get(url), None);
        let products: Vec<Product> = self.execute(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has the slug, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, SupabaseError> {
        let cache_key = CacheKey::Product(slug.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let filter = format!("eq.{slug}");
        let url = self.table_url("products", &[("select", "*"), ("slug", filter.as_str()), ("limit", "1")])?;
        let request = self.authorize(self.inner.client.get(url), None);
        let rows: Vec<Product> = self.execute(request).await?;

        let product = rows
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("product {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Profile Methods
    // =========================================================================

    /// Read the profile rows for a user.
    ///
    /// Returns the rows as PostgREST sends them: empty when the user has
    /// never saved a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the token is rejected.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn fetch_profile(
        &self,
        user_id: UserId,
        access_token: &str,
    ) -> Result<Vec<Profile>, SupabaseError> {
        let filter = format!("eq.{user_id}");
        let url = self.table_url("profiles", &[("select", "*"), ("id", filter.as_str())])?;
        let request = self.authorize(self.inner.client.get(url), Some(access_token));
        self.execute(request).await
    }

    /// Insert or update a profile row keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the token is rejected.
    #[instrument(skip(self, upsert, access_token), fields(user_id = %upsert.id))]
    pub async fn upsert_profile(
        &self,
        upsert: &ProfileUpsert,
        access_token: &str,
    ) -> Result<(), SupabaseError> {
        let url = self.table_url("profiles", &[("on_conflict", "id")])?;
        let request = self
            .authorize(self.inner.client.post(url), Some(access_token))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(upsert);

        self.send(request).await?;
        debug!("Profile upserted");
        Ok(())
    }

    // =========================================================================
    // Storage Methods
    // =========================================================================

    /// Upload an avatar image and return its public URL.
    ///
    /// Objects are stored under `<user id>/<random uuid>.<extension>` so a
    /// user's uploads never collide and the backend can scope write access
    /// by folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected or the request fails.
    #[instrument(skip(self, bytes, access_token), fields(user_id = %user_id, size = bytes.len()))]
    pub async fn upload_avatar(
        &self,
        user_id: UserId,
        extension: &str,
        content_type: &str,
        bytes: Vec<u8>,
        access_token: &str,
    ) -> Result<String, SupabaseError> {
        let folder = user_id.to_string();
        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let bucket = self.inner.avatar_bucket.as_str();

        let url = self.endpoint(&["storage", "v1", "object", bucket, &folder, &file_name])?;
        let request = self
            .authorize(self.inner.client.post(url), Some(access_token))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes);

        let stored: StoredObject = self.execute(request).await?;
        debug!(key = ?stored.key, "Avatar stored");

        let public_url = self.endpoint(&[
            "storage", "v1", "object", "public", bucket, &folder, &file_name,
        ])?;
        Ok(public_url.to_string())
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Api` with the backend's message for bad credentials, or an
    /// error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let mut url = self.endpoint(&["auth", "v1", "token"])?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let request = self
            .authorize(self.inner.client.post(url), None)
            .json(&PasswordGrant { email, password });
        self.execute(request).await
    }

    /// Revoke the session behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.endpoint(&["auth", "v1", "logout"])?;
        let request = self.authorize(self.inner.client.post(url), Some(access_token));
        self.send(request).await?;
        Ok(())
    }

    /// Check that the backend's auth service answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), SupabaseError> {
        let url = self.endpoint(&["auth", "v1", "health"])?;
        let request = self.authorize(self.inner.client.get(url), None);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> SupabaseClient {
        SupabaseClient::new(
            &SupabaseConfig {
                url: Url::parse(base).unwrap(),
                anon_key: SecretString::from("anon"),
                avatar_bucket: "avatars".to_string(),
            },
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_table_url_encodes_filters() {
        let client = client("https://abcd.supabase.co");
        let url = client
            .table_url("products", &[("select", "*"), ("slug", "eq.night swim")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abcd.supabase.co/rest/v1/products?select=*&slug=eq.night+swim"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("http://127.0.0.1:54321/project");
        let url = client.endpoint(&["auth", "v1", "token"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:54321/project/auth/v1/token");
    }

    #[test]
    fn test_endpoint_on_bare_host() {
        let client = client("https://abcd.supabase.co/");
        let url = client
            .endpoint(&["storage", "v1", "object", "avatars", "a", "b.png"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abcd.supabase.co/storage/v1/object/avatars/a/b.png"
        );
    }
}
