//! Integration test harness for the taNrleMn storefront.
//!
//! [`FakeBackend`] serves the slice of the Supabase REST, auth and storage
//! APIs the storefront calls, on an ephemeral port, and records every write.
//! [`test_state`] builds storefront state pointed at it, so tests can drive
//! the real router either in-process with `tower::ServiceExt::oneshot` or
//! over HTTP with [`spawn_storefront`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tanrlemn-integration-tests
//! ```

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;

use tanrlemn_storefront::config::{StorefrontConfig, SupabaseConfig};
use tanrlemn_storefront::state::AppState;

/// Password the fake auth service accepts.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Id of the only user the fake auth service knows.
pub const TEST_USER_ID: Uuid = Uuid::from_u128(0x2a);

/// Email of the test user.
pub const TEST_EMAIL: &str = "ada@example.com";

/// Recorded state of the fake backend.
#[derive(Debug, Default)]
pub struct BackendData {
    pub artworks: Vec<Value>,
    pub products: Vec<Value>,
    pub profiles: Vec<Value>,
    /// Every profile upsert body received, in order.
    pub upserts: Vec<Value>,
    /// Every storage object path uploaded.
    pub uploads: Vec<String>,
    /// When set, profile upserts fail with this message.
    pub upsert_error: Option<String>,
    /// When set, storage uploads fail with this message.
    pub upload_error: Option<String>,
    /// When set, catalog reads answer 500.
    pub catalog_down: bool,
}

/// Shared handle to the fake backend's data.
#[derive(Debug, Clone, Default)]
pub struct BackendHandle(Arc<Mutex<BackendData>>);

impl BackendHandle {
    /// Lock the data for reading or seeding.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the lock.
    #[allow(clippy::unwrap_used)]
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.0.lock().unwrap()
    }
}

/// A running fake backend.
pub struct FakeBackend {
    pub url: Url,
    pub handle: BackendHandle,
}

impl FakeBackend {
    /// Start the fake backend on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn start() -> Self {
        let handle = BackendHandle::default();
        let app = Router::new()
            .route("/rest/v1/artworks", get(list_artworks))
            .route("/rest/v1/products", get(list_products))
            .route("/rest/v1/profiles", get(list_profiles).post(upsert_profile))
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/logout", post(logout))
            .route("/auth/v1/health", get(health))
            .route("/storage/v1/object/{*path}", post(upload_object))
            .with_state(handle.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            handle,
        }
    }

    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.handle.data()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// An artwork row as the backend returns it.
#[must_use]
pub fn artwork_row(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "image_url": format!("https://cdn.example.com/art/{id}.jpg"),
        "styles": ["ink", "watercolor"],
        "year": 2016
    })
}

/// A product row as the backend returns it.
#[must_use]
pub fn product_row(id: i64, slug: &str, title: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "title": title,
        "price": 40.0,
        "on_sale": false,
        "sale_price": null,
        "small_thumbnail": format!("https://cdn.example.com/shop/{slug}.jpg"),
        "additional_images": [],
        "limited_edition": false,
        "num_editions": null,
        "num_available": null,
        "collection": null
    })
}

// =============================================================================
// Storefront wiring
// =============================================================================

/// Storefront config pointed at a fake backend.
#[must_use]
pub fn test_config(backend_url: &Url) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        supabase: SupabaseConfig {
            url: backend_url.clone(),
            anon_key: SecretString::from("test-anon-key"),
            avatar_bucket: "avatars".to_string(),
        },
        catalog_cache_ttl: Duration::from_secs(300),
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static"),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Storefront state pointed at a fake backend.
#[must_use]
pub fn test_state(backend: &FakeBackend) -> AppState {
    AppState::new(test_config(&backend.url))
}

/// Serve the storefront on an ephemeral port and return its address.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
#[allow(clippy::unwrap_used)]
pub async fn spawn_storefront(state: AppState) -> SocketAddr {
    let app = tanrlemn_storefront::app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// =============================================================================
// Fake backend handlers
// =============================================================================

type Params = Query<HashMap<String, String>>;

/// Value of a PostgREST `eq.` filter.
fn eq_filter<'a>(params: &'a HashMap<String, String>, column: &str) -> Option<&'a str> {
    params.get(column).and_then(|v| v.strip_prefix("eq."))
}

fn catalog_unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "catalog unavailable"})),
    )
        .into_response()
}

async fn list_artworks(State(handle): State<BackendHandle>) -> Response {
    let data = handle.data();
    if data.catalog_down {
        return catalog_unavailable();
    }
    Json(data.artworks.clone()).into_response()
}

async fn list_products(State(handle): State<BackendHandle>, Query(params): Params) -> Response {
    let data = handle.data();
    if data.catalog_down {
        return catalog_unavailable();
    }

    let rows: Vec<Value> = data
        .products
        .iter()
        .filter(|row| {
            eq_filter(&params, "slug").is_none_or(|slug| row["slug"] == slug)
                && eq_filter(&params, "collection")
                    .is_none_or(|collection| row["collection"] == collection)
        })
        .cloned()
        .collect();
    Json(rows).into_response()
}

async fn list_profiles(State(handle): State<BackendHandle>, Query(params): Params) -> Response {
    let data = handle.data();
    let rows: Vec<Value> = data
        .profiles
        .iter()
        .filter(|row| eq_filter(&params, "id").is_none_or(|id| row["id"] == id))
        .cloned()
        .collect();
    Json(rows).into_response()
}

async fn upsert_profile(State(handle): State<BackendHandle>, Json(body): Json<Value>) -> Response {
    let mut data = handle.data();
    data.upserts.push(body.clone());

    if let Some(message) = data.upsert_error.clone() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": "42501", "message": message})),
        )
            .into_response();
    }

    let id = body["id"].clone();
    data.profiles.retain(|row| row["id"] != id);
    data.profiles.push(body);
    StatusCode::CREATED.into_response()
}

async fn token(Json(body): Json<Value>) -> Response {
    if body["email"] == TEST_EMAIL && body["password"] == TEST_PASSWORD {
        return Json(json!({
            "access_token": "test-access-token",
            "refresh_token": "test-refresh-token",
            "expires_in": 3600,
            "user": {"id": TEST_USER_ID.to_string(), "email": TEST_EMAIL}
        }))
        .into_response();
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })),
    )
        .into_response()
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn health() -> Json<Value> {
    Json(json!({"name": "GoTrue"}))
}

async fn upload_object(
    State(handle): State<BackendHandle>,
    axum::extract::Path(path): axum::extract::Path<String>,
) -> Response {
    let mut data = handle.data();
    if let Some(message) = data.upload_error.clone() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "InvalidRequest", "message": message})),
        )
            .into_response();
    }

    data.uploads.push(path.clone());
    Json(json!({"Key": path})).into_response()
}
