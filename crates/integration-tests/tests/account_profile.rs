//! Sign-in and profile editing tests, driven over HTTP with a cookie jar.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;

use reqwest::{Client, StatusCode, multipart};
use serde_json::{Value, json};

use tanrlemn_integration_tests::{
    FakeBackend, TEST_EMAIL, TEST_PASSWORD, TEST_USER_ID, spawn_storefront, test_state,
};

const SUCCESS_TOAST: &str = "Profile updated successfully!";
const ERROR_TOAST: &str = "An error occurred while updating your profile";

struct Harness {
    backend: FakeBackend,
    addr: SocketAddr,
    client: Client,
}

fn png_part() -> multipart::Part {
    multipart::Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap()
}

fn pdf_part() -> multipart::Part {
    multipart::Part::bytes(b"%PDF-1.7".to_vec())
        .file_name("cv.pdf")
        .mime_str("application/pdf")
        .unwrap()
}

impl Harness {
    async fn start() -> Self {
        let backend = FakeBackend::start().await;
        let addr = spawn_storefront(test_state(&backend)).await;
        let client = Client::builder().cookie_store(true).build().unwrap();
        Self {
            backend,
            addr,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn login(&self, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .form(&[("email", TEST_EMAIL), ("password", password)])
            .send()
            .await
            .unwrap()
    }

    fn seed_profile(&self) {
        self.backend.data().profiles = vec![json!({
            "id": TEST_USER_ID.to_string(),
            "full_name": "Ada",
            "avatar_url": "https://cdn.example.com/ada.png",
            "updated_at": "2024-03-01T12:00:00Z"
        })];
    }

    async fn post_avatar(&self, form: multipart::Form, htmx: bool) -> reqwest::Response {
        let mut request = self.client.post(self.url("/account/avatar")).multipart(form);
        if htmx {
            request = request.header("HX-Request", "true");
        }
        request.send().await.unwrap()
    }

    async fn post_profile(&self, full_name: &str, htmx: bool) -> reqwest::Response {
        let mut request = self.client.post(self.url("/account/profile")).form(&[
            ("full_name", full_name),
            ("avatar_url", "https://cdn.example.com/ada.png"),
        ]);
        if htmx {
            request = request.header("HX-Request", "true");
        }
        request.send().await.unwrap()
    }
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_with_wrong_password_shows_error() {
    let h = Harness::start().await;

    let response = h.login("wrong").await;
    assert_eq!(response.url().path(), "/auth/login");
    assert_eq!(response.url().query(), Some("error=credentials"));
    assert!(response.text().await.unwrap().contains("Invalid email or password"));
}

#[tokio::test]
async fn test_account_requires_login() {
    let h = Harness::start().await;

    let response = h.client.get(h.url("/account")).send().await.unwrap();
    assert_eq!(response.url().path(), "/auth/login");

    let response = h
        .client
        .get(h.url("/api/supabase/getProfile"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_lands_on_account_page() {
    let h = Harness::start().await;
    h.seed_profile();

    let response = h.login(TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/account");

    let body = response.text().await.unwrap();
    assert!(body.contains(TEST_EMAIL));
    assert!(body.contains("<h1 tabindex=\"-1\">Ada</h1>"));
    assert!(body.contains("Last updated March 1, 2024"));
    assert!(body.contains(&format!("value=\"{TEST_EMAIL}\" disabled")));
    assert!(body.contains("formaction=\"/account/avatar\""));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let h = Harness::start().await;
    h.login(TEST_PASSWORD).await;

    let response = h
        .client
        .post(h.url("/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/gallery");

    let response = h.client.get(h.url("/account")).send().await.unwrap();
    assert_eq!(response.url().path(), "/auth/login");
}

// ============================================================================
// Profile updates
// ============================================================================

#[tokio::test]
async fn test_profile_update_writes_once_and_toasts_success() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;

    let response = h.post_profile("Ada Lovelace", true).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Trigger"], "profile-updated");

    let body = response.text().await.unwrap();
    assert_eq!(body.matches(SUCCESS_TOAST).count(), 1);
    assert_eq!(body.matches(ERROR_TOAST).count(), 0);
    assert!(!body.contains("drawer--open"));
    assert!(body.contains("value=\"Ada Lovelace\""));
    assert!(body.contains("id=\"account-profile\""));
    assert!(body.contains("<h1 tabindex=\"-1\">Ada Lovelace</h1>"));

    let upserts = h.backend.data().upserts.clone();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0]["id"], TEST_USER_ID.to_string());
    assert_eq!(upserts[0]["full_name"], "Ada Lovelace");
    assert_eq!(upserts[0]["avatar_url"], "https://cdn.example.com/ada.png");
    assert!(upserts[0]["updated_at"].is_string());
}

#[tokio::test]
async fn test_profile_update_failure_keeps_drawer_open() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;
    h.backend.data().upsert_error =
        Some("new row violates row-level security policy".to_string());

    let response = h.post_profile("Ada Lovelace", true).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Trigger"], "profile-update-failed");

    let body = response.text().await.unwrap();
    assert_eq!(body.matches(ERROR_TOAST).count(), 1);
    assert_eq!(body.matches(SUCCESS_TOAST).count(), 0);
    assert!(body.contains("new row violates row-level security policy"));
    assert!(body.contains("drawer--open"));

    assert_eq!(h.backend.data().upserts.len(), 1);
    assert_eq!(h.backend.data().profiles[0]["full_name"], "Ada");
}

#[tokio::test]
async fn test_plain_form_post_redirects_with_toast() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;

    let response = h.post_profile("Grace", false).await;
    assert_eq!(response.url().path(), "/account");

    let body = response.text().await.unwrap();
    assert_eq!(body.matches(SUCCESS_TOAST).count(), 1);
    assert!(body.contains("<h1 tabindex=\"-1\">Grace</h1>"));

    // The toast is shown once.
    let body = h
        .client
        .get(h.url("/account"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body.matches(SUCCESS_TOAST).count(), 0);
}

#[tokio::test]
async fn test_plain_form_failure_reopens_drawer_with_toast() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;
    h.backend.data().upsert_error = Some("permission denied".to_string());

    let response = h.post_profile("Ada Lovelace", false).await;
    assert_eq!(response.url().path(), "/account");
    assert_eq!(response.url().query(), Some("edit=true"));

    let body = response.text().await.unwrap();
    assert_eq!(body.matches(ERROR_TOAST).count(), 1);
    assert!(body.contains("permission denied"));
    assert!(body.contains("drawer--open"));
    assert!(body.contains("<h1 tabindex=\"-1\">Ada</h1>"));
}

#[tokio::test]
async fn test_avatar_upload_saves_public_url() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;

    let form = multipart::Form::new()
        .text("full_name", "Ada")
        .part("avatar", png_part());
    let response = h.post_avatar(form, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Trigger"], "profile-updated");
    assert_eq!(response.text().await.unwrap().matches(SUCCESS_TOAST).count(), 1);

    let data = h.backend.data();
    assert_eq!(data.uploads.len(), 1);
    assert!(data.uploads[0].starts_with(&format!("avatars/{TEST_USER_ID}/")));
    assert!(data.uploads[0].ends_with(".png"));

    assert_eq!(data.upserts.len(), 1);
    assert_eq!(data.upserts[0]["full_name"], "Ada");
    let avatar_url = data.upserts[0]["avatar_url"].as_str().unwrap();
    assert!(avatar_url.contains("/storage/v1/object/public/avatars/"));
}

#[tokio::test]
async fn test_avatar_upload_saves_typed_name() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;

    let form = multipart::Form::new()
        .text("full_name", "Grace Hopper")
        .part("avatar", png_part());
    let body = h.post_avatar(form, true).await.text().await.unwrap();
    assert!(body.contains("<h1 tabindex=\"-1\">Grace Hopper</h1>"));

    let upserts = h.backend.data().upserts.clone();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0]["full_name"], "Grace Hopper");
}

#[tokio::test]
async fn test_avatar_upload_rejects_non_images() {
    let h = Harness::start().await;
    h.login(TEST_PASSWORD).await;

    let form = multipart::Form::new()
        .text("full_name", "Ada")
        .part("avatar", pdf_part());
    let response = h.post_avatar(form, false).await;
    assert_eq!(response.url().path(), "/account");
    assert_eq!(response.url().query(), Some("edit=true"));

    let body = response.text().await.unwrap();
    assert_eq!(body.matches(ERROR_TOAST).count(), 1);
    assert!(body.contains("Avatar must be a PNG, JPEG, WebP or GIF image"));
    assert!(body.contains("drawer--open"));

    assert!(h.backend.data().uploads.is_empty());
    assert!(h.backend.data().upserts.is_empty());
}

#[tokio::test]
async fn test_avatar_rejection_returns_fragment_for_htmx() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;

    let form = multipart::Form::new()
        .text("full_name", "Ada Lovelace")
        .part("avatar", pdf_part());
    let response = h.post_avatar(form, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Trigger"], "profile-update-failed");

    let body = response.text().await.unwrap();
    assert!(body.contains("id=\"account-profile\""));
    assert_eq!(body.matches(ERROR_TOAST).count(), 1);
    assert!(body.contains("Avatar must be a PNG, JPEG, WebP or GIF image"));
    assert!(body.contains("drawer--open"));
    // The typed name survives the rejection.
    assert!(body.contains("value=\"Ada Lovelace\""));

    assert!(h.backend.data().uploads.is_empty());
    assert!(h.backend.data().upserts.is_empty());
}

#[tokio::test]
async fn test_avatar_upload_without_file_is_rejected() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;

    let form = multipart::Form::new().text("full_name", "Ada");
    let response = h.post_avatar(form, true).await;
    assert_eq!(response.headers()["HX-Trigger"], "profile-update-failed");
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("You must select an image to upload")
    );
    assert!(h.backend.data().upserts.is_empty());
}

#[tokio::test]
async fn test_avatar_storage_failure_toasts_error() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;
    h.backend.data().upload_error = Some("The object exceeded the maximum allowed size".to_string());

    let form = multipart::Form::new()
        .text("full_name", "Ada")
        .part("avatar", png_part());
    let response = h.post_avatar(form, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Trigger"], "profile-update-failed");

    let body = response.text().await.unwrap();
    assert_eq!(body.matches(ERROR_TOAST).count(), 1);
    assert!(body.contains("The object exceeded the maximum allowed size"));
    assert!(body.contains("drawer--open"));

    assert!(h.backend.data().uploads.is_empty());
    assert!(h.backend.data().upserts.is_empty());
}

#[tokio::test]
async fn test_avatar_storage_failure_redirects_plain_post() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;
    h.backend.data().upload_error = Some("Bucket not found".to_string());

    let form = multipart::Form::new()
        .text("full_name", "Ada")
        .part("avatar", png_part());
    let response = h.post_avatar(form, false).await;
    assert_eq!(response.url().query(), Some("edit=true"));

    let body = response.text().await.unwrap();
    assert_eq!(body.matches(ERROR_TOAST).count(), 1);
    assert!(body.contains("Bucket not found"));
    assert!(h.backend.data().upserts.is_empty());
}

// ============================================================================
// Profile API
// ============================================================================

#[tokio::test]
async fn test_get_profile_api() {
    let h = Harness::start().await;
    h.seed_profile();
    h.login(TEST_PASSWORD).await;

    let body: Value = h
        .client
        .get(h.url("/api/supabase/getProfile"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["error"], Value::Null);
    assert_eq!(body["data"][0]["full_name"], "Ada");
}
