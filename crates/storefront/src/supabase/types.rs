//! Wire types for the backend's auth and error responses.

use serde::{Deserialize, Serialize};

use tanrlemn_core::UserId;

/// Tokens returned by a successful password sign-in.
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix timestamp when the access token expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// The auth principal a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of a password grant request.
#[derive(Serialize)]
pub(super) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Error body shapes used across REST, auth and storage.
///
/// PostgREST sends `message`, GoTrue sends `error_description` or `msg`,
/// storage sends `message` and `error`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The most specific message present, if any.
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error_description)
            .or(self.msg)
            .or(self.error)
            .filter(|m| !m.is_empty())
    }
}

/// Storage upload acknowledgement.
#[derive(Debug, Deserialize)]
pub(super) struct StoredObject {
    #[serde(rename = "Key", default)]
    pub key: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_prefers_postgrest_message() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"code":"23505","message":"duplicate key","details":null,"hint":null}"#,
        )
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("duplicate key"));
    }

    #[test]
    fn test_error_body_reads_gotrue_shape() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Invalid login credentials")
        );
    }

    #[test]
    fn test_error_body_empty() {
        assert_eq!(ApiErrorBody::default().into_message(), None);
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session: AuthSession = serde_json::from_str(
            r#"{
                "access_token": "very-secret-jwt",
                "expires_in": 3600,
                "user": {"id": "00000000-0000-0000-0000-000000000001", "email": "a@b.c"}
            }"#,
        )
        .unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("very-secret-jwt"));
        assert!(debug.contains("a@b.c"));
    }
}
