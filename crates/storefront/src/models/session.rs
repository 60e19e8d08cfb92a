//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use tanrlemn_core::UserId;

use crate::supabase::AuthSession;

/// Session-stored user identity.
///
/// Holds the backend access token so profile reads and writes run as the
/// signed-in user.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Auth principal id, also the profile row id.
    pub id: UserId,
    pub email: String,
    /// Backend access token (JWT).
    pub access_token: String,
    /// Unix timestamp when the token expires.
    pub expires_at: Option<i64>,
}

impl CurrentUser {
    /// Build the session identity from a fresh sign-in.
    #[must_use]
    pub fn from_auth(session: AuthSession, fallback_email: &str) -> Self {
        let expires_at = session.expires_at.or_else(|| {
            session
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs)
        });

        Self {
            id: session.user.id,
            email: session
                .user
                .email
                .unwrap_or_else(|| fallback_email.to_string()),
            access_token: session.access_token,
            expires_at,
        }
    }

    /// Whether the access token has expired as of `now` (unix seconds).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for toasts carried across a redirect.
    pub const TOASTS: &str = "toasts";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn auth_session(json: &str) -> AuthSession {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_auth_prefers_backend_email() {
        let session = auth_session(
            r#"{"access_token":"jwt","expires_at":1700000000,
                "user":{"id":"00000000-0000-0000-0000-00000000002a","email":"ada@example.com"}}"#,
        );
        let user = CurrentUser::from_auth(session, "typed@example.com");
        assert_eq!(user.id, UserId::new(Uuid::from_u128(42)));
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.expires_at, Some(1_700_000_000));
        assert!(user.is_expired_at(1_700_000_000));
        assert!(!user.is_expired_at(1_699_999_999));
    }

    #[test]
    fn test_from_auth_falls_back_to_typed_email() {
        let session = auth_session(
            r#"{"access_token":"jwt","user":{"id":"00000000-0000-0000-0000-00000000002a"}}"#,
        );
        let user = CurrentUser::from_auth(session, "typed@example.com");
        assert_eq!(user.email, "typed@example.com");
        assert_eq!(user.expires_at, None);
        assert!(!user.is_expired_at(i64::MAX));
    }

    #[test]
    fn test_debug_redacts_token() {
        let user = CurrentUser {
            id: UserId::new(Uuid::nil()),
            email: "ada@example.com".to_string(),
            access_token: "very-secret-jwt".to_string(),
            expires_at: None,
        };
        assert!(!format!("{user:?}").contains("very-secret-jwt"));
    }
}
