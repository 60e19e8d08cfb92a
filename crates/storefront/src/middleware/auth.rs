//! Authentication extractors.
//!
//! The signed-in user lives in the server-side session as a
//! [`CurrentUser`], written by the login handler.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in user.
///
/// Page requests without one are redirected to the login page; `/api/`
/// requests get `401`. A user whose access token has expired is treated as
/// signed out.
///
/// # Example
///
/// ```rust,ignore
/// async fn account(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Signed in as {}", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Why a request was refused by [`RequireAuth`].
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Read the current user, dropping it when the token has expired.
async fn load_current_user(session: &Session) -> Option<CurrentUser> {
    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;

    if user.is_expired_at(chrono::Utc::now().timestamp()) {
        tracing::debug!(user_id = %user.id, "Access token expired, treating as signed out");
        if let Err(e) = session
            .remove::<CurrentUser>(session_keys::CURRENT_USER)
            .await
        {
            tracing::warn!(error = %e, "Failed to drop expired user from session");
        }
        return None;
    }

    Some(user)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped URI; the original tells API calls apart.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |original| original.path());
        let rejection = if path.starts_with("/api/") {
            AuthRejection::Unauthorized
        } else {
            AuthRejection::RedirectToLogin
        };

        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(AuthRejection::Unauthorized);
        };

        load_current_user(session).await.map(Self).ok_or(rejection)
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => load_current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the signed-in user in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Forget the signed-in user and everything else in the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tanrlemn_core::UserId;
    use tower_sessions::MemoryStore;
    use uuid::Uuid;

    use super::*;

    fn user(expires_at: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: UserId::new(Uuid::from_u128(1)),
            email: "ada@example.com".to_string(),
            access_token: "token".to_string(),
            expires_at,
        }
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_expired_user_is_dropped_from_session() {
        let session = session();
        session
            .insert(session_keys::CURRENT_USER, user(Some(0)))
            .await
            .unwrap();

        assert!(load_current_user(&session).await.is_none());
        let stored: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_live_user_is_kept() {
        let session = session();
        session
            .insert(session_keys::CURRENT_USER, user(None))
            .await
            .unwrap();

        let loaded = load_current_user(&session).await.unwrap();
        assert_eq!(loaded.email, "ada@example.com");
    }
}
