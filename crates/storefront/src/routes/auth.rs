//! Authentication route handlers.
//!
//! Email and password sign-in through the backend's auth service. The
//! returned access token is kept in the server-side session so profile
//! reads and writes run as the user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::supabase::SupabaseError;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub signed_in: bool,
    pub error: Option<&'static str>,
}

/// Message shown for an error code in the login redirect.
fn login_error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password",
        "rate_limited" => "Too many attempts, please wait a moment and try again",
        "expired" => "Your session has expired, please sign in again",
        "session" => "We could not start your session, please try again",
        _ => "Something went wrong, please try again",
    }
}

/// Error code for a failed sign-in.
fn login_error_code(error: &SupabaseError) -> &'static str {
    match error {
        SupabaseError::RateLimited(_) => "rate_limited",
        SupabaseError::Api { status, .. } if *status < 500 => "credentials",
        SupabaseError::Unauthorized(_) => "credentials",
        _ => "unavailable",
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Display the login page, or go to the account when already signed in.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }

    LoginTemplate {
        signed_in: false,
        error: query.error.as_deref().map(login_error_message),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();

    let auth = match state
        .supabase()
        .sign_in_with_password(email, &form.password)
        .await
    {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let code = login_error_code(&e);
            return Redirect::to(&format!("/auth/login?error={code}")).into_response();
        }
    };

    let user = CurrentUser::from_auth(auth, email);
    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!(error = %e, "Failed to set session");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(&user.email));
    tracing::info!(user_id = %user.id, "User signed in");

    Redirect::to("/account").into_response()
}

/// Handle logout.
///
/// Revoking the token at the backend is best effort; the session is
/// cleared either way.
#[instrument(skip(state, session, user))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if let Some(user) = user {
        if let Err(e) = state.supabase().sign_out(&user.access_token).await {
            tracing::warn!(error = %e, "Failed to revoke access token");
        }
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();

    Redirect::to("/gallery").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_codes() {
        let bad_password = SupabaseError::Api {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(login_error_code(&bad_password), "credentials");
        assert_eq!(login_error_code(&SupabaseError::RateLimited(10)), "rate_limited");

        let outage = SupabaseError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(login_error_code(&outage), "unavailable");
    }

    #[test]
    fn test_login_error_messages() {
        assert_eq!(login_error_message("credentials"), "Invalid email or password");
        assert_eq!(
            login_error_message("anything"),
            "Something went wrong, please try again"
        );
    }

    #[test]
    fn test_login_form_debug_redacts_password() {
        let form = LoginForm {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{form:?}").contains("hunter2"));
    }
}
