//! Account route handlers.
//!
//! The account page shows the signed-in user's profile and an edit drawer.
//! Saves come from the page script as HTMX requests and get the profile
//! panel (summary and drawer) back; plain form posts are redirected to
//! `/account` with the toasts carried in the session. A rejected avatar is
//! answered the same way as a failed save.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Query, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tanrlemn_core::Profile;

use crate::components::Toast;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, clear_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::profile::{ProfileEditor, ProfileForm};
use crate::routes::is_htmx_request;
use crate::state::AppState;
use crate::supabase::SupabaseError;

/// Largest avatar accepted, in bytes.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for the avatar route, leaving room for the other fields.
pub const MAX_AVATAR_UPLOAD_BYTES: usize = MAX_AVATAR_BYTES + 64 * 1024;

const AVATAR_MISSING: &str = "You must select an image to upload";
const AVATAR_TOO_LARGE: &str = "Avatar must be 5 MB or smaller";
const AVATAR_WRONG_TYPE: &str = "Avatar must be a PNG, JPEG, WebP or GIF image";

// =============================================================================
// Form Types
// =============================================================================

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileFormInput {
    #[serde(default)]
    pub full_name: String,
    /// Current avatar, carried so a name change leaves it untouched.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<ProfileFormInput> for ProfileForm {
    fn from(input: ProfileFormInput) -> Self {
        Self {
            full_name: input.full_name,
            avatar_url: input.avatar_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Query parameters for the account page.
#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    /// Open the edit drawer on load.
    #[serde(default)]
    pub edit: bool,
}

// =============================================================================
// Templates
// =============================================================================

/// Stored profile as shown above the edit drawer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    /// e.g. "March 1, 2024"
    pub updated_at: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile
                .full_name
                .clone()
                .filter(|name| !name.trim().is_empty()),
            avatar_url: profile.avatar_url.clone(),
            updated_at: profile
                .updated_at
                .map(|at| at.format("%B %-d, %Y").to_string()),
        }
    }
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub signed_in: bool,
    pub email: String,
    pub summary: ProfileSummary,
    pub form: ProfileForm,
    pub drawer_open: bool,
    pub toasts: Vec<Toast>,
}

/// Profile summary and edit drawer, swapped in after a save (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/account_profile.html")]
pub struct ProfilePanelTemplate {
    pub email: String,
    pub summary: ProfileSummary,
    pub form: ProfileForm,
    pub drawer_open: bool,
    pub toasts: Vec<Toast>,
}

impl ProfilePanelTemplate {
    fn from_editor(editor: &mut ProfileEditor, email: &str) -> Self {
        Self {
            email: email.to_string(),
            summary: ProfileSummary::from(editor.profile()),
            form: editor.form().clone(),
            drawer_open: editor.is_open(),
            toasts: editor.take_toasts(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Read the user's profile, treating "no row yet" as a blank profile.
async fn load_profile(state: &AppState, user: &CurrentUser) -> Result<Profile, SupabaseError> {
    let rows = state
        .supabase()
        .fetch_profile(user.id, &user.access_token)
        .await?;
    Ok(rows
        .into_iter()
        .next()
        .unwrap_or_else(|| Profile::blank(user.id)))
}

/// Editor for a save, seeded with the stored profile.
///
/// A rejected token ends the request with a sign-out. Any other read failure
/// still lets the save go ahead against a blank summary.
async fn editor_for_save(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> Result<ProfileEditor, Response> {
    match load_profile(state, user).await {
        Ok(profile) => Ok(ProfileEditor::new(&profile)),
        Err(SupabaseError::Unauthorized(_)) => Err(expire_session(session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Profile read before save failed");
            Ok(ProfileEditor::new(&Profile::blank(user.id)))
        }
    }
}

/// Toasts stored for the next page view.
async fn take_flash_toasts(session: &Session) -> Vec<Toast> {
    match session.remove::<Vec<Toast>>(session_keys::TOASTS).await {
        Ok(toasts) => toasts.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read toasts from session");
            Vec::new()
        }
    }
}

/// Answer a profile save: the panel fragment for HTMX, a redirect otherwise.
async fn respond(
    editor: &mut ProfileEditor,
    saved: bool,
    email: &str,
    headers: &HeaderMap,
    session: &Session,
) -> Result<Response, AppError> {
    if is_htmx_request(headers) {
        let trigger = if saved {
            "profile-updated"
        } else {
            "profile-update-failed"
        };
        return Ok((
            AppendHeaders([("HX-Trigger", trigger)]),
            ProfilePanelTemplate::from_editor(editor, email),
        )
            .into_response());
    }

    let reopen = editor.is_open();
    session
        .insert(session_keys::TOASTS, editor.take_toasts())
        .await?;

    let target = if reopen { "/account?edit=true" } else { "/account" };
    Ok(Redirect::to(target).into_response())
}

/// Sign out a user whose token the backend no longer accepts.
async fn expire_session(session: &Session) -> Response {
    if let Err(e) = clear_current_user(session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    Redirect::to("/auth/login?error=expired").into_response()
}

// =============================================================================
// Account Routes
// =============================================================================

/// Display the account page.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<AccountQuery>,
) -> Result<Response, AppError> {
    let profile = match load_profile(&state, &user).await {
        Ok(profile) => profile,
        Err(SupabaseError::Unauthorized(_)) => return Ok(expire_session(&session).await),
        Err(e) => return Err(e.into()),
    };

    let mut editor = ProfileEditor::new(&profile);
    if query.edit {
        editor.open();
    }

    Ok(AccountTemplate {
        signed_in: true,
        email: user.email,
        summary: ProfileSummary::from(&profile),
        form: editor.form().clone(),
        drawer_open: editor.is_open(),
        toasts: take_flash_toasts(&session).await,
    }
    .into_response())
}

/// Save the profile form.
#[instrument(skip(state, session, headers, user, input), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(user): RequireAuth,
    Form(input): Form<ProfileFormInput>,
) -> Result<Response, AppError> {
    let mut editor = match editor_for_save(&state, &session, &user).await {
        Ok(editor) => editor,
        Err(response) => return Ok(response),
    };
    *editor.form_mut() = ProfileForm::from(input);
    editor.open();

    let saved = editor
        .submit(state.supabase(), user.id, &user.access_token, Utc::now())
        .await
        .is_ok();
    editor
        .refetch_if_needed(state.supabase(), user.id, &user.access_token)
        .await;

    if saved {
        add_breadcrumb("profile", "Profile updated", None);
    }

    respond(&mut editor, saved, &user.email, &headers, &session).await
}

/// Fields of the avatar form. Reading stops at the first malformed part.
#[derive(Debug, Default)]
struct AvatarForm {
    full_name: Option<String>,
    file: Option<(Vec<u8>, String)>,
    error: Option<String>,
}

/// An avatar ready to store.
#[derive(Debug)]
struct AvatarUpload {
    bytes: Vec<u8>,
    content_type: String,
    extension: &'static str,
}

/// File extension for an accepted image content type.
fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Message shown for a body that could not be read.
fn multipart_message(e: &MultipartError) -> String {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AVATAR_TOO_LARGE.to_string()
    } else {
        e.body_text()
    }
}

/// Read the `avatar` file and the typed `full_name` from the form.
async fn read_avatar_form(mut multipart: Multipart) -> AvatarForm {
    let mut form = AvatarForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                form.error = Some(multipart_message(&e));
                break;
            }
        };

        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("avatar") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => form.file = Some((bytes.to_vec(), content_type)),
                    Err(e) => {
                        form.error = Some(multipart_message(&e));
                        break;
                    }
                }
            }
            Some("full_name") => match field.text().await {
                Ok(text) => form.full_name = Some(text),
                Err(e) => {
                    form.error = Some(multipart_message(&e));
                    break;
                }
            },
            _ => {}
        }
    }

    form
}

/// Check the uploaded file, returning the reason it was refused.
fn validate_avatar(file: Option<(Vec<u8>, String)>) -> Result<AvatarUpload, &'static str> {
    let (bytes, content_type) = file
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or(AVATAR_MISSING)?;
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(AVATAR_TOO_LARGE);
    }
    let extension = image_extension(&content_type).ok_or(AVATAR_WRONG_TYPE)?;

    Ok(AvatarUpload {
        bytes,
        content_type,
        extension,
    })
}

/// Upload a new avatar, then save the profile with it and the typed name.
#[instrument(skip(state, session, headers, user, multipart), fields(user_id = %user.id))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut editor = match editor_for_save(&state, &session, &user).await {
        Ok(editor) => editor,
        Err(response) => return Ok(response),
    };
    editor.open();

    let form = read_avatar_form(multipart).await;
    if let Some(full_name) = form.full_name {
        editor.set_full_name(full_name);
    }

    let checked = match form.error {
        Some(message) => Err(message),
        None => validate_avatar(form.file).map_err(str::to_string),
    };
    let upload = match checked {
        Ok(upload) => upload,
        Err(reason) => {
            tracing::info!(%reason, "Avatar rejected");
            editor.reject(reason);
            return respond(&mut editor, false, &user.email, &headers, &session).await;
        }
    };

    let uploaded = state
        .supabase()
        .upload_avatar(
            user.id,
            upload.extension,
            &upload.content_type,
            upload.bytes,
            &user.access_token,
        )
        .await;

    let saved = match uploaded {
        Ok(avatar_url) => {
            add_breadcrumb("profile", "Avatar uploaded", None);
            editor
                .avatar_uploaded(
                    avatar_url,
                    state.supabase(),
                    user.id,
                    &user.access_token,
                    Utc::now(),
                )
                .await
                .is_ok()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Avatar upload failed");
            editor.reject(e.to_string());
            false
        }
    };

    editor
        .refetch_if_needed(state.supabase(), user.id, &user.access_token)
        .await;

    respond(&mut editor, saved, &user.email, &headers, &session).await
}
