//! Profile editing flow.
//!
//! [`ProfileEditor`] holds the edit drawer's state for one request: the stored
//! profile shown in the page summary, the form values, whether the drawer is
//! open, the submit phase, whether the profile must be re-read, and the
//! toasts to show. Writes go through a
//! [`ProfileStore`], which [`SupabaseClient`] implements.

use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use tanrlemn_core::{Profile, ProfileUpsert, UserId};

use crate::components::Toast;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Success toast title.
pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
/// Error toast title; the description carries the failure message.
pub const PROFILE_UPDATE_FAILED: &str = "An error occurred while updating your profile";

/// Reads and writes profile rows.
pub trait ProfileStore {
    /// Read the rows for a user; PostgREST returns zero or one.
    fn fetch_profile(
        &self,
        user_id: UserId,
        access_token: &str,
    ) -> impl Future<Output = Result<Vec<Profile>, SupabaseError>> + Send;

    /// Insert or update the row keyed by `upsert.id`.
    fn upsert_profile(
        &self,
        upsert: &ProfileUpsert,
        access_token: &str,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;
}

impl ProfileStore for SupabaseClient {
    fn fetch_profile(
        &self,
        user_id: UserId,
        access_token: &str,
    ) -> impl Future<Output = Result<Vec<Profile>, SupabaseError>> + Send {
        Self::fetch_profile(self, user_id, access_token)
    }

    fn upsert_profile(
        &self,
        upsert: &ProfileUpsert,
        access_token: &str,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send {
        Self::upsert_profile(self, upsert, access_token)
    }
}

/// Values held by the edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub avatar_url: Option<String>,
}

impl ProfileForm {
    /// Build the write for these values. A blank name is stored as null.
    #[must_use]
    pub fn to_upsert(&self, id: UserId, now: DateTime<Utc>) -> ProfileUpsert {
        let full_name = self.full_name.trim();
        ProfileUpsert {
            id,
            full_name: (!full_name.is_empty()).then(|| full_name.to_string()),
            avatar_url: self.avatar_url.clone(),
            updated_at: now,
        }
    }
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}

/// Where the last submit stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// State of the profile edit drawer.
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    profile: Profile,
    form: ProfileForm,
    modal_open: bool,
    phase: SubmitPhase,
    needs_refetch: bool,
    toasts: Vec<Toast>,
}

impl ProfileEditor {
    /// Editor seeded with the stored profile, drawer closed.
    #[must_use]
    pub fn new(profile: &Profile) -> Self {
        Self {
            profile: profile.clone(),
            form: ProfileForm::from(profile),
            modal_open: false,
            phase: SubmitPhase::Idle,
            needs_refetch: false,
            toasts: Vec::new(),
        }
    }

    /// The profile as last read from the backend.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    #[must_use]
    pub const fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut ProfileForm {
        &mut self.form
    }

    pub fn set_full_name(&mut self, full_name: impl Into<String>) {
        self.form.full_name = full_name.into();
    }

    pub const fn open(&mut self) {
        self.modal_open = true;
    }

    pub const fn close(&mut self) {
        self.modal_open = false;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.modal_open
    }

    #[must_use]
    pub const fn phase(&self) -> SubmitPhase {
        self.phase
    }

    #[must_use]
    pub const fn needs_refetch(&self) -> bool {
        self.needs_refetch
    }

    /// Hand the queued toasts to the view and settle back to idle.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.phase = SubmitPhase::Idle;
        std::mem::take(&mut self.toasts)
    }

    /// Write the current form values as one upsert.
    ///
    /// On success the drawer closes, a success toast is queued and the
    /// profile is marked for re-reading. On failure the drawer stays open and
    /// an error toast carries the failure message.
    #[instrument(skip(self, store, access_token), fields(user_id = %user_id))]
    pub async fn submit<S: ProfileStore>(
        &mut self,
        store: &S,
        user_id: UserId,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SupabaseError> {
        self.phase = SubmitPhase::Submitting;
        let upsert = self.form.to_upsert(user_id, now);

        match store.upsert_profile(&upsert, access_token).await {
            Ok(()) => {
                self.phase = SubmitPhase::Succeeded;
                self.toasts.push(Toast::success(PROFILE_UPDATED));
                self.modal_open = false;
                self.needs_refetch = true;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Profile update failed");
                self.phase = SubmitPhase::Failed;
                self.toasts
                    .push(Toast::error(PROFILE_UPDATE_FAILED, e.to_string()));
                Err(e)
            }
        }
    }

    /// Refuse a change before anything is written.
    ///
    /// Queues an error toast with `reason` and keeps the drawer open.
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.phase = SubmitPhase::Failed;
        self.modal_open = true;
        self.toasts.push(Toast::error(PROFILE_UPDATE_FAILED, reason));
    }

    /// Record a freshly uploaded avatar and save it straight away.
    pub async fn avatar_uploaded<S: ProfileStore>(
        &mut self,
        avatar_url: String,
        store: &S,
        user_id: UserId,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SupabaseError> {
        self.form.avatar_url = Some(avatar_url);
        self.submit(store, user_id, access_token, now).await
    }

    /// Re-read the profile after a successful write.
    ///
    /// Replaces the stored profile and the form with the first row returned. A failed read is
    /// logged and the form keeps its values; either way the flag clears.
    #[instrument(skip(self, store, access_token), fields(user_id = %user_id))]
    pub async fn refetch_if_needed<S: ProfileStore>(
        &mut self,
        store: &S,
        user_id: UserId,
        access_token: &str,
    ) {
        if !self.needs_refetch {
            return;
        }

        match store.fetch_profile(user_id, access_token).await {
            Ok(rows) => {
                if let Some(profile) = rows.into_iter().next() {
                    self.form = ProfileForm::from(&profile);
                    self.profile = profile;
                }
            }
            Err(e) => warn!(error = %e, "Profile re-read failed"),
        }
        self.needs_refetch = false;
    }
}
