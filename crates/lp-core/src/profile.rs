//! # Profile & onboarding
//!
//! The signed-in (or guest) user, and the onboarding choices that produce
//! them. There is no authentication: a profile is whatever the user typed.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::company_label;
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::storage::{self, keys};
use crate::traits::KeyValueStore;

pub const MISSING_NAME: &str = "Add a display name or continue as guest.";
pub const MISSING_EMAIL: &str = "Enter your company email or continue as guest.";

/// What the onboarding form holds when submitted.
#[derive(Debug, Clone, Default)]
pub struct OnboardingForm {
    pub display_name: String,
    /// A key from [`crate::catalog::COMPANIES`]; `None` or `"guest"` means guest
    pub company: Option<String>,
}

impl OnboardingForm {
    /// Turns the form into a profile, rejecting a blank name.
    pub fn into_profile(self) -> Result<UserProfile> {
        let name = self.display_name.trim();
        if name.is_empty() {
            return Err(AppError::validation(MISSING_NAME));
        }

        // an unknown key still counts as a company user, just without a label
        let choice = self.company.as_deref().filter(|value| *value != "guest");
        Ok(UserProfile {
            display_name: name.to_string(),
            company: choice.and_then(company_label).map(str::to_string),
            is_guest: choice.is_none(),
        })
    }
}

/// Derives a profile from a company email: the local part becomes the
/// display name with runs of non-word characters turned into spaces.
pub fn profile_from_email(email: &str) -> Result<UserProfile> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::validation(MISSING_EMAIL));
    }

    let local = email.split('@').next().unwrap_or_default();
    let mut name = String::with_capacity(local.len());
    let mut in_gap = false;
    for c in local.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
            in_gap = false;
        } else if !in_gap {
            name.push(' ');
            in_gap = true;
        }
    }
    if name.is_empty() {
        name.push_str("Guest");
    }

    Ok(UserProfile {
        display_name: name,
        company: Some("Company email".to_string()),
        is_guest: false,
    })
}

/// The current user, restored from and written back to the store.
pub struct UserSession {
    store: Arc<dyn KeyValueStore>,
    profile: Option<UserProfile>,
}

impl UserSession {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let profile = storage::read_json::<UserProfile>(store.as_ref(), keys::USER_PROFILE)
            .await
            .filter(|profile| !profile.display_name.is_empty());
        Self { store, profile }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn company(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.company.as_deref())
    }

    pub fn has_onboarded(&self) -> bool {
        self.profile.is_some()
    }

    pub async fn complete_onboarding(&mut self, profile: UserProfile) -> &UserProfile {
        debug!(guest = profile.is_guest, "onboarding completed");
        storage::write_json(self.store.as_ref(), keys::USER_PROFILE, &profile).await;
        self.profile.insert(profile)
    }

    /// Validates the form, remembers the name for next time and stores the
    /// profile.
    pub async fn submit_onboarding(&mut self, form: OnboardingForm) -> Result<&UserProfile> {
        let profile = form.into_profile()?;
        self.remember_display_name(&profile.display_name).await;
        Ok(self.complete_onboarding(profile).await)
    }

    pub async fn continue_as_guest(&mut self) {
        self.complete_onboarding(UserProfile::guest()).await;
    }

    pub async fn sign_in_with_email(&mut self, email: &str) -> Result<&UserProfile> {
        let profile = profile_from_email(email)?;
        Ok(self.complete_onboarding(profile).await)
    }

    pub async fn reset_onboarding(&mut self) {
        if let Err(error) = self.store.remove(keys::USER_PROFILE).await {
            warn!(%error, "failed to clear stored profile");
        }
        self.profile = None;
    }

    /// Name pre-filled in the onboarding form. Stored as a bare string.
    pub async fn last_display_name(&self) -> Option<String> {
        storage::read_raw(self.store.as_ref(), keys::LAST_DISPLAY_NAME)
            .await
            .filter(|name| !name.is_empty())
    }

    pub async fn remember_display_name(&self, name: &str) {
        if name.is_empty() {
            return;
        }
        if let Err(error) = self.store.set(keys::LAST_DISPLAY_NAME, name).await {
            warn!(%error, "failed to remember display name");
        }
    }
}
