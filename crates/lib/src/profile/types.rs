//! Core data types for the profile record.
//!
//! Field names serialize in camelCase so the persisted record and the
//! `profile-updated` event share one shape with the remote payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Authoritative identity record returned by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

/// User-configurable preferences.
///
/// Always present on a [`Profile`]; fields missing from a stored record
/// fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub language: String,
    pub notifications: bool,
    pub auto_sync: bool,
    pub compact_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: "en".to_string(),
            notifications: true,
            auto_sync: true,
            compact_mode: false,
        }
    }
}

impl Settings {
    /// Overlay every field present in `patch`. Returns whether anything changed.
    pub fn apply(&mut self, patch: &SettingsPatch) -> bool {
        let before = self.clone();
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(language) = &patch.language {
            self.language = language.clone();
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
        if let Some(auto_sync) = patch.auto_sync {
            self.auto_sync = auto_sync;
        }
        if let Some(compact_mode) = patch.compact_mode {
            self.compact_mode = compact_mode;
        }
        *self != before
    }

    /// Return a copy with `patch` applied.
    pub fn merged(&self, patch: Option<&SettingsPatch>) -> Self {
        let mut merged = self.clone();
        if let Some(patch) = patch {
            merged.apply(patch);
        }
        merged
    }
}

/// A partial settings update.
///
/// Used both for local edits and for the settings block of remote payloads.
/// Keys the remote sends that this type does not know are dropped during
/// deserialization rather than widening [`Settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_sync: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact_mode: Option<bool>,
}

impl SettingsPatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Authentication state of the local install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Token expiry, milliseconds since Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl AuthStatus {
    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn logged_in(user: &User, token: Option<String>, expires_at: Option<u64>) -> Self {
        Self {
            is_logged_in: true,
            user_id: Some(user.id.clone()),
            username: Some(user.username.clone()),
            token,
            expires_at,
        }
    }
}

/// Reconciliation state of the cached record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Syncing,
    #[default]
    Synced,
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The cached view of who the user is and what they have configured.
///
/// Exactly one exists per local install. A missing remote user is expressed
/// as `user: None` with a logged-out [`AuthStatus`], never as a missing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: Option<User>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub auth_status: AuthStatus,
    /// Last reconciliation attempt, milliseconds since Unix epoch.
    pub last_sync_at: u64,
    #[serde(default)]
    pub sync_status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_error: Option<String>,
}

impl Profile {
    /// Logged-out record with the given settings, synced as of `now`.
    pub fn logged_out(settings: Settings, now: u64) -> Self {
        Self {
            user: None,
            settings,
            auth_status: AuthStatus::logged_out(),
            last_sync_at: now,
            sync_status: SyncStatus::Synced,
            last_sync_error: None,
        }
    }

    /// Record for a freshly authenticated session.
    pub fn authenticated(
        user: User,
        token: Option<String>,
        expires_at: Option<u64>,
        settings: Settings,
        now: u64,
    ) -> Self {
        Self {
            auth_status: AuthStatus::logged_in(&user, token, expires_at),
            user: Some(user),
            settings,
            last_sync_at: now,
            sync_status: SyncStatus::Synced,
            last_sync_error: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth_status.is_logged_in
    }

    /// The credential a refresh should present, if any.
    pub fn token(&self) -> Option<&str> {
        if self.auth_status.is_logged_in {
            self.auth_status.token.as_deref()
        } else {
            None
        }
    }

    pub fn mark_syncing(&mut self) {
        self.sync_status = SyncStatus::Syncing;
        self.last_sync_error = None;
    }

    /// Flag a failed reconciliation at `now`, keeping identity and settings.
    pub fn mark_failed(&mut self, error: impl Into<String>, now: u64) {
        self.sync_status = SyncStatus::Failed;
        self.last_sync_error = Some(error.into());
        self.last_sync_at = self.last_sync_at.max(now);
    }

    /// Drop identity and credentials, keeping settings.
    pub fn into_logged_out(self, now: u64) -> Self {
        Self::logged_out(self.settings, self.last_sync_at.max(now))
    }

    /// Enforce the record invariants.
    ///
    /// - a user is present exactly when the status is logged in
    /// - a token only accompanies a logged-in status
    /// - `last_sync_error` is set exactly when `sync_status` is `Failed`
    pub fn normalized(mut self) -> Self {
        if self.user.is_none() || !self.auth_status.is_logged_in {
            self.user = None;
            self.auth_status = AuthStatus::logged_out();
        }
        match self.sync_status {
            SyncStatus::Failed => {
                if self.last_sync_error.is_none() {
                    self.last_sync_error = Some("unknown error".to_string());
                }
            }
            _ => self.last_sync_error = None,
        }
        self
    }
}
