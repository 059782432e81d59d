//! The remote authority for profile and session data.
//!
//! [`RemoteProfileGateway`] is the boundary to whatever service owns user
//! identity. The sync engine only ever calls `fetch_profile`; the session
//! manager calls `login`, `register` and `logout`. Timeouts and retries
//! belong to the implementation, not to the callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    profile::{SettingsPatch, User},
};

mod errors;
pub mod http;

pub use errors::GatewayError;
pub use http::HttpGateway;

/// Response to a profile fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// The authenticated user, or `None` when the credential identifies nobody.
    #[serde(default)]
    pub user: Option<User>,
    /// Server-side settings. Only the keys present override local values.
    #[serde(default)]
    pub settings: Option<SettingsPatch>,
}

/// Response to a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
    #[serde(default)]
    pub settings: Option<SettingsPatch>,
    /// Token expiry, milliseconds since Unix epoch.
    #[serde(default)]
    pub expires_at: Option<u64>,
}

/// Login credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account registration data.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Trait for the authoritative source of profile and auth data.
#[async_trait]
pub trait RemoteProfileGateway: Send + Sync {
    /// Fetch the profile the given credential identifies.
    ///
    /// # Arguments
    /// * `token` - The cached session token, if any
    async fn fetch_profile(&self, token: Option<&str>) -> Result<ProfilePayload>;

    /// Exchange credentials for a session.
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload>;

    /// Create an account and open a session for it.
    async fn register(&self, registration: &Registration) -> Result<AuthPayload>;

    /// End the session identified by `token` on the remote side.
    async fn logout(&self, token: Option<&str>) -> Result<()>;
}
