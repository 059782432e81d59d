//! Session management
//!
//! Login, registration and logout as operations that replace the cached
//! profile. Every change is written through the sync engine's commit path,
//! so consumers observe session changes exactly like sync results.

use tracing::{info, warn};

use crate::{
    Result,
    gateway::{AuthPayload, Credentials, Registration},
    profile::{Profile, Settings},
    sync::SyncEngine,
};

mod errors;

pub use errors::SessionError;

/// Session operations layered on a [`SyncEngine`].
#[derive(Debug, Clone)]
pub struct SessionManager {
    engine: SyncEngine,
}

impl SessionManager {
    pub fn new(engine: SyncEngine) -> Self {
        Self { engine }
    }

    /// Log in with `credentials`.
    ///
    /// On failure the error is returned and the cached profile is untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<Profile> {
        validate_credentials(credentials)?;
        let payload = self.engine.gateway().login(credentials).await?;
        Ok(self.establish(payload).await)
    }

    /// Register a new account and log into it.
    ///
    /// On failure the error is returned and the cached profile is untouched.
    pub async fn register(&self, registration: &Registration) -> Result<Profile> {
        validate_registration(registration)?;
        let payload = self.engine.gateway().register(registration).await?;
        Ok(self.establish(payload).await)
    }

    /// Log out locally, telling the remote on a best-effort basis.
    ///
    /// Identity and credentials are cleared; settings are kept.
    pub async fn logout(&self) -> Profile {
        let token = self
            .engine
            .cache()
            .read_lenient()
            .await
            .and_then(|p| p.token().map(str::to_string));
        if let Some(token) = token.as_deref() {
            if let Err(e) = self.engine.gateway().logout(Some(token)).await {
                warn!(error = %e, "Remote logout failed; logging out locally anyway");
            }
        }

        let _guard = self.engine.lock_writes().await;
        let now = self.engine.clock().now_millis();
        let profile = match self.engine.cache().read_lenient().await {
            Some(profile) => profile.into_logged_out(now),
            None => Profile::logged_out(Settings::default(), now),
        };
        let profile = self.engine.commit(profile).await;
        info!("Logged out");
        profile
    }

    /// Replace the cached profile with a freshly authenticated one.
    async fn establish(&self, payload: AuthPayload) -> Profile {
        let _guard = self.engine.lock_writes().await;
        let now = self.engine.clock().now_millis();
        let local = self
            .engine
            .cache()
            .read_lenient()
            .await
            .map(|p| p.settings)
            .unwrap_or_default();
        let settings = local.merged(payload.settings.as_ref());

        // A successful login is a successful remote contact
        if let Err(e) = self.engine.throttle().record_request(now).await {
            warn!(error = %e, "Failed to record remote request");
        }

        let profile = Profile::authenticated(
            payload.user,
            Some(payload.token),
            payload.expires_at,
            settings,
            now,
        );
        let profile = self.engine.commit(profile).await;
        info!(
            user = profile.auth_status.username.as_deref().unwrap_or("-"),
            "Session established"
        );
        profile
    }
}

fn validate_credentials(credentials: &Credentials) -> std::result::Result<(), SessionError> {
    if credentials.username.trim().is_empty() {
        return Err(SessionError::EmptyUsername);
    }
    if credentials.password.is_empty() {
        return Err(SessionError::EmptyPassword);
    }
    Ok(())
}

fn validate_registration(registration: &Registration) -> std::result::Result<(), SessionError> {
    if registration.username.trim().is_empty() {
        return Err(SessionError::EmptyUsername);
    }
    if registration.password.is_empty() {
        return Err(SessionError::EmptyPassword);
    }
    if !is_plausible_email(&registration.email) {
        return Err(SessionError::InvalidEmail {
            email: registration.email.clone(),
        });
    }
    Ok(())
}

/// Shape check only; the remote is the authority on deliverability.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
