//! Durable cache for the single [`Profile`] record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Profile;
use crate::{Result, constants::PROFILE_KEY, storage::DurableStore, storage::StoreError};

/// The current profile record format version.
const RECORD_VERSION: u8 = 1;

#[derive(Serialize)]
struct RecordRef<'a> {
    #[serde(rename = "_v")]
    version: u8,
    profile: &'a Profile,
}

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "_v", default)]
    version: u8,
    profile: Profile,
}

/// Whole-record read/write of the cached [`Profile`].
///
/// There is no merge logic here: callers read, modify and write the full
/// record. Concurrency control is the sync engine's job.
#[derive(Clone)]
pub struct ProfileCache {
    store: Arc<dyn DurableStore>,
}

impl std::fmt::Debug for ProfileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileCache")
            .field("store", &"<DurableStore>")
            .finish()
    }
}

impl ProfileCache {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Read the cached record, or `None` if nothing has been written yet.
    pub async fn read(&self) -> Result<Option<Profile>> {
        let Some(json) = self.store.get(PROFILE_KEY).await? else {
            return Ok(None);
        };
        let record: Record =
            serde_json::from_str(&json).map_err(|e| StoreError::DeserializationFailed {
                key: PROFILE_KEY.to_string(),
                source: e,
            })?;
        if record.version != RECORD_VERSION {
            return Err(StoreError::UnsupportedVersion {
                key: PROFILE_KEY.to_string(),
                found: record.version,
                expected: RECORD_VERSION,
            }
            .into());
        }
        Ok(Some(record.profile))
    }

    /// Read the cached record, logging any failure and reporting it as absent.
    pub async fn read_lenient(&self) -> Option<Profile> {
        match self.read().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Profile cache unreadable; treating as empty");
                None
            }
        }
    }

    /// Persist `profile` as the cached record and return what was stored.
    ///
    /// The stored record is normalized, and its `last_sync_at` is never
    /// allowed to move behind the record it replaces.
    pub async fn write(&self, profile: Profile) -> Result<Profile> {
        let mut profile = profile.normalized();
        if let Some(previous) = self.read_lenient().await {
            profile.last_sync_at = profile.last_sync_at.max(previous.last_sync_at);
        }

        let json = serde_json::to_string(&RecordRef {
            version: RECORD_VERSION,
            profile: &profile,
        })
        .map_err(|e| StoreError::SerializationFailed { source: e })?;
        self.store.set(PROFILE_KEY, json).await?;
        Ok(profile)
    }

    /// Remove the cached record entirely.
    ///
    /// Session changes overwrite the record instead; this exists for
    /// resetting a local install.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(PROFILE_KEY).await
    }
}
