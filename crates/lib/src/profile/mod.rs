//! The cached profile record and its durable cache.
//!
//! A [`Profile`] is the unit of caching: identity, settings, auth status and
//! sync metadata for the single local install. [`ProfileCache`] persists it
//! as one versioned JSON record in a [`DurableStore`](crate::storage::DurableStore).

mod cache;
mod types;

pub use cache::ProfileCache;
pub use types::{AuthStatus, Profile, Settings, SettingsPatch, SyncStatus, Theme, User};
