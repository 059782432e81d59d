//! Timing policy for the sync engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_COOLDOWN, DEFAULT_FRESH_WINDOW, DEFAULT_MAX_CACHE_AGE};

/// Errors raised by an inconsistent [`SyncConfig`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Fresh window ({fresh_window:?}) exceeds max cache age ({max_cache_age:?})")]
    FreshWindowExceedsMaxAge {
        fresh_window: Duration,
        max_cache_age: Duration,
    },
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}

/// Freshness and cooldown windows.
///
/// Durations serialize as whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Cached records younger than this are served without any network activity.
    #[serde(with = "duration_millis")]
    pub fresh_window: Duration,
    /// Cached records at least this old are refreshed before being returned.
    #[serde(with = "duration_millis")]
    pub max_cache_age: Duration,
    /// Minimum interval between successful remote calls.
    #[serde(with = "duration_millis")]
    pub cooldown: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fresh_window: DEFAULT_FRESH_WINDOW,
            max_cache_age: DEFAULT_MAX_CACHE_AGE,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl SyncConfig {
    pub fn with_fresh_window(mut self, fresh_window: Duration) -> Self {
        self.fresh_window = fresh_window;
        self
    }

    pub fn with_max_cache_age(mut self, max_cache_age: Duration) -> Self {
        self.max_cache_age = max_cache_age;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Check that the windows describe a usable tiering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fresh_window > self.max_cache_age {
            return Err(ConfigError::FreshWindowExceedsMaxAge {
                fresh_window: self.fresh_window,
                max_cache_age: self.max_cache_age,
            });
        }
        Ok(())
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
