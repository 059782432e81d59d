//! Freshness tiers for a cached profile.

use std::time::Duration;

use crate::config::SyncConfig;

/// What to do with a cached record on a non-forced read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Younger than the fresh window: serve, no network.
    Fresh,
    /// Stale, but the cooldown forbids a remote call: serve, no network.
    Throttled,
    /// Stale within the max cache age: serve and refresh in the background.
    Stale,
    /// Older than the max cache age: refresh before returning.
    Expired,
}

/// Classify a cached record of the given `age`.
///
/// The cooldown is consulted only once the record is past the fresh window,
/// and it overrides every staleness tier.
pub fn classify(age: Duration, can_request: bool, config: &SyncConfig) -> Freshness {
    if age < config.fresh_window {
        Freshness::Fresh
    } else if !can_request {
        Freshness::Throttled
    } else if age < config.max_cache_age {
        Freshness::Stale
    } else {
        Freshness::Expired
    }
}
