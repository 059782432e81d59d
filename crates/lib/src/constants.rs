//! Constants used throughout the profile-sync library.
//!
//! Storage keys and the default timing policy live here so the cache, the
//! throttle and the config defaults cannot drift apart.

use std::time::Duration;

/// Durable store key holding the cached profile envelope.
pub const PROFILE_KEY: &str = "profile-sync/profile";

/// Durable store key holding the request throttle state.
///
/// Kept separate from [`PROFILE_KEY`] so the cooldown survives a cleared profile.
pub const THROTTLE_KEY: &str = "profile-sync/throttle";

/// Event name carried by every consumer notification.
pub const PROFILE_UPDATED_EVENT: &str = "profile-updated";

/// A cached profile younger than this is served with no network activity.
pub const DEFAULT_FRESH_WINDOW: Duration = Duration::from_secs(5 * 60);

/// A cached profile older than this forces a synchronous refresh.
pub const DEFAULT_MAX_CACHE_AGE: Duration = Duration::from_secs(30 * 60);

/// Minimum interval between successful remote calls.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);
