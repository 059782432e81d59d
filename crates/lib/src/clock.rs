//! Time provider abstraction
//!
//! Every freshness, cooldown and `lastSyncAt` decision in this crate is made
//! against a [`Clock`]. Production code uses [`SystemClock`]; tests drive a
//! [`FixedClock`] forward by hand to walk a cached profile across the
//! freshness tiers without sleeping.
//!
//! # Example
//!
//! ```
//! use profile_sync::{Clock, FixedClock};
//!
//! let clock = FixedClock::new(1000);
//! assert_eq!(clock.now_millis(), 1000);
//! clock.advance(500);
//! assert_eq!(clock.now_millis(), 1500);
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};

/// A time provider for getting current timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Returns the current time as an RFC3339-formatted string.
    fn now_rfc3339(&self) -> String {
        format_millis(self.now_millis())
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    ///
    /// A timestamp from the future (clock skew, restored backup) reads as
    /// "just now" rather than underflowing.
    fn elapsed_since(&self, earlier: u64) -> Duration {
        Duration::from_millis(self.now_millis().saturating_sub(earlier))
    }
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn now_rfc3339(&self) -> String {
        Utc::now().to_rfc3339()
    }
}

/// Manually driven clock for tests.
///
/// Time only moves when [`advance`](FixedClock::advance) or
/// [`set`](FixedClock::set) is called, so two reads inside one refresh see
/// the same instant.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicU64,
}

impl FixedClock {
    /// Create a new fixed clock at the given time in milliseconds.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// Advance the clock by a [`Duration`].
    pub fn advance_by(&self, duration: Duration) {
        self.advance(duration.as_millis() as u64);
    }

    /// Set the clock to a specific time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.millis.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1704067200000)
    }
}

impl Clone for FixedClock {
    fn clone(&self) -> Self {
        Self::new(self.now_millis())
    }
}

/// Render a millisecond Unix timestamp as RFC3339.
pub fn format_millis(millis: u64) -> String {
    let secs = (millis / 1000) as i64;
    let nanos = ((millis % 1000) * 1_000_000) as u32;
    Utc.timestamp_opt(secs, nanos)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "1970-01-01T00:00:00+00:00".to_string())
}
