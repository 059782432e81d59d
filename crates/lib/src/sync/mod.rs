//! Profile synchronization.
//!
//! [`SyncEngine`] decides, per read, whether the cached profile can be
//! served as is, served while a background refresh runs, or must be
//! refreshed before returning. It owns every `syncStatus` transition and
//! guarantees at most one refresh is in flight at a time.

mod engine;
mod freshness;

pub use engine::SyncEngine;
pub use freshness::{Freshness, classify};
