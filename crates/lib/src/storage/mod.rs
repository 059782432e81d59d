//! Durable key-value storage.
//!
//! The [`DurableStore`] trait is the only persistence seam the engine knows
//! about: string keys mapping to string values that survive a process
//! restart. The profile cache and the request throttle each own one key and
//! encode their records as JSON on top of it.
//!
//! No transactional guarantees are assumed across keys.

use async_trait::async_trait;

use crate::Result;

mod errors;
mod file;
mod in_memory;
mod persistence;

pub use errors::StoreError;
pub use file::JsonFileStore;
pub use in_memory::InMemoryStore;

/// Persistent string key-value storage.
///
/// Implementations must be `Send` and `Sync` so a single store can be shared
/// by the sync engine, its background refresh task and the session manager.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
