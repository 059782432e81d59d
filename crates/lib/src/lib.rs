//!
//! profile-sync: offline-first profile and session synchronization.
//!
//! The library keeps a durable local copy of the user's identity, settings
//! and auth state, decides when that copy is fresh enough to serve, and
//! reconciles it with a remote authority without flooding it.
//!
//! ## Core Concepts
//!
//! * **Profile (`profile::Profile`)**: The single cached record per install: user, settings, auth status and sync metadata.
//! * **DurableStore (`storage::DurableStore`)**: Pluggable persistent key-value storage the cache and throttle write to.
//! * **RequestThrottle (`throttle::RequestThrottle`)**: A global cooldown between successful remote calls.
//! * **SyncEngine (`sync::SyncEngine`)**: The freshness policy and refresh state machine, with a single-flight guard.
//! * **ConsumerBroadcaster (`broadcast::ConsumerBroadcaster`)**: Best-effort fan-out of `profile-updated` events.
//! * **SessionManager (`session::SessionManager`)**: Login, registration and logout through the same write path.
//! * **Instance (`Instance`)**: The handle tying it all together.

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod instance;
pub mod profile;
pub mod session;
pub mod storage;
pub mod sync;
pub mod throttle;

pub use clock::{Clock, FixedClock, SystemClock};
pub use instance::{Instance, InstanceBuilder};
pub use profile::{Profile, Settings, SettingsPatch, SyncStatus};

/// Result type used throughout the profile-sync library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the profile-sync library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the storage module
    #[error(transparent)]
    Store(storage::StoreError),

    /// Structured remote errors from the gateway module
    #[error(transparent)]
    Gateway(gateway::GatewayError),

    /// Structured session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured delivery errors from the broadcast module
    #[error(transparent)]
    Broadcast(broadcast::BroadcastError),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "storage",
            Error::Gateway(_) => "gateway",
            Error::Session(_) => "session",
            Error::Broadcast(_) => "broadcast",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error came from local storage.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error came from the remote gateway.
    pub fn is_gateway_error(&self) -> bool {
        matches!(self, Error::Gateway(_))
    }

    /// Check if the remote refused the request (bad credentials, expired token).
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Gateway(gateway_err) => gateway_err.is_rejected(),
            _ => false,
        }
    }

    /// Check if the remote could not be reached.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Gateway(gateway_err) => gateway_err.is_transport_error(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_validation_error(),
            Error::Config(_) => true,
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }
}
