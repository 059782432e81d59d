//! The public entry point.
//!
//! [`Instance`] wires a durable store and a remote gateway into the cache,
//! throttle, broadcaster, sync engine and session manager, and exposes the
//! operations UI code calls.
//!
//! ## Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use profile_sync::{Instance, gateway::HttpGateway, storage::JsonFileStore};
//! # #[tokio::main]
//! # async fn main() -> profile_sync::Result<()> {
//! let store = Arc::new(JsonFileStore::open("profile-sync.json").await?);
//! let gateway = Arc::new(HttpGateway::new("https://api.example.com/v1")?);
//! let instance = Instance::open(store, gateway)?;
//!
//! let _updates = instance.subscribe().await;
//! let profile = instance.get_profile(false).await;
//! println!("logged in: {}", profile.is_logged_in());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    Clock, Result, SystemClock,
    broadcast::{Consumer, ConsumerBroadcaster, ProfileUpdated},
    config::SyncConfig,
    gateway::{Credentials, Registration, RemoteProfileGateway},
    profile::{Profile, ProfileCache, SettingsPatch},
    session::SessionManager,
    storage::DurableStore,
    sync::SyncEngine,
    throttle::RequestThrottle,
};

/// Builder for [`Instance`], for overriding the clock or the timing policy.
pub struct InstanceBuilder {
    store: Arc<dyn DurableStore>,
    gateway: Arc<dyn RemoteProfileGateway>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
}

impl InstanceBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and assemble the components.
    pub fn build(self) -> Result<Instance> {
        self.config.validate()?;

        let cache = ProfileCache::new(self.store.clone());
        let throttle = RequestThrottle::new(self.store, self.clock.clone(), self.config.cooldown);
        let broadcaster = Arc::new(ConsumerBroadcaster::new(self.clock.clone()));
        let engine = SyncEngine::new(
            cache,
            throttle,
            self.gateway,
            broadcaster,
            self.clock,
            self.config,
        );
        let session = SessionManager::new(engine.clone());
        Ok(Instance { engine, session })
    }
}

/// Handle to the profile sync system.
///
/// Cheap to clone; clones share all state.
#[derive(Debug, Clone)]
pub struct Instance {
    engine: SyncEngine,
    session: SessionManager,
}

impl Instance {
    /// Open with the system clock and the default timing policy.
    pub fn open(
        store: Arc<dyn DurableStore>,
        gateway: Arc<dyn RemoteProfileGateway>,
    ) -> Result<Self> {
        Self::builder(store, gateway).build()
    }

    pub fn builder(
        store: Arc<dyn DurableStore>,
        gateway: Arc<dyn RemoteProfileGateway>,
    ) -> InstanceBuilder {
        InstanceBuilder {
            store,
            gateway,
            clock: Arc::new(SystemClock),
            config: SyncConfig::default(),
        }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// See [`SyncEngine::get_profile`].
    pub async fn get_profile(&self, force_refresh: bool) -> Profile {
        self.engine.get_profile(force_refresh).await
    }

    pub async fn force_sync(&self) -> Profile {
        self.engine.force_sync().await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Profile {
        self.engine.update_settings(patch).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Profile> {
        self.session.login(credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<Profile> {
        self.session.register(registration).await
    }

    pub async fn logout(&self) -> Profile {
        self.session.logout().await
    }

    /// Receive every future profile change in-process.
    pub async fn subscribe(&self) -> mpsc::Receiver<ProfileUpdated> {
        self.engine.broadcaster().subscribe().await
    }

    /// Add a host-specific consumer of profile changes.
    pub async fn register_consumer(&self, consumer: Arc<dyn Consumer>) {
        self.engine.broadcaster().register(consumer).await
    }

    /// Timestamp of the last successful remote contact, if any.
    pub async fn last_remote_contact(&self) -> Option<u64> {
        self.engine.throttle().last_request_at().await
    }
}
