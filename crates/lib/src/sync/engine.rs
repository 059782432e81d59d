//! The sync engine state machine.
//!
//! A refresh moves the cached record through `syncing` to either `synced`
//! or `failed`, writing and broadcasting at each step:
//!
//! ```text
//!   cached ──mark syncing──▶ write+notify ──fetch──▶ write+notify (synced | failed)
//! ```
//!
//! Refreshes run in their own task. Callers that arrive while one is in
//! flight subscribe to its result through a `watch` channel instead of
//! starting another, so concurrent reads never multiply remote traffic.
//!
//! Every read-modify-write of the cached record, including the session
//! operations, runs under the engine's write guard. The guard is never held
//! across a remote call.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::freshness::{Freshness, classify};
use crate::{
    Clock,
    broadcast::ConsumerBroadcaster,
    config::SyncConfig,
    gateway::{ProfilePayload, RemoteProfileGateway},
    profile::{Profile, ProfileCache, Settings, SettingsPatch},
    throttle::RequestThrottle,
};

/// Receiver side of an in-flight refresh; `None` until the refresh finishes.
type RefreshSlot = watch::Receiver<Option<Profile>>;

struct EngineInner {
    cache: ProfileCache,
    throttle: RequestThrottle,
    gateway: Arc<dyn RemoteProfileGateway>,
    broadcaster: Arc<ConsumerBroadcaster>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    /// Single-flight guard: the refresh currently running, if any
    inflight: Mutex<Option<RefreshSlot>>,
    /// Serializes read-modify-write cycles on the cached record
    write_guard: Mutex<()>,
}

/// Offline-first profile reads with background reconciliation.
///
/// `SyncEngine` is a cheap-to-clone handle; clones share the cache, the
/// throttle and the single-flight guard.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.inner.config)
            .field("clock", &self.inner.clock)
            .field("throttle", &self.inner.throttle)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    pub fn new(
        cache: ProfileCache,
        throttle: RequestThrottle,
        gateway: Arc<dyn RemoteProfileGateway>,
        broadcaster: Arc<ConsumerBroadcaster>,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                cache,
                throttle,
                gateway,
                broadcaster,
                clock,
                config,
                inflight: Mutex::new(None),
                write_guard: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    pub fn throttle(&self) -> &RequestThrottle {
        &self.inner.throttle
    }

    pub fn broadcaster(&self) -> &Arc<ConsumerBroadcaster> {
        &self.inner.broadcaster
    }

    pub(crate) fn cache(&self) -> &ProfileCache {
        &self.inner.cache
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn RemoteProfileGateway> {
        &self.inner.gateway
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// Exclusive access to the cached record until the guard is dropped.
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.inner.write_guard.lock().await
    }

    /// The cached record as stored, without applying any freshness policy.
    pub async fn cached(&self) -> Option<Profile> {
        self.inner.cache.read_lenient().await
    }

    /// Whether a refresh is currently running.
    pub async fn is_refreshing(&self) -> bool {
        self.inner
            .inflight
            .lock()
            .await
            .as_ref()
            .is_some_and(|rx| rx.borrow().is_none())
    }

    /// Get the profile, refreshing from the remote as the freshness policy requires.
    ///
    /// Never fails: remote and storage errors degrade to the last known
    /// record with `syncStatus = failed`.
    ///
    /// # Arguments
    /// * `force_refresh` - Skip the freshness tiers and refresh now. The
    ///   cooldown inside the refresh routine still applies.
    pub async fn get_profile(&self, force_refresh: bool) -> Profile {
        if force_refresh {
            debug!("Forced profile refresh");
            return self.refresh().await;
        }

        let Some(cached) = self.inner.cache.read_lenient().await else {
            debug!("No cached profile; refreshing synchronously");
            return self.refresh().await;
        };

        match self.assess(&cached).await {
            Freshness::Fresh => {
                debug!("Serving fresh cached profile");
                cached
            }
            Freshness::Throttled => {
                debug!("Cached profile is stale but the cooldown is active; serving cache");
                cached
            }
            Freshness::Stale => {
                debug!("Serving stale cached profile; refreshing in background");
                self.start_refresh().await;
                cached
            }
            Freshness::Expired => {
                debug!("Cached profile expired; refreshing synchronously");
                self.refresh().await
            }
        }
    }

    /// Refresh now. Equivalent to `get_profile(true)`.
    pub async fn force_sync(&self) -> Profile {
        self.get_profile(true).await
    }

    /// Classify a cached record against the freshness policy.
    pub async fn assess(&self, profile: &Profile) -> Freshness {
        let age = self.inner.clock.elapsed_since(profile.last_sync_at);
        // The throttle only matters once the record has left the fresh window
        let can_request =
            age >= self.inner.config.fresh_window && self.inner.throttle.can_request().await;
        classify(age, can_request, &self.inner.config)
    }

    /// Apply a local settings change and broadcast it.
    ///
    /// Sync metadata is left alone; the remote is not contacted.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Profile {
        let _guard = self.lock_writes().await;
        let mut profile = match self.inner.cache.read_lenient().await {
            Some(profile) => profile,
            None => Profile::logged_out(Settings::default(), self.inner.clock.now_millis()),
        };
        if !profile.settings.apply(&patch) {
            debug!("Settings update changed nothing");
            return profile;
        }
        info!(?patch, "Updated settings");
        self.commit(profile).await
    }

    /// Run a refresh, joining the in-flight one if there is one.
    pub async fn refresh(&self) -> Profile {
        let mut rx = self.start_refresh().await;
        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|p| (*p).clone());
        match outcome {
            Some(profile) => profile,
            None => {
                // The refresh task died without publishing a result
                let _guard = self.lock_writes().await;
                let now = self.inner.clock.now_millis();
                let mut profile = self
                    .inner
                    .cache
                    .read_lenient()
                    .await
                    .unwrap_or_else(|| Profile::logged_out(Settings::default(), now));
                profile.mark_failed("refresh aborted", now);
                self.commit(profile).await
            }
        }
    }

    /// Make sure a refresh is running and return a handle to its result.
    ///
    /// Background callers drop the handle; the refresh keeps running.
    async fn start_refresh(&self) -> RefreshSlot {
        let mut slot = self.inner.inflight.lock().await;
        if let Some(rx) = slot.as_ref() {
            let finished = rx.borrow().is_some();
            if !finished && rx.has_changed().is_ok() {
                debug!("Joining in-flight profile refresh");
                return rx.clone();
            }
            // A dropped sender with no value means the task panicked
            if !finished {
                warn!("Previous profile refresh ended without a result; starting another");
            }
        }

        let (tx, rx) = watch::channel(None);
        *slot = Some(rx.clone());
        drop(slot);

        let engine = self.clone();
        let own = rx.clone();
        tokio::spawn(async move {
            let profile = engine
                .run_refresh()
                .instrument(info_span!("profile_refresh"))
                .await;
            tx.send_replace(Some(profile));
            let mut slot = engine.inner.inflight.lock().await;
            // A newer refresh may already occupy the slot
            if slot.as_ref().is_some_and(|rx| rx.same_channel(&own)) {
                slot.take();
            }
        });
        rx
    }

    /// The refresh routine proper. Always produces a record.
    async fn run_refresh(&self) -> Profile {
        let inner = &self.inner;

        let (snapshot, token) = {
            let _guard = self.lock_writes().await;
            let cached = inner.cache.read_lenient().await;

            if !inner.throttle.can_request().await {
                let remaining = inner.throttle.remaining().await;
                debug!(?remaining, "Cooldown active; skipping remote fetch");
                return match cached {
                    Some(cached) => cached,
                    None => {
                        let now = inner.clock.now_millis();
                        self.commit(Profile::logged_out(Settings::default(), now))
                            .await
                    }
                };
            }

            let token = cached
                .as_ref()
                .and_then(|p| p.token())
                .map(str::to_string);
            if let Some(cached) = &cached {
                let mut syncing = cached.clone();
                syncing.mark_syncing();
                self.commit(syncing).await;
            }
            (cached, token)
        };

        let result = inner.gateway.fetch_profile(token.as_deref()).await;
        let now = inner.clock.now_millis();
        if result.is_ok() {
            if let Err(e) = inner.throttle.record_request(now).await {
                warn!(error = %e, "Failed to record remote request");
            }
        }

        let _guard = self.lock_writes().await;
        // Merge into whatever is cached now so edits made during the fetch survive
        let current = inner.cache.read_lenient().await.or(snapshot);
        if let Some(current) = &current {
            if current.token() != token.as_deref() {
                info!("Session changed during refresh; discarding remote result");
                return current.clone();
            }
        }
        let base = current.unwrap_or_else(|| Profile::logged_out(Settings::default(), now));

        let profile = match result {
            Ok(payload) => {
                let profile = apply_payload(base, payload, token, now);
                info!(
                    logged_in = profile.is_logged_in(),
                    user = profile.auth_status.username.as_deref().unwrap_or("-"),
                    "Profile synced"
                );
                profile
            }
            Err(e) => {
                warn!(error = %e, "Profile refresh failed; keeping cached profile");
                let mut profile = base;
                profile.mark_failed(e.to_string(), now);
                profile
            }
        };
        self.commit(profile).await
    }

    /// Write `profile` through the cache and broadcast the stored result.
    ///
    /// Callers hold the write guard when `profile` was derived from a read.
    ///
    /// Storage failures are logged; the record is still broadcast and
    /// returned so callers always see the outcome of the operation.
    pub(crate) async fn commit(&self, profile: Profile) -> Profile {
        let profile = match self.inner.cache.write(profile.clone()).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "Failed to persist profile");
                profile.normalized()
            }
        };
        let report = self.inner.broadcaster.notify(&profile).await;
        debug!(
            sync_status = %profile.sync_status,
            reached = report.reached,
            unreached = report.unreached,
            "Profile committed"
        );
        profile
    }
}

/// Build the synced record from a successful fetch.
fn apply_payload(base: Profile, payload: ProfilePayload, token: Option<String>, now: u64) -> Profile {
    let settings = base.settings.merged(payload.settings.as_ref());
    match payload.user {
        Some(user) => {
            let expires_at = base.auth_status.expires_at;
            Profile::authenticated(user, token, expires_at, settings, now)
        }
        None => Profile::logged_out(settings, now),
    }
}
