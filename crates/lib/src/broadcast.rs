//! Fan-out of profile changes to live consumers.
//!
//! Every write the sync engine or session manager makes ends with a call to
//! [`ConsumerBroadcaster::notify`], which hands a [`ProfileUpdated`] event to
//! each registered [`Consumer`]. Delivery is best effort: a consumer that
//! cannot be reached is counted and skipped, and never turns a successful
//! sync into a failed one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, trace};

use crate::{
    Clock, Result,
    constants::PROFILE_UPDATED_EVENT,
    profile::{Profile, SyncStatus},
};

/// Default buffer for channel subscribers.
const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Payload of the `profile-updated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdated {
    pub profile: Profile,
    /// When the event was emitted, milliseconds since Unix epoch.
    pub timestamp: u64,
    pub sync_status: SyncStatus,
}

impl ProfileUpdated {
    pub fn new(profile: Profile, timestamp: u64) -> Self {
        Self {
            sync_status: profile.sync_status,
            profile,
            timestamp,
        }
    }

    /// Name under which consumers subscribe to this event.
    pub fn event_name(&self) -> &'static str {
        PROFILE_UPDATED_EVENT
    }
}

/// Errors a consumer can report for a single delivery.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// The consumer has gone away for good.
    #[error("Consumer '{consumer}' is closed")]
    Closed { consumer: String },

    /// The consumer is alive but cannot take the event right now.
    #[error("Consumer '{consumer}' is not accepting events")]
    Busy { consumer: String },

    /// Host-specific delivery failure.
    #[error("Delivery to '{consumer}' failed: {reason}")]
    Delivery { consumer: String, reason: String },
}

impl From<BroadcastError> for crate::Error {
    fn from(err: BroadcastError) -> Self {
        crate::Error::Broadcast(err)
    }
}

/// One recipient of profile updates.
///
/// Implement this for the host's delivery mechanism (IPC, message port,
/// socket). Returning an error marks the consumer as unreached for this
/// broadcast only.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    /// Deliver one event.
    async fn deliver(&self, event: &ProfileUpdated) -> Result<()>;

    /// Whether the consumer will never accept events again.
    ///
    /// Closed consumers are dropped from the broadcaster after a broadcast.
    fn is_closed(&self) -> bool {
        false
    }
}

/// In-process consumer backed by a tokio mpsc channel.
#[derive(Debug)]
pub struct ChannelConsumer {
    id: String,
    tx: mpsc::Sender<ProfileUpdated>,
}

impl ChannelConsumer {
    pub fn new(id: impl Into<String>, tx: mpsc::Sender<ProfileUpdated>) -> Self {
        Self { id: id.into(), tx }
    }
}

#[async_trait]
impl Consumer for ChannelConsumer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, event: &ProfileUpdated) -> Result<()> {
        self.tx.try_send(event.clone()).map_err(|e| {
            let consumer = self.id.clone();
            match e {
                mpsc::error::TrySendError::Closed(_) => BroadcastError::Closed { consumer },
                mpsc::error::TrySendError::Full(_) => BroadcastError::Busy { consumer },
            }
            .into()
        })
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Aggregate outcome of one broadcast, for observability only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub reached: usize,
    pub unreached: usize,
}

/// Registry of consumers plus the fan-out loop.
pub struct ConsumerBroadcaster {
    consumers: RwLock<Vec<Arc<dyn Consumer>>>,
    clock: Arc<dyn Clock>,
    next_subscriber: AtomicU64,
}

impl std::fmt::Debug for ConsumerBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerBroadcaster")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl ConsumerBroadcaster {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            consumers: RwLock::new(Vec::new()),
            clock,
            next_subscriber: AtomicU64::new(0),
        }
    }

    /// Register a consumer for all future broadcasts.
    pub async fn register(&self, consumer: Arc<dyn Consumer>) {
        debug!(consumer = consumer.id(), "Registered profile consumer");
        self.consumers.write().await.push(consumer);
    }

    /// Subscribe an in-process receiver to profile updates.
    pub async fn subscribe(&self) -> mpsc::Receiver<ProfileUpdated> {
        self.subscribe_with_capacity(DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Like [`subscribe`](Self::subscribe) with an explicit buffer size.
    pub async fn subscribe_with_capacity(&self, capacity: usize) -> mpsc::Receiver<ProfileUpdated> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let n = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.register(Arc::new(ChannelConsumer::new(format!("channel-{n}"), tx)))
            .await;
        rx
    }

    /// Number of registered consumers.
    pub async fn consumer_count(&self) -> usize {
        self.consumers.read().await.len()
    }

    /// Deliver `profile` to every registered consumer.
    ///
    /// Consumers are called in registration order. A failing consumer is
    /// logged and counted as unreached; the remaining consumers still
    /// receive the event.
    pub async fn notify(&self, profile: &Profile) -> BroadcastReport {
        let event = ProfileUpdated::new(profile.clone(), self.clock.now_millis());
        // Deliver from a snapshot so no lock is held across consumer awaits
        let consumers: Vec<Arc<dyn Consumer>> = self.consumers.read().await.clone();

        let mut report = BroadcastReport::default();
        for consumer in &consumers {
            match consumer.deliver(&event).await {
                Ok(()) => report.reached += 1,
                Err(e) => {
                    debug!(consumer = consumer.id(), error = %e, "Consumer unreachable");
                    report.unreached += 1;
                }
            }
        }

        if consumers.iter().any(|c| c.is_closed()) {
            self.consumers.write().await.retain(|c| !c.is_closed());
        }

        trace!(
            event = event.event_name(),
            sync_status = %event.sync_status,
            reached = report.reached,
            unreached = report.unreached,
            "Broadcast profile update"
        );
        report
    }
}
