//! Delivery of `profile-updated` events from engine and session writes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use profile_sync::{
    Result, SyncStatus,
    broadcast::{BroadcastError, Consumer, ProfileUpdated},
    gateway::Credentials,
};

use crate::helpers::*;

/// Remembers the status of every event it receives.
#[derive(Default)]
struct RecordingConsumer {
    seen: Mutex<Vec<SyncStatus>>,
}

#[async_trait]
impl Consumer for RecordingConsumer {
    fn id(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, event: &ProfileUpdated) -> Result<()> {
        self.seen.lock().unwrap().push(event.sync_status);
        Ok(())
    }
}

/// A host consumer whose transport is gone.
struct DisconnectedConsumer;

#[async_trait]
impl Consumer for DisconnectedConsumer {
    fn id(&self) -> &str {
        "disconnected"
    }

    async fn deliver(&self, _event: &ProfileUpdated) -> Result<()> {
        Err(BroadcastError::Delivery {
            consumer: "disconnected".to_string(),
            reason: "receiving end does not exist".to_string(),
        }
        .into())
    }
}

#[tokio::test]
async fn synchronous_refresh_emits_syncing_then_synced() {
    let ctx = TestContext::new();
    ctx.seed_profile(alice_profile(START - 40 * MINUTE)).await;
    let recorder = Arc::new(RecordingConsumer::default());
    ctx.instance.register_consumer(recorder.clone()).await;

    ctx.instance.get_profile(false).await;

    assert_eq!(
        *recorder.seen.lock().unwrap(),
        vec![SyncStatus::Syncing, SyncStatus::Synced]
    );
}

#[tokio::test]
async fn failing_consumer_does_not_fail_the_sync() {
    let ctx = TestContext::new();
    ctx.seed_profile(alice_profile(START - 40 * MINUTE)).await;
    ctx.instance
        .register_consumer(Arc::new(DisconnectedConsumer))
        .await;
    let mut updates = ctx.instance.subscribe().await;

    let profile = ctx.instance.get_profile(false).await;

    assert_eq!(profile.sync_status, SyncStatus::Synced);
    let synced = wait_for_status(&mut updates, SyncStatus::Synced).await;
    assert_eq!(synced.profile, profile);
    assert_eq!(synced.timestamp, START);
}

#[tokio::test]
async fn dropped_subscriber_is_forgotten() {
    let ctx = TestContext::new();
    let dropped = ctx.instance.subscribe().await;
    let _kept = ctx.instance.subscribe().await;
    drop(dropped);

    ctx.instance.get_profile(false).await;

    assert_eq!(ctx.instance.engine().broadcaster().consumer_count().await, 1);
}

#[tokio::test]
async fn session_changes_are_broadcast() {
    let ctx = TestContext::new();
    let recorder = Arc::new(RecordingConsumer::default());
    ctx.instance.register_consumer(recorder.clone()).await;
    let mut updates = ctx.instance.subscribe().await;

    ctx.instance
        .login(&Credentials::new("alice", "hunter2"))
        .await
        .unwrap();
    let login = next_update(&mut updates).await;
    assert!(login.profile.is_logged_in());

    ctx.instance.logout().await;
    let logout = next_update(&mut updates).await;
    assert!(!logout.profile.is_logged_in());

    assert_eq!(recorder.seen.lock().unwrap().len(), 2);
}
