//! Durable stores under a real instance.

use std::sync::Arc;

use profile_sync::{
    FixedClock, Instance, SyncStatus,
    constants::{PROFILE_KEY, THROTTLE_KEY},
    gateway::Credentials,
    profile::{ProfileCache, Theme},
    storage::{DurableStore, InMemoryStore, JsonFileStore},
};
use tempfile::TempDir;

use crate::helpers::*;

async fn file_instance(dir: &TempDir, gateway: Arc<MockGateway>) -> (Instance, Arc<JsonFileStore>) {
    let store = Arc::new(
        JsonFileStore::open(dir.path().join("profile-sync.json"))
            .await
            .unwrap(),
    );
    let instance = Instance::builder(store.clone(), gateway)
        .clock(Arc::new(FixedClock::new(START)))
        .build()
        .unwrap();
    (instance, store)
}

#[tokio::test]
async fn session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(MockGateway::new());

    {
        let (instance, _) = file_instance(&dir, gateway.clone()).await;
        instance
            .login(&Credentials::new("alice", "hunter2"))
            .await
            .unwrap();
        instance.update_settings(dark_theme()).await;
    }

    let (instance, _) = file_instance(&dir, gateway.clone()).await;
    let profile = instance.get_profile(false).await;

    assert!(profile.is_logged_in());
    assert_eq!(profile.token(), Some("token-2"));
    assert_eq!(profile.settings.theme, Theme::Dark);
    assert_eq!(instance.last_remote_contact().await, Some(START));
    assert_eq!(gateway.fetch_count(), 0);
}

#[tokio::test]
async fn profile_and_throttle_live_under_separate_keys() {
    let dir = TempDir::new().unwrap();
    let (instance, store) = file_instance(&dir, Arc::new(MockGateway::new())).await;

    instance.get_profile(false).await;

    let profile: serde_json::Value =
        serde_json::from_str(&store.get(PROFILE_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(profile["_v"], 1);
    assert_eq!(profile["profile"]["syncStatus"], "synced");
    assert_eq!(profile["profile"]["authStatus"]["isLoggedIn"], false);

    let throttle: serde_json::Value =
        serde_json::from_str(&store.get(THROTTLE_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(throttle["lastRequestAt"], START);
}

#[tokio::test]
async fn unknown_record_version_reads_as_error_and_is_replaced() {
    let ctx = TestContext::new();
    ctx.store
        .set(
            PROFILE_KEY,
            r#"{"_v":99,"profile":{"user":null,"lastSyncAt":0}}"#.to_string(),
        )
        .await
        .unwrap();

    let cache = ProfileCache::new(ctx.store.clone());
    let err = cache.read().await.unwrap_err();
    assert!(err.is_storage_error());
    assert_eq!(cache.read_lenient().await, None);

    let profile = ctx.instance.get_profile(false).await;
    assert_eq!(profile.sync_status, SyncStatus::Synced);
    assert!(cache.read().await.unwrap().is_some());
}

#[tokio::test]
async fn in_memory_store_snapshot_round_trips_through_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    let ctx = TestContext::new();
    ctx.instance
        .login(&Credentials::new("alice", "hunter2"))
        .await
        .unwrap();

    ctx.store.save_to_file(&path).await.unwrap();
    let restored = Arc::new(InMemoryStore::load_from_file(&path).await.unwrap());

    let cached = ProfileCache::new(restored).read().await.unwrap().unwrap();
    assert_eq!(Some(cached), ctx.cached().await);
}

#[tokio::test]
async fn corrupt_state_file_starts_a_fresh_instance() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile-sync.json");
    tokio::fs::write(&path, "{\"_v\":").await.unwrap();
    let gateway = Arc::new(MockGateway::new());

    let (instance, _) = file_instance(&dir, gateway.clone()).await;
    let profile = instance.get_profile(false).await;

    assert_eq!(profile.sync_status, SyncStatus::Synced);
    assert_eq!(gateway.fetch_count(), 1);
    assert!(dir.path().join("profile-sync.json.corrupt").exists());

    let (reopened, _) = file_instance(&dir, gateway.clone()).await;
    assert_eq!(reopened.engine().cached().await, Some(profile));
}
