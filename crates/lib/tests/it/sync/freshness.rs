//! Freshness tiers as seen through `get_profile(false)`.

use profile_sync::{
    SettingsPatch, SyncStatus,
    gateway::ProfilePayload,
    profile::Theme,
};

use crate::helpers::*;

#[tokio::test]
async fn cold_start_fetches_and_caches_logged_out_profile() {
    let ctx = TestContext::new();

    let profile = ctx.instance.get_profile(false).await;

    assert!(profile.user.is_none());
    assert!(!profile.is_logged_in());
    assert_eq!(profile.sync_status, SyncStatus::Synced);
    assert_eq!(profile.last_sync_at, START);
    assert_eq!(ctx.gateway.fetch_count(), 1);
    assert_eq!(ctx.gateway.fetch_tokens(), vec![None]);
    assert_eq!(ctx.cached().await, Some(profile));
    assert_eq!(ctx.instance.last_remote_contact().await, Some(START));
}

#[tokio::test]
async fn cold_start_then_immediate_read_hits_the_cache() {
    let ctx = TestContext::new();
    ctx.gateway.set_anonymous_user(true);

    let first = ctx.instance.get_profile(false).await;
    assert_eq!(first.user, Some(alice()));
    assert_eq!(first.sync_status, SyncStatus::Synced);

    let second = ctx.instance.get_profile(false).await;
    assert_eq!(second, first);
    assert_eq!(ctx.gateway.fetch_count(), 1);
}

#[tokio::test]
async fn fresh_cache_is_served_without_network() {
    let ctx = TestContext::new();
    let seeded = alice_profile(START - 2 * MINUTE);
    ctx.seed_profile(seeded.clone()).await;

    let profile = ctx.instance.get_profile(false).await;
    tokio::task::yield_now().await;

    assert_eq!(profile, seeded);
    assert_eq!(ctx.gateway.fetch_count(), 0);
    assert!(!ctx.instance.engine().is_refreshing().await);
}

#[tokio::test]
async fn stale_cache_is_served_then_refreshed_in_background() {
    let ctx = TestContext::new();
    let seeded = alice_profile(START - 10 * MINUTE);
    ctx.seed_profile(seeded.clone()).await;
    let mut updates = ctx.instance.subscribe().await;

    let profile = ctx.instance.get_profile(false).await;
    assert_eq!(profile, seeded);

    let syncing = next_update(&mut updates).await;
    assert_eq!(syncing.sync_status, SyncStatus::Syncing);
    let synced = next_update(&mut updates).await;
    assert_eq!(synced.sync_status, SyncStatus::Synced);
    assert_eq!(synced.profile.last_sync_at, START);

    assert_eq!(ctx.gateway.fetch_count(), 1);
    assert_eq!(ctx.gateway.fetch_tokens(), vec![Some("token-1".to_string())]);
    assert_eq!(ctx.cached().await, Some(synced.profile));
}

#[tokio::test]
async fn stale_cache_within_cooldown_is_served_without_network() {
    let ctx = TestContext::new();
    let seeded = alice_profile(START - 10 * MINUTE);
    ctx.seed_profile(seeded.clone()).await;
    ctx.seed_last_request(START - MINUTE).await;

    let profile = ctx.instance.get_profile(false).await;
    tokio::task::yield_now().await;

    assert_eq!(profile, seeded);
    assert_eq!(ctx.gateway.fetch_count(), 0);
    assert_eq!(
        ctx.instance.last_remote_contact().await,
        Some(START - MINUTE)
    );
}

#[tokio::test]
async fn expired_cache_is_refreshed_before_returning() {
    let ctx = TestContext::new();
    ctx.seed_profile(alice_profile(START - 40 * MINUTE)).await;
    ctx.gateway.set_profile(ProfilePayload {
        user: Some(alice()),
        settings: Some(SettingsPatch {
            theme: Some(Theme::Dark),
            ..SettingsPatch::default()
        }),
    });

    let profile = ctx.instance.get_profile(false).await;

    assert_eq!(profile.sync_status, SyncStatus::Synced);
    assert_eq!(profile.last_sync_at, START);
    assert_eq!(profile.settings.theme, Theme::Dark);
    assert_eq!(profile.token(), Some("token-1"));
    assert_eq!(ctx.gateway.fetch_count(), 1);
}

#[tokio::test]
async fn cooldown_overrides_expiry() {
    let ctx = TestContext::new();
    let seeded = alice_profile(START - 40 * MINUTE);
    ctx.seed_profile(seeded.clone()).await;
    ctx.seed_last_request(START - 2 * MINUTE).await;

    let profile = ctx.instance.get_profile(false).await;

    assert_eq!(profile, seeded);
    assert_eq!(ctx.gateway.fetch_count(), 0);
}

#[tokio::test]
async fn remote_without_user_logs_out_but_keeps_settings() {
    let ctx = TestContext::new();
    let mut seeded = alice_profile(START - 40 * MINUTE);
    seeded.settings.compact_mode = true;
    ctx.seed_profile(seeded).await;
    ctx.gateway.set_profile(ProfilePayload::default());

    let profile = ctx.instance.get_profile(false).await;

    assert!(!profile.is_logged_in());
    assert!(profile.user.is_none());
    assert_eq!(profile.auth_status.token, None);
    assert!(profile.settings.compact_mode);
    assert_eq!(profile.sync_status, SyncStatus::Synced);
}

#[tokio::test]
async fn clock_walks_through_every_tier() {
    let ctx = TestContext::new();
    ctx.seed_profile(alice_profile(START)).await;
    let mut updates = ctx.instance.subscribe().await;

    // Fresh
    ctx.clock.advance(4 * MINUTE);
    ctx.instance.get_profile(false).await;
    assert_eq!(ctx.gateway.fetch_count(), 0);

    // Stale: background refresh
    ctx.clock.advance(2 * MINUTE);
    let served = ctx.instance.get_profile(false).await;
    assert_eq!(served.last_sync_at, START);
    wait_for_status(&mut updates, SyncStatus::Synced).await;
    assert_eq!(ctx.gateway.fetch_count(), 1);

    // Fresh again after the refresh
    ctx.clock.advance(MINUTE);
    let profile = ctx.instance.get_profile(false).await;
    assert_eq!(profile.last_sync_at, START + 6 * MINUTE);
    assert_eq!(ctx.gateway.fetch_count(), 1);

    // Expired: synchronous refresh
    ctx.clock.advance(45 * MINUTE);
    let profile = ctx.instance.get_profile(false).await;
    assert_eq!(profile.last_sync_at, ctx.now());
    assert_eq!(ctx.gateway.fetch_count(), 2);
}

#[tokio::test]
async fn cleared_cache_within_cooldown_is_rebuilt_without_network() {
    use profile_sync::profile::ProfileCache;

    let ctx = TestContext::new();
    ctx.instance.force_sync().await;
    assert_eq!(ctx.gateway.fetch_count(), 1);

    ctx.clock.advance(MINUTE);
    ProfileCache::new(ctx.store.clone()).clear().await.unwrap();

    let profile = ctx.instance.get_profile(false).await;
    assert_eq!(ctx.gateway.fetch_count(), 1);
    assert!(!profile.is_logged_in());
    assert!(profile.user.is_none());
    assert_eq!(profile.sync_status, SyncStatus::Synced);
    assert_eq!(profile.last_sync_at, START + MINUTE);
    assert_eq!(ctx.cached().await, Some(profile));

    // Forcing does not get past the cooldown either
    ProfileCache::new(ctx.store.clone()).clear().await.unwrap();
    ctx.instance.force_sync().await;
    assert_eq!(ctx.gateway.fetch_count(), 1);
}

#[tokio::test]
async fn corrupt_cache_within_cooldown_is_rebuilt_without_network() {
    use profile_sync::{constants::PROFILE_KEY, storage::DurableStore};

    let ctx = TestContext::new();
    ctx.instance.force_sync().await;
    ctx.clock.advance(MINUTE);
    ctx.store
        .set(PROFILE_KEY, "{not json".to_string())
        .await
        .unwrap();

    let profile = ctx.instance.get_profile(false).await;

    assert_eq!(ctx.gateway.fetch_count(), 1);
    assert_eq!(profile.sync_status, SyncStatus::Synced);
    assert_eq!(ctx.cached().await, Some(profile));
}
