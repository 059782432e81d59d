use profile_sync::{Settings, SettingsPatch, SyncStatus, profile::Theme};

use crate::helpers::*;

#[tokio::test]
async fn local_edit_does_not_touch_sync_metadata_or_network() {
    let ctx = TestContext::new();
    let seeded = alice_profile(START - 2 * MINUTE);
    ctx.seed_profile(seeded.clone()).await;
    let mut updates = ctx.instance.subscribe().await;

    let profile = ctx.instance.update_settings(dark_theme()).await;

    assert_eq!(profile.settings.theme, Theme::Dark);
    assert_eq!(profile.last_sync_at, seeded.last_sync_at);
    assert_eq!(profile.sync_status, seeded.sync_status);
    assert_eq!(profile.auth_status, seeded.auth_status);
    assert_eq!(ctx.gateway.fetch_count(), 0);
    assert_eq!(next_update(&mut updates).await.profile, profile);
    assert_eq!(ctx.cached().await, Some(profile));
}

#[tokio::test]
async fn no_op_edit_is_not_broadcast() {
    let ctx = TestContext::new();
    ctx.seed_profile(alice_profile(START)).await;
    let mut updates = ctx.instance.subscribe().await;

    ctx.instance
        .update_settings(SettingsPatch {
            theme: Some(Theme::System),
            ..SettingsPatch::default()
        })
        .await;

    assert!(updates.try_recv().is_err());
}

#[tokio::test]
async fn edit_without_cache_creates_logged_out_record() {
    let ctx = TestContext::new();

    let profile = ctx
        .instance
        .update_settings(SettingsPatch {
            language: Some("de".to_string()),
            compact_mode: Some(true),
            ..SettingsPatch::default()
        })
        .await;

    assert!(!profile.is_logged_in());
    assert_eq!(profile.settings.language, "de");
    assert!(profile.settings.compact_mode);
    assert_eq!(profile.settings.theme, Settings::default().theme);
    assert_eq!(ctx.cached().await, Some(profile));
}

#[tokio::test]
async fn edit_made_during_refresh_survives_it() {
    let ctx = TestContext::new();
    ctx.seed_profile(alice_profile(START - 10 * MINUTE)).await;
    let mut updates = ctx.instance.subscribe().await;
    let gate = ctx.gateway.hold_fetches();

    ctx.instance.get_profile(false).await;
    wait_for_status(&mut updates, SyncStatus::Syncing).await;

    let edited = ctx.instance.update_settings(dark_theme()).await;
    assert_eq!(edited.sync_status, SyncStatus::Syncing);

    gate.notify_one();
    let synced = wait_for_status(&mut updates, SyncStatus::Synced).await;

    assert_eq!(synced.profile.settings.theme, Theme::Dark);
    assert_eq!(ctx.cached().await.unwrap().settings.theme, Theme::Dark);
}

#[tokio::test]
async fn edit_racing_a_background_refresh_survives_it() {
    let ctx = TestContext::yielding();
    ctx.seed_profile(alice_profile(START - 10 * MINUTE)).await;

    ctx.instance.get_profile(false).await;
    ctx.instance.update_settings(dark_theme()).await;
    settle(&ctx).await;

    let cached = ctx.cached().await.unwrap();
    assert_eq!(cached.settings.theme, Theme::Dark);
    assert_eq!(cached.sync_status, SyncStatus::Synced);
    assert_eq!(ctx.gateway.fetch_count(), 1);
}

#[tokio::test]
async fn edit_concurrent_with_forced_refresh_survives_it() {
    let ctx = TestContext::yielding();
    ctx.seed_profile(alice_profile(START - 2 * MINUTE)).await;

    tokio::join!(
        ctx.instance.force_sync(),
        ctx.instance.update_settings(dark_theme()),
    );

    let cached = ctx.cached().await.unwrap();
    assert_eq!(cached.settings.theme, Theme::Dark);
    assert!(cached.is_logged_in());
}
