/*! Integration tests for profile-sync.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - sync: freshness tiers, single-flight refreshes and failure handling
 * - session: login, registration and logout
 * - broadcast: delivery of profile updates to consumers
 * - storage: the durable stores
 * - gateway: the HTTP gateway against a local server
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("profile_sync=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod broadcast;
mod storage;
mod sync;
