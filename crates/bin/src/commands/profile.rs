//! Profile command - shows the cached profile, refreshing it as needed.

use std::time::Duration;

use profile_sync::Instance;

use crate::cli::{OutputFormat, ProfileArgs};
use crate::output::print_profile;

/// Run the profile command
pub async fn run(
    instance: &Instance,
    args: &ProfileArgs,
    format: OutputFormat,
    settle_limit: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = instance.get_profile(args.force).await;
    print_profile(&profile, format)?;

    // A stale read leaves a refresh running; let it persist before exiting
    settle(instance, settle_limit).await;
    Ok(())
}

/// Wait up to `limit` for an in-flight refresh to finish.
async fn settle(instance: &Instance, limit: Duration) {
    let wait = async {
        while instance.engine().is_refreshing().await {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    };
    if tokio::time::timeout(limit, wait).await.is_err() {
        tracing::warn!("Background refresh still running at exit; its result is lost");
    }
}
