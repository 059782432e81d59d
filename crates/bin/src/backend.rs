//! Instance construction from CLI configuration.

use std::{path::PathBuf, sync::Arc, time::Duration};

use profile_sync::{
    Instance, config::SyncConfig, gateway::HttpGateway, storage::JsonFileStore,
};

use crate::cli::GlobalArgs;

/// File under the data directory holding the cached profile and throttle state.
pub const STATE_FILE: &str = "profile-sync.json";

/// Open the instance described by the global options.
pub async fn open_instance(args: &GlobalArgs) -> Result<Instance, Box<dyn std::error::Error>> {
    let data_dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    let state_path = data_dir.join(STATE_FILE);
    tracing::debug!("Using state file at {}", state_path.display());
    let store = Arc::new(JsonFileStore::open(&state_path).await?);

    let gateway = HttpGateway::with_timeout(&args.remote_url, Duration::from_secs(args.timeout))?;
    tracing::debug!("Using remote at {}", gateway.base_url());

    let mut config = SyncConfig::default();
    if let Some(secs) = args.cooldown_secs {
        config = config.with_cooldown(Duration::from_secs(secs));
    }

    Ok(Instance::builder(store, Arc::new(gateway))
        .config(config)
        .build()?)
}
