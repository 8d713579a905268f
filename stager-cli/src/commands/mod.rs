//! CLI command implementations

pub mod fetch;
pub mod run;

pub use fetch::FetchArgs;
pub use run::RunArgs;

use std::sync::Arc;

use stager_core::{Config, Context, SystemRunner, TracingActivity, Workspace};
use stager_hub::HubClient;

/// Hub client for the configured hub and task
pub(crate) fn hub_client(config: &Config) -> anyhow::Result<Arc<HubClient>> {
    let client = HubClient::from_config(&config.hub)
        .map_err(|e| anyhow::anyhow!("Failed to create hub client: {}", e))?;
    Ok(Arc::new(client))
}

/// Workspace whose stores are all served by the hub
pub(crate) fn workspace(config: &Config, client: &Arc<HubClient>) -> Workspace {
    let context = Context {
        settings: client.clone(),
        identities: client.clone(),
        proxies: client.clone(),
        runner: Arc::new(SystemRunner),
        activity: Arc::new(TracingActivity),
    };
    Workspace::new(&config.layout.home, config.tools.clone(), context)
}
