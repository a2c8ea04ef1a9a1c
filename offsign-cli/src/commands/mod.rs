//! CLI command implementations

pub mod keygen;
pub mod sign;
pub mod status;
pub mod upload;
pub mod whoami;

use anyhow::{Context, Result};
use offsign_lib::dispatch::HttpDispatcher;
use offsign_lib::{config_from_env, key_provider_from_env, ClientConfig, StaticKeyProvider};
use offsign_lib::UploadSessionClient;

pub type NodeClient = UploadSessionClient<HttpDispatcher, StaticKeyProvider>;

/// Resolve configuration: environment first, then the `--api-url` flag.
pub fn load_config(api_url: Option<&str>) -> ClientConfig {
    let mut config = config_from_env();
    if let Some(url) = api_url {
        config.api_url = url.to_string();
    }
    config
}

/// Build a client for the configured node and key.
pub fn connect(api_url: Option<&str>) -> Result<NodeClient> {
    let config = load_config(api_url);
    let keys = key_provider_from_env().context("invalid OFFSIGN_PRIVATE_KEY")?;
    let dispatcher = HttpDispatcher::new(&config)?;
    tracing::debug!(api_url = %config.api_url, "connecting to node");
    Ok(UploadSessionClient::with_config(dispatcher, keys, config))
}
