//! Whoami command - show the configured identity

use anyhow::Result;
use offsign_lib::{key_provider_from_env, KeyProvider};

use crate::ui;

pub fn run(api_url: Option<&str>, _verbose: bool) -> Result<()> {
    let config = super::load_config(api_url);
    let keys = key_provider_from_env()?;

    ui::header("Current Identity");
    ui::key_value("Node", &config.api_url);
    if keys.peer_id().is_empty() {
        ui::key_value("Peer ID", "(not set)");
    } else {
        ui::key_value("Peer ID", &keys.peer_id());
    }
    if !keys.public_key().is_empty() {
        ui::key_value("Public Key", &keys.public_key());
    }

    if keys.has_private_key() {
        ui::success("Offline signing available");
    } else {
        ui::error("No private key configured");
        ui::info("Run 'offsign keygen' and export OFFSIGN_PRIVATE_KEY");
    }

    Ok(())
}
