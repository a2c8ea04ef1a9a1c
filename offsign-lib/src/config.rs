//! Client configuration.
//!
//! Values come from code via the `with_*` builders, from serde (e.g. a TOML
//! or JSON file owned by the application), or from environment variables via
//! [`config_from_env`] and [`key_provider_from_env`].

use serde::{Deserialize, Serialize};

use crate::dispatch::UploadOption;
use crate::keys::StaticKeyProvider;
use crate::Result;

/// Node API URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5001";

/// Configuration for the upload session client and its HTTP dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Node API base URL (e.g., "http://127.0.0.1:5001").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Storage length in days applied to offline uploads unless overridden.
    #[serde(default)]
    pub storage_length: Option<u32>,

    /// Request offline-sign mode on offline uploads.
    #[serde(default = "default_offline_sign_mode")]
    pub offline_sign_mode: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_offline_sign_mode() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            storage_length: None,
            offline_sign_mode: default_offline_sign_mode(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given node API URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the default storage length.
    pub fn with_storage_length(mut self, days: u32) -> Self {
        self.storage_length = Some(days);
        self
    }

    /// Enable or disable offline-sign mode for offline uploads.
    pub fn with_offline_sign_mode(mut self, enabled: bool) -> Self {
        self.offline_sign_mode = enabled;
        self
    }

    /// Upload options implied by this configuration.
    pub fn upload_options(&self) -> Vec<UploadOption> {
        let mut options = vec![UploadOption::OfflineSignMode(self.offline_sign_mode)];
        if let Some(days) = self.storage_length {
            options.push(UploadOption::StorageLength(days));
        }
        options
    }
}

/// Load client configuration from environment variables.
///
/// Variables:
/// - `OFFSIGN_API_URL` - node API URL (default: `http://127.0.0.1:5001`)
/// - `OFFSIGN_TIMEOUT` - request timeout in seconds (default: 30)
/// - `OFFSIGN_STORAGE_LENGTH` - storage length in days
/// - `OFFSIGN_OFFLINE_SIGN_MODE` - `true`/`false` (default: true)
///
/// Unparseable numeric values are ignored and the default kept.
pub fn config_from_env() -> ClientConfig {
    config_from_lookup(|name| std::env::var(name).ok())
}

fn config_from_lookup(get: impl Fn(&str) -> Option<String>) -> ClientConfig {
    let mut config = get("OFFSIGN_API_URL")
        .map(ClientConfig::new)
        .unwrap_or_default();

    if let Some(secs) = get("OFFSIGN_TIMEOUT").and_then(|v| v.parse::<u64>().ok()) {
        config = config.with_timeout(secs);
    }
    if let Some(days) = get("OFFSIGN_STORAGE_LENGTH").and_then(|v| v.parse::<u32>().ok()) {
        config = config.with_storage_length(days);
    }
    if let Some(enabled) = get("OFFSIGN_OFFLINE_SIGN_MODE").and_then(|v| v.parse::<bool>().ok()) {
        config = config.with_offline_sign_mode(enabled);
    }

    config
}

/// Load key material from environment variables.
///
/// Variables:
/// - `OFFSIGN_PRIVATE_KEY` - hex Ed25519 private key; unset disables offline signing
/// - `OFFSIGN_PUBLIC_KEY` - hex public key (derived from the private key if unset)
/// - `OFFSIGN_PEER_ID` - peer identity (defaults to the hex public key)
///
/// Fails only if a private key is set but cannot be parsed.
pub fn key_provider_from_env() -> Result<StaticKeyProvider> {
    key_provider_from_lookup(|name| std::env::var(name).ok())
}

fn key_provider_from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<StaticKeyProvider> {
    let non_empty = |name: &str| get(name).filter(|v| !v.trim().is_empty());

    let mut provider = match non_empty("OFFSIGN_PRIVATE_KEY") {
        Some(private_key) => StaticKeyProvider::from_private_key(private_key)?,
        None => StaticKeyProvider::default(),
    };
    if let Some(public_key) = non_empty("OFFSIGN_PUBLIC_KEY") {
        provider.public_key = public_key;
    }
    if let Some(peer_id) = non_empty("OFFSIGN_PEER_ID") {
        provider = provider.with_peer_id(peer_id);
    }

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyProvider;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = config_from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.upload_options(), vec![UploadOption::OfflineSignMode(true)]);
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from_lookup(lookup(&[
            ("OFFSIGN_API_URL", "http://node:5001"),
            ("OFFSIGN_TIMEOUT", "5"),
            ("OFFSIGN_STORAGE_LENGTH", "60"),
            ("OFFSIGN_OFFLINE_SIGN_MODE", "false"),
        ]));
        assert_eq!(config.api_url, "http://node:5001");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(
            config.upload_options(),
            vec![
                UploadOption::OfflineSignMode(false),
                UploadOption::StorageLength(60)
            ]
        );
    }

    #[test]
    fn test_bad_numbers_ignored() {
        let config = config_from_lookup(lookup(&[("OFFSIGN_TIMEOUT", "soon")]));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_serde_fills_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"storage_length": 30}"#).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.storage_length, Some(30));
        assert!(config.offline_sign_mode);
    }

    #[test]
    fn test_key_provider_without_private_key() {
        let provider = key_provider_from_lookup(lookup(&[("OFFSIGN_PEER_ID", "peer-A")])).unwrap();
        assert!(provider.private_key().is_empty());
        assert_eq!(provider.peer_id(), "peer-A");
    }

    #[test]
    fn test_key_provider_from_private_key() {
        let generated = crate::keys::generate_keypair();
        let provider = key_provider_from_lookup(lookup(&[
            ("OFFSIGN_PRIVATE_KEY", generated.private_key.as_str()),
            ("OFFSIGN_PEER_ID", "peer-B"),
        ]))
        .unwrap();
        assert_eq!(provider.public_key(), generated.public_key);
        assert_eq!(provider.peer_id(), "peer-B");
    }

    #[test]
    fn test_key_provider_rejects_garbage_key() {
        assert!(key_provider_from_lookup(lookup(&[("OFFSIGN_PRIVATE_KEY", "nope")])).is_err());
    }
}
