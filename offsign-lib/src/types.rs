//! Response shapes returned by the node during an upload session.
//!
//! Field names follow the node's JSON encoding.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{OffsignError, Result};

/// Treat an explicit `null` like a missing field. The node encodes empty
/// maps and lists as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Answer to `storage/upload`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "ID")]
    pub id: String,
}

/// One host's share of an upload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shard {
    #[serde(default)]
    pub contract_id: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: String,
}

/// Answer to `storage/upload/status`.
///
/// `status` is passed back to the node verbatim; the client does not
/// interpret it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file_hash: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shards: HashMap<String, Shard>,
}

impl SessionStatus {
    /// Sum of all shard prices, the amount a channel commitment must cover.
    pub fn total_price(&self) -> Result<i64> {
        self.shards.values().try_fold(0i64, |acc, shard| {
            acc.checked_add(shard.price)
                .ok_or_else(|| OffsignError::invalid_data("shards", "total price overflows i64"))
        })
    }
}

/// A proposed storage contract with one host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractItem {
    /// Host or shard identifier, unique within its batch.
    pub key: String,
    /// Contract blob; holds the base64 signature once signed.
    pub contract: String,
}

impl ContractItem {
    pub fn new(key: impl Into<String>, contract: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            contract: contract.into(),
        }
    }
}

/// Contracts negotiated for a single upload. Order follows host enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractBatch {
    #[serde(rename = "Contracts", default, deserialize_with = "null_as_default")]
    pub contracts: Vec<ContractItem>,
}

impl ContractBatch {
    pub fn new(contracts: Vec<ContractItem>) -> Self {
        Self { contracts }
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Reject empty batches and duplicate keys.
    pub fn validate(&self) -> Result<()> {
        if self.contracts.is_empty() {
            return Err(OffsignError::invalid_data(
                "contract batch",
                "batch contains no contracts",
            ));
        }
        let mut seen = std::collections::HashSet::with_capacity(self.contracts.len());
        for item in &self.contracts {
            if !seen.insert(item.key.as_str()) {
                return Err(OffsignError::invalid_data(
                    "contract batch",
                    format!("duplicate contract key {}", item.key),
                ));
            }
        }
        Ok(())
    }
}

/// Which signed artifact the node is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Detached signature over the raw payload.
    Data,
    /// Public-key attestation for the buyer's ledger balance.
    Balance,
    /// Payment-channel commitment.
    PayChannel,
    /// Escrow payin request.
    PayRequest,
}

impl Opcode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Balance => "balance",
            Self::PayChannel => "paychannel",
            Self::PayRequest => "payrequest",
        }
    }
}

impl FromStr for Opcode {
    type Err = OffsignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "data" | "sign" => Ok(Self::Data),
            "balance" => Ok(Self::Balance),
            "paychannel" | "channel" => Ok(Self::PayChannel),
            "payrequest" | "payin" => Ok(Self::PayRequest),
            _ => Err(OffsignError::UnknownOpcode(s.to_string())),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data handed back by the node that still needs the client's signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnsignedPayload {
    /// Raw content; binary content is base64 encoded.
    #[serde(default)]
    pub unsigned: String,
    /// Names the builder that must process this payload.
    #[serde(default)]
    pub opcode: String,
    /// Price associated with the payload (channel amount for `paychannel`).
    #[serde(default)]
    pub price: i64,
}

impl UnsignedPayload {
    pub fn new(unsigned: impl Into<String>, opcode: Opcode, price: i64) -> Self {
        Self {
            unsigned: unsigned.into(),
            opcode: opcode.as_str().to_string(),
            price,
        }
    }

    /// Parse the declared opcode.
    pub fn opcode(&self) -> Result<Opcode> {
        self.opcode.parse()
    }
}
