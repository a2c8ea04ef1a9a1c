//! Protocol-buffer wire messages exchanged with the ledger and escrow services.
//!
//! These mirror the node's `ledger` and `escrow` protobuf packages. Only the
//! fields the offline signer reads or writes are declared; unknown fields
//! sent by the node are skipped on decode.

/// Raw public key bytes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublicKey {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
}

/// A public key together with a signature over its own encoding.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedPublicKey {
    #[prost(message, optional, tag = "1")]
    pub key: Option<PublicKey>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

/// Proposed payment channel between a payer and a recipient.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelCommit {
    #[prost(message, optional, tag = "1")]
    pub payer: Option<PublicKey>,
    #[prost(message, optional, tag = "2")]
    pub recipient: Option<PublicKey>,
    #[prost(int64, tag = "3")]
    pub amount: i64,
    #[prost(int64, tag = "4")]
    pub payer_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedChannelCommit {
    #[prost(message, optional, tag = "1")]
    pub channel: Option<ChannelCommit>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelId {
    #[prost(int64, tag = "1")]
    pub id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Account {
    #[prost(message, optional, tag = "1")]
    pub address: Option<PublicKey>,
    #[prost(int64, tag = "2")]
    pub balance: i64,
}

/// Balance snapshot of a channel at a given sequence number.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelState {
    #[prost(message, optional, tag = "1")]
    pub id: Option<ChannelId>,
    #[prost(int64, tag = "2")]
    pub sequence: i64,
    #[prost(message, optional, tag = "3")]
    pub from: Option<Account>,
    #[prost(message, optional, tag = "4")]
    pub to: Option<Account>,
}

/// Channel state carrying the signatures of both parties.
///
/// `from_signature` is the buyer's signature over `channel`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedChannelState {
    #[prost(message, optional, tag = "1")]
    pub channel: Option<ChannelState>,
    #[prost(bytes = "vec", tag = "2")]
    pub from_signature: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub to_signature: Vec<u8>,
}

/// Escrow's answer to a submitted contract, handed to the client unsigned.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitContractResult {
    #[prost(string, tag = "1")]
    pub payin_id: String,
    #[prost(message, optional, tag = "2")]
    pub buyer_channel_state: Option<SignedChannelState>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedSubmitContractResult {
    #[prost(message, optional, tag = "1")]
    pub result: Option<SubmitContractResult>,
    #[prost(bytes = "vec", tag = "2")]
    pub escrow_signature: Vec<u8>,
}

/// Request asking escrow to accept the buyer's funds for a channel.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PayinRequest {
    #[prost(string, tag = "1")]
    pub payin_id: String,
    #[prost(bytes = "vec", tag = "2")]
    pub buyer_address: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub buyer_channel_state: Option<SignedChannelState>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedPayinRequest {
    #[prost(message, optional, tag = "1")]
    pub request: Option<PayinRequest>,
    #[prost(bytes = "vec", tag = "2")]
    pub buyer_signature: Vec<u8>,
}
