//! # Upload Session Client
//!
//! Drives the client side of an offline-signed upload. Each operation is one
//! round-trip through the injected [`Dispatcher`]; signing operations first
//! require a configured private key, then run the matching message builder,
//! then submit the result tagged with a fresh session tag and the session
//! status string the node supplied.
//!
//! The client never interprets session status strings and holds no session
//! state of its own: the node decides which artifact it is waiting for.
//!
//! # Example
//!
//! ```rust,ignore
//! use offsign_lib::{UploadSessionClient, StaticKeyProvider, upload_timestamp};
//! use offsign_lib::dispatch::{HttpDispatcher, UploadOption};
//!
//! let client = UploadSessionClient::with_config(HttpDispatcher::new(&config)?, keys, config);
//! let uts = upload_timestamp();
//! let sid = client.start_upload_offline("Qm...", &uts, &[UploadOption::StorageLength(30)]).await?;
//!
//! let status = client.upload_status(&sid).await?;
//! let batch = client.fetch_contract_batch(&sid, "Qm...", &uts, &status.status).await?;
//! client.submit_signed_batch(&sid, "Qm...", &batch, &uts, &status.status).await?;
//!
//! let status = client.upload_status(&sid).await?;
//! let unsigned = client.fetch_unsigned_data(&sid, "Qm...", &uts, &status.status).await?;
//! client.submit_signed(&sid, "Qm...", &unsigned, &uts, &status.status).await?;
//! ```

use serde::de::DeserializeOwned;

use crate::builders::{
    build_balance_attestation, build_channel_commit, build_payin_request, sign_contract_batch,
    sign_raw_data, SignedArtifact,
};
use crate::config::ClientConfig;
use crate::crypto::{decode_public_key, Signer};
use crate::dispatch::{
    Dispatcher, SessionRequest, UploadOption, OP_GET_CONTRACT_BATCH, OP_GET_UNSIGNED, OP_SIGN,
    OP_SIGN_BATCH, OP_UPLOAD, OP_UPLOAD_STATUS,
};
use crate::keys::KeyProvider;
use crate::session::{derive_session_tag, PayerIdSource};
use crate::types::{ContractBatch, Opcode, SessionStatus, UnsignedPayload, UploadResponse};
use crate::{OffsignError, Result};

/// Client for the offline-signing upload protocol.
pub struct UploadSessionClient<D, K> {
    dispatcher: D,
    keys: K,
    config: ClientConfig,
    payer_ids: PayerIdSource,
}

impl<D, K> UploadSessionClient<D, K>
where
    D: Dispatcher,
    K: KeyProvider,
{
    /// Create a client with the default configuration.
    pub fn new(dispatcher: D, keys: K) -> Self {
        Self::with_config(dispatcher, keys, ClientConfig::default())
    }

    /// Create a client with an explicit configuration.
    pub fn with_config(dispatcher: D, keys: K, config: ClientConfig) -> Self {
        Self {
            dispatcher,
            keys,
            config,
            payer_ids: PayerIdSource::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn key_provider(&self) -> &K {
        &self.keys
    }

    /// Start an upload that the node signs itself.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn start_upload(&self, content_hash: &str) -> Result<String> {
        let request = SessionRequest::new(OP_UPLOAD).arg(content_hash);
        self.upload(request).await
    }

    /// Start an upload whose signatures are produced by this client.
    ///
    /// Configured defaults (offline-sign mode, storage length) are applied
    /// first; `options` override them.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, options)))]
    pub async fn start_upload_offline(
        &self,
        content_hash: &str,
        upload_timestamp: &str,
        options: &[UploadOption],
    ) -> Result<String> {
        let request = self
            .tagged_request(OP_UPLOAD, content_hash, content_hash, upload_timestamp)
            .with_options(&self.config.upload_options())
            .with_options(options);
        self.upload(request).await
    }

    /// Poll the status of an upload session.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn upload_status(&self, session_id: &str) -> Result<SessionStatus> {
        let request = SessionRequest::new(OP_UPLOAD_STATUS).arg(session_id);
        self.call_json(request).await
    }

    /// Fetch the contracts awaiting this client's signatures.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn fetch_contract_batch(
        &self,
        session_id: &str,
        content_hash: &str,
        upload_timestamp: &str,
        session_status: &str,
    ) -> Result<ContractBatch> {
        let request = self
            .tagged_request(OP_GET_CONTRACT_BATCH, session_id, content_hash, upload_timestamp)
            .arg(session_status);
        self.call_json(request).await
    }

    /// Fetch the payload awaiting this client's signature.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn fetch_unsigned_data(
        &self,
        session_id: &str,
        content_hash: &str,
        upload_timestamp: &str,
        session_status: &str,
    ) -> Result<UnsignedPayload> {
        let request = self
            .tagged_request(OP_GET_UNSIGNED, session_id, content_hash, upload_timestamp)
            .arg(session_status);
        self.call_json(request).await
    }

    /// Sign every contract in `batch` and submit the signed batch.
    ///
    /// Nothing is sent unless every contract was signed.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, batch), fields(contracts = batch.len())))]
    pub async fn submit_signed_batch(
        &self,
        session_id: &str,
        content_hash: &str,
        batch: &ContractBatch,
        upload_timestamp: &str,
        session_status: &str,
    ) -> Result<Vec<u8>> {
        let signer = self.require_signer()?;
        let signed = sign_contract_batch(signer.as_ref(), batch)?;
        let items = serde_json::to_string(&signed.contracts)
            .map_err(|e| OffsignError::serialization("signed contract batch", e))?;

        let request = self
            .tagged_request(OP_SIGN_BATCH, session_id, content_hash, upload_timestamp)
            .arg(session_status)
            .arg(items);
        self.dispatcher.dispatch(request).await
    }

    /// Sign the payload's raw content and submit the signature.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, payload)))]
    pub async fn submit_signed_data(
        &self,
        session_id: &str,
        content_hash: &str,
        payload: &UnsignedPayload,
        upload_timestamp: &str,
        session_status: &str,
    ) -> Result<Vec<u8>> {
        let artifact = self.sign_expected(payload, Opcode::Data, payload.price)?;
        self.submit_artifact(&artifact, session_id, content_hash, upload_timestamp, session_status)
            .await
    }

    /// Submit a public-key attestation for the buyer's ledger balance.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, payload)))]
    pub async fn submit_signed_balance(
        &self,
        session_id: &str,
        content_hash: &str,
        payload: &UnsignedPayload,
        upload_timestamp: &str,
        session_status: &str,
    ) -> Result<Vec<u8>> {
        let artifact = self.sign_expected(payload, Opcode::Balance, payload.price)?;
        self.submit_artifact(&artifact, session_id, content_hash, upload_timestamp, session_status)
            .await
    }

    /// Commit to a payment channel covering `total_price`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, payload)))]
    pub async fn submit_signed_channel_commit(
        &self,
        session_id: &str,
        content_hash: &str,
        payload: &UnsignedPayload,
        upload_timestamp: &str,
        session_status: &str,
        total_price: i64,
    ) -> Result<Vec<u8>> {
        let artifact = self.sign_expected(payload, Opcode::PayChannel, total_price)?;
        self.submit_artifact(&artifact, session_id, content_hash, upload_timestamp, session_status)
            .await
    }

    /// Sign and submit the escrow payin request.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, payload)))]
    pub async fn submit_signed_payin_request(
        &self,
        session_id: &str,
        content_hash: &str,
        payload: &UnsignedPayload,
        upload_timestamp: &str,
        session_status: &str,
    ) -> Result<Vec<u8>> {
        let artifact = self.sign_expected(payload, Opcode::PayRequest, payload.price)?;
        self.submit_artifact(&artifact, session_id, content_hash, upload_timestamp, session_status)
            .await
    }

    /// Sign `payload` with the builder its opcode names, and submit it.
    ///
    /// Channel commitments use the payload's price as the total amount.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, payload), fields(opcode = %payload.opcode)))]
    pub async fn submit_signed(
        &self,
        session_id: &str,
        content_hash: &str,
        payload: &UnsignedPayload,
        upload_timestamp: &str,
        session_status: &str,
    ) -> Result<Vec<u8>> {
        let signer = self.require_signer()?;
        let opcode = payload.opcode()?;
        let artifact = self.build_artifact(signer.as_ref(), opcode, payload, payload.price)?;
        self.submit_artifact(&artifact, session_id, content_hash, upload_timestamp, session_status)
            .await
    }

    /// Build the signed artifact for `payload` without submitting it.
    pub fn sign_artifact(
        &self,
        payload: &UnsignedPayload,
        opcode: Opcode,
        total_price: i64,
    ) -> Result<SignedArtifact> {
        let signer = self.require_signer()?;
        self.build_artifact(signer.as_ref(), opcode, payload, total_price)
    }

    fn sign_expected(
        &self,
        payload: &UnsignedPayload,
        expected: Opcode,
        total_price: i64,
    ) -> Result<SignedArtifact> {
        let signer = self.require_signer()?;
        if !payload.opcode.trim().is_empty() {
            let declared = payload.opcode()?;
            if declared != expected {
                return Err(OffsignError::invalid_data(
                    "opcode",
                    format!("payload expects {} but {} was requested", declared, expected),
                ));
            }
        }
        self.build_artifact(signer.as_ref(), expected, payload, total_price)
    }

    fn build_artifact(
        &self,
        signer: &dyn Signer,
        opcode: Opcode,
        payload: &UnsignedPayload,
        total_price: i64,
    ) -> Result<SignedArtifact> {
        let artifact = match opcode {
            Opcode::Data => SignedArtifact::Data(sign_raw_data(signer, payload)?),
            Opcode::Balance => SignedArtifact::Balance(build_balance_attestation(signer)?),
            Opcode::PayChannel => {
                let payer = self.own_public_key(signer)?;
                let payer_id = self.payer_ids.next_id();
                SignedArtifact::ChannelCommit(build_channel_commit(
                    signer,
                    payer,
                    payload,
                    total_price,
                    payer_id,
                )?)
            }
            Opcode::PayRequest => {
                let buyer_address = self.own_public_key(signer)?;
                SignedArtifact::PayinRequest(build_payin_request(signer, buyer_address, payload)?)
            }
        };
        Ok(artifact)
    }

    async fn submit_artifact(
        &self,
        artifact: &SignedArtifact,
        session_id: &str,
        content_hash: &str,
        upload_timestamp: &str,
        session_status: &str,
    ) -> Result<Vec<u8>> {
        let request = self
            .tagged_request(OP_SIGN, session_id, content_hash, upload_timestamp)
            .arg(artifact.to_param()?)
            .arg(session_status);
        self.dispatcher.dispatch(request).await
    }

    /// Load the signer, failing before any signing if no key is configured.
    fn require_signer(&self) -> Result<Box<dyn Signer>> {
        let private_key = self.keys.private_key();
        if private_key.trim().is_empty() {
            return Err(OffsignError::MissingKey);
        }
        self.keys.load_signer(&private_key)
    }

    /// The caller's raw public key: the configured one, else derived.
    fn own_public_key(&self, signer: &dyn Signer) -> Result<Vec<u8>> {
        let configured = self.keys.public_key();
        if configured.trim().is_empty() {
            signer
                .public_key_raw()
                .map_err(|e| OffsignError::KeyDerivation(e.to_string()))
        } else {
            decode_public_key(&configured)
        }
    }

    /// `operation id peer_id uts session_tag` - the common prefix of every
    /// offline-session request.
    fn tagged_request(
        &self,
        operation: &str,
        id: &str,
        content_hash: &str,
        upload_timestamp: &str,
    ) -> SessionRequest {
        let peer_id = self.keys.peer_id();
        let tag = derive_session_tag(content_hash, &peer_id);
        SessionRequest::new(operation)
            .arg(id)
            .arg(peer_id)
            .arg(upload_timestamp)
            .arg(tag.tag)
    }

    async fn upload(&self, request: SessionRequest) -> Result<String> {
        let response: UploadResponse = self.call_json(request).await?;
        if response.id.is_empty() {
            return Err(OffsignError::Decoding("node returned an empty session id".into()));
        }
        Ok(response.id)
    }

    async fn call_json<T: DeserializeOwned>(&self, request: SessionRequest) -> Result<T> {
        let operation = request.operation.clone();
        let body = self.dispatcher.dispatch(request).await?;
        serde_json::from_slice(&body).map_err(|e| OffsignError::decoding(&operation, e))
    }
}
