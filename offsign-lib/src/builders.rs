//! # Message Builders
//!
//! Each builder turns an unsigned payload plus a signing capability into a
//! fully signed message. Builders are pure: they never dispatch anything and
//! never hand back a partially signed result.
//!
//! | Opcode       | Builder                       | Wire form                     |
//! |--------------|-------------------------------|-------------------------------|
//! | `data`       | [`sign_raw_data`]             | raw signature                 |
//! | `balance`    | [`build_balance_attestation`] | protobuf `SignedPublicKey`    |
//! | `paychannel` | [`build_channel_commit`]      | protobuf `SignedChannelCommit`|
//! | `payrequest` | [`build_payin_request`]       | protobuf `SignedPayinRequest` |
//!
//! Contract batches are signed separately by [`sign_contract_batch`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use prost::Message;

use crate::crypto::{sign_message, Signer};
use crate::messages::{
    ChannelCommit, PayinRequest, PublicKey, SignedChannelCommit, SignedPayinRequest,
    SignedPublicKey, SignedSubmitContractResult,
};
use crate::types::{ContractBatch, ContractItem, Opcode, UnsignedPayload};
use crate::{OffsignError, Result};

/// Encode binary data for a string parameter or JSON string field.
pub fn encode_binary(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode binary data carried in a string field.
pub fn decode_binary(field: &str, encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| OffsignError::Decoding(format!("{} is not valid base64: {}", field, e)))
}

/// Encode a signed envelope in protobuf wire format.
pub fn encode_envelope<M: Message>(message: &M) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(message.encoded_len());
    message.encode(&mut buf)?;
    Ok(buf)
}

/// Sign the payload's raw content directly.
pub fn sign_raw_data(signer: &dyn Signer, payload: &UnsignedPayload) -> Result<Vec<u8>> {
    signer.sign(payload.unsigned.as_bytes())
}

/// Attest possession of the private key by signing its own public key.
pub fn build_balance_attestation(signer: &dyn Signer) -> Result<SignedPublicKey> {
    let raw = signer.public_key_raw().map_err(|e| match e {
        OffsignError::KeyDerivation(_) => e,
        other => OffsignError::KeyDerivation(other.to_string()),
    })?;
    if raw.is_empty() {
        return Err(OffsignError::KeyDerivation("public key is empty".into()));
    }

    let key = PublicKey { key: raw };
    let signature = sign_message(signer, &key)?;
    Ok(SignedPublicKey {
        key: Some(key),
        signature,
    })
}

/// Replace every contract with the base64 signature over its original content.
///
/// All-or-nothing: the first failure aborts and the input batch is left as it
/// was. Keys and order are preserved.
pub fn sign_contract_batch(signer: &dyn Signer, batch: &ContractBatch) -> Result<ContractBatch> {
    batch.validate()?;

    let contracts = batch
        .contracts
        .iter()
        .map(|item| {
            let signature = signer.sign(item.contract.as_bytes()).map_err(|e| {
                #[cfg(feature = "tracing")]
                tracing::warn!(key = %item.key, error = %e, "contract signing failed");
                e
            })?;
            Ok(ContractItem {
                key: item.key.clone(),
                contract: encode_binary(&signature),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ContractBatch { contracts })
}

/// Build and sign a payment-channel commitment.
///
/// `payer_public_key` is the caller's raw public key; the recipient key is the
/// base64 content of the payload. The signature covers the commitment
/// structure, then both are wrapped in a [`SignedChannelCommit`].
pub fn build_channel_commit(
    signer: &dyn Signer,
    payer_public_key: Vec<u8>,
    payload: &UnsignedPayload,
    total_price: i64,
    payer_id: i64,
) -> Result<SignedChannelCommit> {
    if total_price < 0 {
        return Err(OffsignError::invalid_data(
            "total price",
            format!("must not be negative, got {}", total_price),
        ));
    }
    let recipient = decode_binary("recipient key", &payload.unsigned)?;
    if recipient.is_empty() {
        return Err(OffsignError::Decoding("recipient key is empty".into()));
    }

    let channel = ChannelCommit {
        payer: Some(PublicKey {
            key: payer_public_key,
        }),
        recipient: Some(PublicKey { key: recipient }),
        amount: total_price,
        payer_id,
    };
    let signature = sign_message(signer, &channel)?;

    Ok(SignedChannelCommit {
        channel: Some(channel),
        signature,
    })
}

/// Build an escrow payin request from the escrow's submit-contract result.
///
/// Two signatures are produced: the buyer's signature over the
/// [`SignedChannelState`](crate::messages::SignedChannelState) as received
/// with an empty `from_signature` (then stored there), and the buyer's
/// signature over the whole [`PayinRequest`].
pub fn build_payin_request(
    signer: &dyn Signer,
    buyer_address: Vec<u8>,
    payload: &UnsignedPayload,
) -> Result<SignedPayinRequest> {
    let encoded = decode_binary("submit contract result", &payload.unsigned)?;
    let submitted = SignedSubmitContractResult::decode(encoded.as_slice())?;
    let result = submitted
        .result
        .ok_or_else(|| OffsignError::Decoding("submit contract result is missing".into()))?;
    let mut channel_state = result
        .buyer_channel_state
        .ok_or_else(|| OffsignError::Decoding("buyer channel state is missing".into()))?;
    if channel_state.channel.is_none() {
        return Err(OffsignError::Decoding(
            "buyer channel state has no channel".into(),
        ));
    }

    // The buyer signs the whole signed-state envelope before its own
    // signature is attached.
    channel_state.from_signature.clear();
    channel_state.from_signature = sign_message(signer, &channel_state)?;

    let request = PayinRequest {
        payin_id: result.payin_id,
        buyer_address,
        buyer_channel_state: Some(channel_state),
    };
    let buyer_signature = sign_message(signer, &request)?;

    Ok(SignedPayinRequest {
        request: Some(request),
        buyer_signature,
    })
}

/// A signed artifact ready to be submitted with `storage/upload/sign`.
#[derive(Clone, Debug, PartialEq)]
pub enum SignedArtifact {
    Data(Vec<u8>),
    Balance(SignedPublicKey),
    ChannelCommit(SignedChannelCommit),
    PayinRequest(SignedPayinRequest),
}

impl SignedArtifact {
    /// Opcode this artifact answers.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Data(_) => Opcode::Data,
            Self::Balance(_) => Opcode::Balance,
            Self::ChannelCommit(_) => Opcode::PayChannel,
            Self::PayinRequest(_) => Opcode::PayRequest,
        }
    }

    /// Wire bytes: the raw signature, or the protobuf envelope.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Data(signature) => Ok(signature.clone()),
            Self::Balance(attestation) => encode_envelope(attestation),
            Self::ChannelCommit(commit) => encode_envelope(commit),
            Self::PayinRequest(request) => encode_envelope(request),
        }
    }

    /// Wire bytes encoded as a dispatcher parameter.
    pub fn to_param(&self) -> Result<String> {
        Ok(encode_binary(&self.to_bytes()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{verify_message, verify_signature, Ed25519Signer};
    use crate::messages::{
        Account, ChannelId, ChannelState, SignedChannelState, SubmitContractResult,
    };
    use crate::test_utils::{FailingSigner, TEST_PRIVATE_KEY};

    fn signer() -> Ed25519Signer {
        Ed25519Signer::from_private_key(TEST_PRIVATE_KEY).unwrap()
    }

    fn public(signer: &Ed25519Signer) -> Vec<u8> {
        signer.public_key_raw().unwrap()
    }

    /// The signed channel state as the buyer signs it: no buyer signature yet.
    fn unsigned_envelope(channel_state: &SignedChannelState) -> SignedChannelState {
        SignedChannelState {
            from_signature: vec![],
            ..channel_state.clone()
        }
    }

    fn submit_result_payload() -> (UnsignedPayload, ChannelState) {
        let state = ChannelState {
            id: Some(ChannelId { id: 99 }),
            sequence: 0,
            from: Some(Account {
                address: Some(PublicKey { key: vec![1; 32] }),
                balance: 1_000,
            }),
            to: Some(Account {
                address: Some(PublicKey { key: vec![2; 32] }),
                balance: 0,
            }),
        };
        let result = SignedSubmitContractResult {
            result: Some(SubmitContractResult {
                payin_id: "payin-42".into(),
                buyer_channel_state: Some(SignedChannelState {
                    channel: Some(state.clone()),
                    from_signature: vec![],
                    to_signature: vec![4; 64],
                }),
            }),
            escrow_signature: vec![7; 64],
        };
        let payload = UnsignedPayload::new(
            encode_binary(&result.encode_to_vec()),
            Opcode::PayRequest,
            0,
        );
        (payload, state)
    }

    #[test]
    fn test_raw_data_signature_verifies() {
        let signer = signer();
        let payload = UnsignedPayload::new("abc", Opcode::Data, 0);
        let sig = sign_raw_data(&signer, &payload).unwrap();
        assert!(verify_signature(&public(&signer), b"abc", &sig).unwrap());
    }

    #[test]
    fn test_balance_attestation_signs_public_key_structure() {
        let signer = signer();
        let attestation = build_balance_attestation(&signer).unwrap();
        let key = attestation.key.clone().unwrap();
        assert_eq!(key.key, public(&signer));
        assert!(verify_message(&key.key, &key, &attestation.signature).unwrap());
        // The signature is over the structure, not the bare key bytes.
        assert!(!verify_signature(&key.key, &key.key, &attestation.signature).unwrap());
    }

    #[test]
    fn test_balance_attestation_key_derivation_failure() {
        let err = build_balance_attestation(&FailingSigner::new()).unwrap_err();
        assert!(matches!(err, OffsignError::KeyDerivation(_)));
    }

    #[test]
    fn test_contract_batch_signed_in_order() {
        let signer = signer();
        let batch = ContractBatch::new(vec![
            ContractItem::new("host-1", "contract-1"),
            ContractItem::new("host-2", "contract-2"),
            ContractItem::new("host-3", "contract-3"),
        ]);

        let signed = sign_contract_batch(&signer, &batch).unwrap();
        assert_eq!(signed.len(), 3);
        for (original, signed) in batch.contracts.iter().zip(&signed.contracts) {
            assert_eq!(original.key, signed.key);
            let sig = decode_binary("contract", &signed.contract).unwrap();
            assert!(verify_signature(&public(&signer), original.contract.as_bytes(), &sig).unwrap());
        }
        // Input untouched.
        assert_eq!(batch.contracts[0].contract, "contract-1");
    }

    #[test]
    fn test_contract_batch_fails_fast() {
        let signer = FailingSigner::after(1);
        let batch = ContractBatch::new(vec![
            ContractItem::new("host-1", "a"),
            ContractItem::new("host-2", "b"),
            ContractItem::new("host-3", "c"),
        ]);
        let err = sign_contract_batch(&signer, &batch).unwrap_err();
        assert!(matches!(err, OffsignError::Signing(_)));
        assert_eq!(signer.calls(), 2, "signing must stop at the first failure");
    }

    #[test]
    fn test_empty_batch_rejected() {
        let err = sign_contract_batch(&signer(), &ContractBatch::default()).unwrap_err();
        assert!(matches!(err, OffsignError::InvalidData { .. }));
    }

    #[test]
    fn test_channel_commit_fields_and_signature() {
        let signer = signer();
        let recipient = vec![5u8; 32];
        let payload = UnsignedPayload::new(encode_binary(&recipient), Opcode::PayChannel, 0);

        let signed = build_channel_commit(&signer, public(&signer), &payload, 1_234, 77).unwrap();
        let channel = signed.channel.clone().unwrap();
        assert_eq!(channel.amount, 1_234);
        assert_eq!(channel.payer_id, 77);
        assert_eq!(channel.payer.as_ref().unwrap().key, public(&signer));
        assert_eq!(channel.recipient.as_ref().unwrap().key, recipient);
        assert!(verify_message(&public(&signer), &channel, &signed.signature).unwrap());

        let decoded =
            SignedChannelCommit::decode(SignedArtifact::ChannelCommit(signed.clone()).to_bytes().unwrap().as_slice())
                .unwrap();
        assert_eq!(decoded, signed);
    }

    #[test]
    fn test_channel_commit_rejects_bad_recipient() {
        let signer = signer();
        let payload = UnsignedPayload::new("not base64!!", Opcode::PayChannel, 0);
        let err = build_channel_commit(&signer, public(&signer), &payload, 10, 1).unwrap_err();
        assert!(matches!(err, OffsignError::Decoding(_)));
    }

    #[test]
    fn test_channel_commit_signing_failure() {
        let payload = UnsignedPayload::new(encode_binary(&[1; 32]), Opcode::PayChannel, 0);
        let err = build_channel_commit(&FailingSigner::new(), vec![0; 32], &payload, 10, 1).unwrap_err();
        assert!(matches!(err, OffsignError::Signing(_)));
    }

    #[test]
    fn test_payin_request_carries_two_signatures() {
        let signer = signer();
        let (payload, state) = submit_result_payload();
        let buyer = public(&signer);

        let signed = build_payin_request(&signer, buyer.clone(), &payload).unwrap();
        let request = signed.request.clone().unwrap();
        assert_eq!(request.payin_id, "payin-42");
        assert_eq!(request.buyer_address, buyer);

        let channel_state = request.buyer_channel_state.clone().unwrap();
        assert_eq!(channel_state.channel.as_ref(), Some(&state));
        assert_eq!(channel_state.to_signature, vec![4; 64]);
        let envelope = unsigned_envelope(&channel_state);
        assert!(verify_message(&buyer, &envelope, &channel_state.from_signature).unwrap());
        // The bare channel is not what the buyer signs.
        assert!(!verify_message(&buyer, &state, &channel_state.from_signature).unwrap());
        assert!(verify_message(&buyer, &request, &signed.buyer_signature).unwrap());
    }

    #[test]
    fn test_payin_overwrites_stale_from_signature() {
        let signer = signer();
        let (payload, _) = submit_result_payload();
        let mut submitted =
            SignedSubmitContractResult::decode(decode_binary("p", &payload.unsigned).unwrap().as_slice())
                .unwrap();
        let received = submitted
            .result
            .as_mut()
            .unwrap()
            .buyer_channel_state
            .as_mut()
            .unwrap();
        received.from_signature = vec![1; 64];
        let expected_envelope = unsigned_envelope(received);
        let payload = UnsignedPayload::new(
            encode_binary(&submitted.encode_to_vec()),
            Opcode::PayRequest,
            0,
        );

        let signed = build_payin_request(&signer, public(&signer), &payload).unwrap();
        let channel_state = signed.request.unwrap().buyer_channel_state.unwrap();
        assert!(verify_message(&public(&signer), &expected_envelope, &channel_state.from_signature).unwrap());
    }

    #[test]
    fn test_payin_flipped_signatures_fail_verification() {
        let signer = signer();
        let (payload, _) = submit_result_payload();
        let buyer = public(&signer);
        let signed = build_payin_request(&signer, buyer.clone(), &payload).unwrap();
        let request = signed.request.clone().unwrap();

        let channel_state = request.buyer_channel_state.clone().unwrap();
        let envelope = unsigned_envelope(&channel_state);
        let mut state_sig = channel_state.from_signature.clone();
        state_sig[0] ^= 0x01;
        assert!(!verify_message(&buyer, &envelope, &state_sig).unwrap());

        let mut request_sig = signed.buyer_signature.clone();
        request_sig[10] ^= 0x80;
        assert!(!verify_message(&buyer, &request, &request_sig).unwrap());
    }

    #[test]
    fn test_payin_malformed_payload_is_decoding_error() {
        let signer = signer();
        let cases = [
            UnsignedPayload::new("%%%", Opcode::PayRequest, 0),
            UnsignedPayload::new(encode_binary(&[0xff, 0xff, 0xff]), Opcode::PayRequest, 0),
            UnsignedPayload::new(
                encode_binary(&SignedSubmitContractResult::default().encode_to_vec()),
                Opcode::PayRequest,
                0,
            ),
        ];
        for payload in cases {
            let err = build_payin_request(&signer, vec![0; 32], &payload).unwrap_err();
            assert!(matches!(err, OffsignError::Decoding(_)), "got {:?}", err);
        }
    }

    #[test]
    fn test_payin_missing_channel_state_is_decoding_error() {
        let result = SignedSubmitContractResult {
            result: Some(SubmitContractResult {
                payin_id: "p".into(),
                buyer_channel_state: None,
            }),
            escrow_signature: vec![],
        };
        let payload = UnsignedPayload::new(encode_binary(&result.encode_to_vec()), Opcode::PayRequest, 0);
        let err = build_payin_request(&signer(), vec![0; 32], &payload).unwrap_err();
        assert!(matches!(err, OffsignError::Decoding(_)));
    }

    #[test]
    fn test_artifact_param_is_base64_of_wire_bytes() {
        let artifact = SignedArtifact::Data(vec![1, 2, 3]);
        assert_eq!(artifact.opcode(), Opcode::Data);
        assert_eq!(artifact.to_param().unwrap(), "AQID");
    }
}
