//! Deterministic DID derivation and DID document construction.
//!
//! Both functions here are pure: no randomness, no I/O. Equal inputs always
//! produce the identical DID string — the rest of the system relies on this
//! as the stable identity key (it is the OAuth `client_id`).

use bindu_models::{DidDocument, VerificationMethod, DID_CONTEXT, ED25519_VERIFICATION_2018};
use chrono::Utc;
use ed25519_dalek::VerifyingKey;

/// Multicodec prefix for an Ed25519 public key (`ed25519-pub`, varint 0xed).
const MULTICODEC_ED25519_PUB: [u8; 2] = [0xed, 0x01];

/// Derive the agent's DID.
///
/// With author, agent name and agent id all present the DID is a pure
/// function of that metadata:
///
/// ```text
/// did:bindu:<sanitised author>:<sanitised agent name>:<agent id>
/// ```
///
/// Otherwise it falls back to a `did:key` derived from the public key
/// (multibase base58btc of the multicodec-prefixed key bytes).
pub fn derive_did(
    author: Option<&str>,
    agent_name: Option<&str>,
    agent_id: Option<&str>,
    public_key: &VerifyingKey,
) -> String {
    match (author, agent_name, agent_id) {
        (Some(author), Some(name), Some(id)) => bindu_did(author, name, id),
        _ => {
            let mut prefixed = Vec::with_capacity(2 + 32);
            prefixed.extend_from_slice(&MULTICODEC_ED25519_PUB);
            prefixed.extend_from_slice(public_key.as_bytes());
            format!("did:key:z{}", bs58::encode(prefixed).into_string())
        }
    }
}

/// The metadata form of the DID, usable without any key material.
pub fn bindu_did(author: &str, agent_name: &str, agent_id: &str) -> String {
    format!(
        "did:bindu:{}:{}:{}",
        sanitize(author),
        sanitize(agent_name),
        agent_id
    )
}

/// Sanitise a DID namespace segment.
///
/// Lowercases and maps `@` to `_at_`, `.` and spaces to `_`, so that an
/// author email like `alice@example.com` becomes `alice_at_example_com`.
pub fn sanitize(part: &str) -> String {
    part.to_lowercase()
        .replace('@', "_at_")
        .replace(['.', ' '], "_")
}

/// Base58 encoding of the raw public key bytes (no multicodec prefix),
/// as carried in DID documents and OAuth client metadata.
pub fn public_key_base58(public_key: &VerifyingKey) -> String {
    bs58::encode(public_key.as_bytes()).into_string()
}

/// Build a DID document with a single Ed25519 authentication entry.
///
/// `created` is the current UTC time; everything else is a pure function of
/// the DID and key.
pub fn build_document(did: &str, public_key: &VerifyingKey) -> DidDocument {
    DidDocument {
        context: vec![DID_CONTEXT.to_string()],
        id: did.to_string(),
        created: Utc::now(),
        authentication: vec![VerificationMethod {
            id: format!("{did}#keys-1"),
            method_type: ED25519_VERIFICATION_2018.to_string(),
            controller: did.to_string(),
            public_key_base58: public_key_base58(public_key),
        }],
    }
}
