//! DID document types.
//!
//! A [`DidDocument`] is generated on demand from an agent's DID and public
//! key; it is never persisted by this core (the HTTP resolution endpoint
//! consumes it directly).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verification method type used for agent Ed25519 keys.
pub const ED25519_VERIFICATION_2018: &str = "Ed25519VerificationKey2018";

/// JSON-LD context of generated DID documents.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// A minimal W3C-style DID document with one authentication entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DidDocument {
    /// JSON-LD context (`@context`).
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// The DID this document describes.
    pub id: String,
    /// When the document was generated, UTC.
    pub created: DateTime<Utc>,
    /// Authentication entries — exactly one for agent identities.
    pub authentication: Vec<VerificationMethod>,
}

/// A single verification method within a [`DidDocument`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationMethod {
    /// Method id, conventionally `<did>#keys-1`.
    pub id: String,
    /// Verification method type (see [`ED25519_VERIFICATION_2018`]).
    #[serde(rename = "type")]
    pub method_type: String,
    /// The DID that controls this key.
    pub controller: String,
    /// Base58-encoded Ed25519 public key.
    #[serde(rename = "publicKeyBase58")]
    pub public_key_base58: String,
}
