//! Agent identity handle.
//!
//! [`AgentIdentity`] ties a [`KeyStore`] to the agent metadata the DID is
//! derived from. It is the object the registration flow carries around: it
//! can mint the DID, expose the public key for client metadata, and sign
//! challenges on the agent's behalf.

use bindu_models::DidDocument;
use tracing::debug;

use crate::did;
use crate::error::IdentityError;
use crate::keystore::{KeyPaths, KeyStore};

/// One agent's identity: key material plus the metadata its DID derives from.
#[derive(Debug, Clone)]
pub struct AgentIdentity {
    keystore: KeyStore,
    author: Option<String>,
    agent_name: Option<String>,
    agent_id: Option<String>,
}

impl AgentIdentity {
    /// Create an identity handle over `keystore`.
    ///
    /// When `author`, `agent_name` and `agent_id` are all provided the DID is
    /// the human-readable `did:bindu` form; with any of them missing it falls
    /// back to a `did:key` derived from the public key.
    pub fn new(
        keystore: KeyStore,
        author: Option<String>,
        agent_name: Option<String>,
        agent_id: Option<String>,
    ) -> Self {
        Self {
            keystore,
            author,
            agent_name,
            agent_id,
        }
    }

    /// The underlying key store.
    pub fn keystore(&self) -> &KeyStore {
        &self.keystore
    }

    /// Generate the keypair if needed (see [`KeyStore::generate_and_save`]).
    pub fn generate_and_save(&self, recreate: bool) -> Result<KeyPaths, IdentityError> {
        self.keystore.generate_and_save(recreate)
    }

    /// The agent's DID.
    ///
    /// Reads the public key from disk only when the metadata is incomplete
    /// and the `did:key` fallback applies; the `did:bindu` form never touches
    /// the filesystem.
    pub fn did(&self) -> Result<String, IdentityError> {
        if let (Some(author), Some(name), Some(id)) =
            (&self.author, &self.agent_name, &self.agent_id)
        {
            return Ok(did::bindu_did(author, name, id));
        }

        let public_key = self.keystore.public_key()?;
        let derived = did::derive_did(None, None, None, &public_key);
        debug!(did = %derived, "derived fallback did:key identity");
        Ok(derived)
    }

    /// Base58-encoded public key for OAuth client metadata.
    pub fn public_key_base58(&self) -> Result<String, IdentityError> {
        Ok(did::public_key_base58(&self.keystore.public_key()?))
    }

    /// Build the DID document for this identity.
    pub fn document(&self) -> Result<DidDocument, IdentityError> {
        let public_key = self.keystore.public_key()?;
        Ok(did::build_document(&self.did()?, &public_key))
    }

    /// Sign `text` with the agent's private key (base64 signature).
    pub fn sign(&self, text: &str) -> Result<String, IdentityError> {
        self.keystore.sign(text)
    }

    /// Verify a base64 signature over `text`; never fails.
    pub fn verify(&self, text: &str, signature: &str) -> bool {
        self.keystore.verify(text, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn identity(dir: &std::path::Path, with_metadata: bool) -> AgentIdentity {
        let keystore = KeyStore::new(dir, None);
        if with_metadata {
            AgentIdentity::new(
                keystore,
                Some("alice@example.com".into()),
                Some("Travel Agent".into()),
                Some("550e8400-e29b-41d4-a716-446655440000".into()),
            )
        } else {
            AgentIdentity::new(keystore, None, None, None)
        }
    }

    #[test]
    fn did_is_stable_across_instances() {
        let dir = tempdir().unwrap();
        let first = identity(dir.path(), true);
        first.generate_and_save(false).unwrap();

        let second = identity(dir.path(), true);
        assert_eq!(first.did().unwrap(), second.did().unwrap());
    }

    #[test]
    fn fallback_identity_uses_did_key() {
        let dir = tempdir().unwrap();
        let agent = identity(dir.path(), false);
        agent.generate_and_save(false).unwrap();

        assert!(agent.did().unwrap().starts_with("did:key:"));
    }

    #[test]
    fn document_matches_did_and_key() {
        let dir = tempdir().unwrap();
        let agent = identity(dir.path(), true);
        agent.generate_and_save(false).unwrap();

        let doc = agent.document().unwrap();
        assert_eq!(doc.id, agent.did().unwrap());
        assert_eq!(
            doc.authentication[0].public_key_base58,
            agent.public_key_base58().unwrap()
        );
    }

    #[test]
    fn sign_verify_through_the_handle() {
        let dir = tempdir().unwrap();
        let agent = identity(dir.path(), true);
        agent.generate_and_save(false).unwrap();

        let sig = agent.sign("challenge").unwrap();
        assert!(agent.verify("challenge", &sig));
        assert!(!agent.verify("other", &sig));
    }
}
