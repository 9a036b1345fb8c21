//! # Bindu Identity
//!
//! Ed25519 key lifecycle and DID derivation for bindu agents.
//!
//! An agent identity is two PEM files on disk (private key, optionally
//! passphrase-encrypted; public key) plus a deterministic DID derived from
//! agent metadata or, failing that, from the public key itself.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`keystore`] | [`KeyStore`] — generate, persist, load, sign, verify |
//! | [`did`] | pure DID derivation and [`DidDocument`](bindu_models::DidDocument) construction |
//! | [`agent`] | [`AgentIdentity`] — KeyStore + metadata handle used at startup |
//! | [`error`] | [`IdentityError`] |

pub mod agent;
pub mod did;
pub mod error;
pub mod keystore;

pub use agent::AgentIdentity;
pub use error::IdentityError;
pub use keystore::{KeyPaths, KeyStore, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
