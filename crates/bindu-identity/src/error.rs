//! Error types for the `bindu-identity` crate.
//!
//! [`IdentityError`] is the single error type returned by every fallible
//! key operation. Identity-key failures are startup-fatal for the agent,
//! unlike OAuth registration failures which degrade gracefully upstream.

use std::path::PathBuf;

/// Errors raised while generating, loading or using identity keys.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// A requested key file does not exist on disk.
    #[error("key file not found: {path}")]
    KeyNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The private key could not be decrypted (missing or wrong passphrase).
    #[error("key decryption failed: {0}")]
    KeyDecryption(String),

    /// PKCS#8 / SPKI encoding or decoding failure.
    #[error("key encoding error: {0}")]
    KeyEncoding(String),

    /// Filesystem failure while reading or writing key material.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<pkcs8::Error> for IdentityError {
    fn from(e: pkcs8::Error) -> Self {
        IdentityError::KeyEncoding(e.to_string())
    }
}

impl From<pkcs8::spki::Error> for IdentityError {
    fn from(e: pkcs8::spki::Error) -> Self {
        IdentityError::KeyEncoding(e.to_string())
    }
}
