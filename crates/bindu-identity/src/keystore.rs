//! On-disk Ed25519 key store.
//!
//! A [`KeyStore`] owns one directory containing the agent's keypair as two
//! PEM files. The private key is written as PKCS#8 — encrypted with PBES2
//! when a passphrase is configured, plaintext otherwise — with owner-only
//! permissions. Keys are loaded lazily from disk on every access; nothing is
//! cached in memory across calls.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use pkcs8::spki::{DecodePublicKey, EncodePublicKey};
use pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rand::rngs::OsRng;
use tracing::{debug, info};

use crate::error::IdentityError;

/// File name of the private key PEM inside the key directory.
pub const PRIVATE_KEY_FILE: &str = "private_key.pem";
/// File name of the public key PEM inside the key directory.
pub const PUBLIC_KEY_FILE: &str = "public_key.pem";

/// PEM type label marking an encrypted PKCS#8 envelope.
const ENCRYPTED_PEM_LABEL: &str = "ENCRYPTED PRIVATE KEY";

/// Paths of the two key files managed by a [`KeyStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    /// Private key PEM (mode 0600).
    pub private_key_path: PathBuf,
    /// Public key PEM (mode 0644).
    pub public_key_path: PathBuf,
}

/// Generates, persists and loads one agent's Ed25519 keypair.
///
/// The store holds only the key directory and the optional passphrase; key
/// material itself lives exclusively in the two PEM files and is re-read on
/// every [`private_key`](Self::private_key) / [`public_key`](Self::public_key)
/// call.
#[derive(Debug, Clone)]
pub struct KeyStore {
    key_dir: PathBuf,
    passphrase: Option<String>,
}

impl KeyStore {
    /// Create a store rooted at `key_dir` (typically the agent's `pki`
    /// subdirectory). A passphrase, when given, encrypts the private key
    /// at rest and is required again to load it.
    pub fn new(key_dir: impl AsRef<Path>, passphrase: Option<String>) -> Self {
        Self {
            key_dir: key_dir.as_ref().to_path_buf(),
            passphrase,
        }
    }

    /// Path of the private key file.
    pub fn private_key_path(&self) -> PathBuf {
        self.key_dir.join(PRIVATE_KEY_FILE)
    }

    /// Path of the public key file.
    pub fn public_key_path(&self) -> PathBuf {
        self.key_dir.join(PUBLIC_KEY_FILE)
    }

    /// Whether both key files already exist on disk.
    pub fn keys_exist(&self) -> bool {
        self.private_key_path().exists() && self.public_key_path().exists()
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    /// Generate and persist a fresh keypair.
    ///
    /// When both files already exist and `recreate` is `false` this is an
    /// idempotent no-op that returns the existing paths without touching
    /// disk. With `recreate = true` a new keypair always replaces the old
    /// one — the previous identity is unrecoverable afterwards.
    pub fn generate_and_save(&self, recreate: bool) -> Result<KeyPaths, IdentityError> {
        let paths = KeyPaths {
            private_key_path: self.private_key_path(),
            public_key_path: self.public_key_path(),
        };

        if self.keys_exist() && !recreate {
            debug!(dir = %self.key_dir.display(), "key files present, skipping generation");
            return Ok(paths);
        }

        fs::create_dir_all(&self.key_dir)?;

        let signing_key = SigningKey::generate(&mut OsRng);

        let private_pem = match &self.passphrase {
            Some(pass) => {
                signing_key.to_pkcs8_encrypted_pem(&mut OsRng, pass.as_bytes(), LineEnding::LF)?
            }
            None => signing_key.to_pkcs8_pem(LineEnding::LF)?,
        };
        fs::write(&paths.private_key_path, private_pem.as_bytes())?;
        set_mode(&paths.private_key_path, 0o600)?;

        let public_pem = signing_key.verifying_key().to_public_key_pem(LineEnding::LF)?;
        fs::write(&paths.public_key_path, public_pem.as_bytes())?;
        set_mode(&paths.public_key_path, 0o644)?;

        info!(
            dir = %self.key_dir.display(),
            encrypted = self.passphrase.is_some(),
            "generated Ed25519 keypair"
        );
        Ok(paths)
    }

    // ------------------------------------------------------------------
    // Lazy accessors
    // ------------------------------------------------------------------

    /// Load the private key from disk.
    ///
    /// Fails with [`IdentityError::KeyNotFound`] when the file is absent and
    /// with [`IdentityError::KeyDecryption`] when the key is encrypted but no
    /// passphrase was configured, or the passphrase does not match.
    pub fn private_key(&self) -> Result<SigningKey, IdentityError> {
        let path = self.private_key_path();
        let pem = read_pem(&path)?;

        if pem.contains(ENCRYPTED_PEM_LABEL) {
            let Some(pass) = &self.passphrase else {
                return Err(IdentityError::KeyDecryption(
                    "private key is encrypted but no passphrase was supplied".into(),
                ));
            };
            return SigningKey::from_pkcs8_encrypted_pem(&pem, pass.as_bytes()).map_err(|e| {
                IdentityError::KeyDecryption(format!(
                    "failed to decrypt private key (wrong passphrase?): {e}"
                ))
            });
        }

        SigningKey::from_pkcs8_pem(&pem).map_err(|e| IdentityError::KeyEncoding(e.to_string()))
    }

    /// Load the public key from disk.
    pub fn public_key(&self) -> Result<VerifyingKey, IdentityError> {
        let pem = read_pem(&self.public_key_path())?;
        Ok(VerifyingKey::from_public_key_pem(&pem)?)
    }

    // ------------------------------------------------------------------
    // Signing
    // ------------------------------------------------------------------

    /// Sign the UTF-8 bytes of `text`; returns a base64-encoded signature.
    pub fn sign(&self, text: &str) -> Result<String, IdentityError> {
        let signature = self.private_key()?.sign(text.as_bytes());
        Ok(BASE64.encode(signature.to_bytes()))
    }

    /// Verify a base64-encoded signature over `text`.
    ///
    /// Never fails: a missing key, malformed encoding or mismatched
    /// signature all yield `false`.
    pub fn verify(&self, text: &str, signature: &str) -> bool {
        let Ok(public_key) = self.public_key() else {
            return false;
        };
        let Ok(bytes) = BASE64.decode(signature) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&bytes) else {
            return false;
        };
        public_key.verify(text.as_bytes(), &signature).is_ok()
    }
}

fn read_pem(path: &Path) -> Result<String, IdentityError> {
    if !path.exists() {
        return Err(IdentityError::KeyNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
