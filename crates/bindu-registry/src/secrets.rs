//! Optional durable secret backend.
//!
//! A [`SecretBackend`] survives machine rebuilds: it backs up OAuth
//! credentials and DID key material so a redeployed agent can restore its
//! identity instead of minting a new one. Writes are best-effort — a backend
//! outage must never fail registration, only log a warning.
//!
//! [`VaultBackend`] implements the trait against HashiCorp Vault's KV v2
//! HTTP API.

use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bindu_identity::{PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
use bindu_models::AgentCredentials;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::VaultConfig;
use crate::error::RegistryError;

/// Durable key/value store used for disaster recovery of agent identities.
///
/// Read operations surface transport errors (the reconciler's outer boundary
/// handles them); write operations return a success flag and never error —
/// callers log the `false` case and move on.
#[async_trait]
pub trait SecretBackend: Send + Sync {
    /// Fetch backed-up credentials by DID.
    async fn get_credentials(&self, did: &str)
        -> Result<Option<AgentCredentials>, RegistryError>;

    /// Back up credentials, keyed by their DID. Best-effort.
    async fn store_credentials(&self, credentials: &AgentCredentials) -> bool;

    /// Restore key files into `dest_dir`; returns the backed-up DID when a
    /// backup exists.
    async fn restore_keys(
        &self,
        agent_id: &str,
        dest_dir: &Path,
    ) -> Result<Option<String>, RegistryError>;

    /// Back up the key files under `key_dir` together with the DID.
    /// Best-effort.
    async fn backup_keys(&self, agent_id: &str, key_dir: &Path, did: &str) -> bool;

    /// Release the backend. Safe to call more than once.
    async fn close(&self);
}

/// Payload stored for a key backup.
#[derive(Serialize, Deserialize, Debug)]
struct KeyBackup {
    private_key_pem: String,
    public_key_pem: String,
    did: String,
}

/// HashiCorp Vault KV v2 backend.
#[derive(Debug, Clone)]
pub struct VaultBackend {
    http: reqwest::Client,
    addr: String,
    token: String,
    mount: String,
}

const VAULT_TIMEOUT: Duration = Duration::from_secs(10);

impl VaultBackend {
    /// Build a backend from the Vault configuration.
    pub fn new(config: &VaultConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder().timeout(VAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            addr: config.addr.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            mount: config.mount.clone(),
        })
    }

    fn credentials_url(&self, did: &str) -> String {
        format!("{}/v1/{}/data/bindu/oauth-clients/{did}", self.addr, self.mount)
    }

    fn keys_url(&self, agent_id: &str) -> String {
        format!("{}/v1/{}/data/bindu/did-keys/{agent_id}", self.addr, self.mount)
    }

    /// Read the inner `data.data` object of a KV v2 secret; `None` on 404.
    async fn read_secret(&self, url: &str) -> Result<Option<serde_json::Value>, RegistryError> {
        let response = self
            .http
            .get(url)
            .header("X-Vault-Token", &self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: serde_json::Value = response.json().await?;
                Ok(Some(body["data"]["data"].clone()))
            }
            status => Err(RegistryError::SecretBackend(format!(
                "vault read failed with status {status}"
            ))),
        }
    }

    /// Write a KV v2 secret; logs and returns `false` on any failure.
    async fn write_secret(&self, url: &str, data: serde_json::Value) -> bool {
        let result = self
            .http
            .post(url)
            .header("X-Vault-Token", &self.token)
            .json(&json!({ "data": data }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(url, status = %response.status(), "vault write rejected");
                false
            }
            Err(e) => {
                warn!(url, error = %e, "vault write failed");
                false
            }
        }
    }
}

#[async_trait]
impl SecretBackend for VaultBackend {
    async fn get_credentials(
        &self,
        did: &str,
    ) -> Result<Option<AgentCredentials>, RegistryError> {
        let Some(data) = self.read_secret(&self.credentials_url(did)).await? else {
            debug!(did, "no credentials in vault");
            return Ok(None);
        };
        let credentials: AgentCredentials = serde_json::from_value(data)?;
        info!(did, "credentials found in vault");
        Ok(Some(credentials))
    }

    async fn store_credentials(&self, credentials: &AgentCredentials) -> bool {
        let data = match serde_json::to_value(credentials) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "credentials not serialisable for vault backup");
                return false;
            }
        };
        self.write_secret(&self.credentials_url(&credentials.client_id), data)
            .await
    }

    async fn restore_keys(
        &self,
        agent_id: &str,
        dest_dir: &Path,
    ) -> Result<Option<String>, RegistryError> {
        let Some(data) = self.read_secret(&self.keys_url(agent_id)).await? else {
            return Ok(None);
        };
        let backup: KeyBackup = serde_json::from_value(data)?;

        fs::create_dir_all(dest_dir)?;
        let private_path = dest_dir.join(PRIVATE_KEY_FILE);
        let public_path = dest_dir.join(PUBLIC_KEY_FILE);
        fs::write(&private_path, backup.private_key_pem.as_bytes())?;
        set_mode(&private_path, 0o600)?;
        fs::write(&public_path, backup.public_key_pem.as_bytes())?;
        set_mode(&public_path, 0o644)?;

        info!(agent_id, did = %backup.did, "restored DID keys from vault");
        Ok(Some(backup.did))
    }

    async fn backup_keys(&self, agent_id: &str, key_dir: &Path, did: &str) -> bool {
        let read = |name: &str| fs::read_to_string(key_dir.join(name));
        let (private_pem, public_pem) = match (read(PRIVATE_KEY_FILE), read(PUBLIC_KEY_FILE)) {
            (Ok(private_pem), Ok(public_pem)) => (private_pem, public_pem),
            (Err(e), _) | (_, Err(e)) => {
                warn!(agent_id, error = %e, "key files unreadable, skipping vault backup");
                return false;
            }
        };

        let backup = KeyBackup {
            private_key_pem: private_pem,
            public_key_pem: public_pem,
            did: did.to_string(),
        };
        let data = match serde_json::to_value(&backup) {
            Ok(v) => v,
            Err(e) => {
                warn!(agent_id, error = %e, "key backup not serialisable");
                return false;
            }
        };
        self.write_secret(&self.keys_url(agent_id), data).await
    }

    async fn close(&self) {
        // reqwest clients release their pools on drop; nothing to tear down,
        // and repeated calls are harmless.
    }
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
