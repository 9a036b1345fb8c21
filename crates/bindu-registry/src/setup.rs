//! Identity bootstrap for agent startup.
//!
//! [`prepare_identity`] readies the on-disk key material before client
//! registration runs: restore keys from the secret backend when the local
//! copies are missing, generate a keypair when nothing can be restored, and
//! back the (possibly fresh) keys up again. Unlike registration, a failure
//! here is fatal — an agent without key material has no identity to register.

use bindu_identity::{AgentIdentity, KeyStore};
use tracing::{info, warn};

use crate::config::IdentityConfig;
use crate::error::RegistryError;
use crate::secrets::SecretBackend;

/// Prepare the agent's key material and return its identity handle.
///
/// When `secrets` is present and the key files are missing locally (and
/// `recreate_keys` is off), a restore from the backend is attempted first —
/// best-effort, like every secret-backend operation: a failed restore is
/// logged and fresh keys are generated instead. Key generation is
/// idempotent: existing keys are kept unless `config.recreate_keys` forces
/// regeneration. When a backend is present the final key state is backed up
/// best-effort.
pub async fn prepare_identity(
    config: &IdentityConfig,
    secrets: Option<&dyn SecretBackend>,
    agent_id: &str,
    author: Option<&str>,
    agent_name: Option<&str>,
) -> Result<AgentIdentity, RegistryError> {
    let pki_dir = config.pki_dir();
    let keystore = KeyStore::new(pki_dir.clone(), config.key_passphrase.clone());

    if let Some(secrets) = secrets {
        if !config.recreate_keys && !keystore.keys_exist() {
            info!(agent_id = %agent_id, "no local keys, attempting restore from secret backend");
            // A backend outage must not block startup; fall through to
            // generating a fresh keypair.
            match secrets.restore_keys(agent_id, &pki_dir).await {
                Ok(Some(did)) => info!(did = %did, "key material restored from secret backend"),
                Ok(None) => info!("no backed-up keys found, generating a new keypair"),
                Err(e) => {
                    warn!(agent_id = %agent_id, error = %e, "key restore failed, generating a new keypair");
                }
            }
        }
    }

    let identity = AgentIdentity::new(
        keystore,
        author.map(str::to_string),
        agent_name.map(str::to_string),
        Some(agent_id.to_string()),
    );
    identity.generate_and_save(config.recreate_keys)?;
    let did = identity.did()?;

    if let Some(secrets) = secrets {
        if secrets.backup_keys(agent_id, &pki_dir, &did).await {
            info!(agent_id = %agent_id, "key material backed up to secret backend");
        } else {
            warn!(agent_id = %agent_id, "failed to back up key material to secret backend");
        }
    }

    info!(did = %did, "agent identity ready");
    Ok(identity)
}
