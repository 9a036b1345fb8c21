//! Local credentials cache file.
//!
//! One JSON file per agent state directory, mapping DID → serialised
//! [`AgentCredentials`]. The DID is the key (never the ephemeral agent id),
//! which is what makes lookups reload-safe. A corrupt file is treated as
//! empty — it is rebuilt on the next save rather than failing registration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use bindu_models::AgentCredentials;
use tracing::{info, warn};

use crate::error::RegistryError;

/// File name of the credentials cache inside the state directory.
pub const CREDENTIALS_FILE: &str = "oauth_credentials.json";

/// DID-keyed credentials file in the agent's state directory.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Create a store rooted at the agent's state directory (typically
    /// `~/.bindu`). The directory is created on first save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the credentials file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Persist `credentials` under their `client_id` (the DID).
    ///
    /// Read-modify-write: existing entries for other DIDs are preserved; a
    /// parse failure of the existing file is logged and treated as an empty
    /// map. The new content is written to a temp file and renamed into
    /// place, then restricted to owner read/write.
    pub fn save(&self, credentials: &AgentCredentials) -> Result<PathBuf, RegistryError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path();

        let mut all = self.read_map(&path);
        all.insert(credentials.client_id.clone(), credentials.clone());

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&all)?)?;
        set_owner_only(&tmp)?;
        fs::rename(&tmp, &path)?;

        info!(path = %path.display(), did = %credentials.client_id, "credentials saved");
        Ok(path)
    }

    /// Look up credentials by DID.
    ///
    /// Absence — of the file, or of the DID within it — is a normal state
    /// (first run), not an error. A corrupt file is logged and reported as
    /// absent; the next save overwrites it.
    pub fn load(&self, did: &str) -> Option<AgentCredentials> {
        let path = self.path();
        if !path.exists() {
            return None;
        }
        self.read_map(&path).remove(did)
    }

    fn read_map(&self, path: &Path) -> HashMap<String, AgentCredentials> {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "credentials file unreadable, treating as empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn creds(did: &str) -> AgentCredentials {
        AgentCredentials::new(Uuid::new_v4(), did, "s3cret".into(), vec!["agent:read".into()])
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let saved = creds("did:key:z1");

        store.save(&saved).unwrap();
        assert_eq!(store.load("did:key:z1"), Some(saved));
    }

    #[test]
    fn load_missing_is_none_not_error() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        assert!(store.load("did:key:zMissing").is_none());
    }

    #[test]
    fn lookup_is_keyed_by_did_not_agent_id() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        let saved = creds("did:bindu:alice:travel:1");
        store.save(&saved).unwrap();

        // Simulate a reload: a brand new agent_id, same DID.
        let reloaded = store.load("did:bindu:alice:travel:1").unwrap();
        assert_eq!(reloaded.client_secret, saved.client_secret);
        assert_eq!(reloaded.agent_id, saved.agent_id);
    }

    #[test]
    fn save_preserves_other_dids() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        let a = creds("did:key:zA");
        let b = creds("did:key:zB");
        store.save(&a).unwrap();
        store.save(&b).unwrap();

        assert_eq!(store.load("did:key:zA"), Some(a));
        assert_eq!(store.load("did:key:zB"), Some(b));
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_self_heals() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.load("did:key:z1").is_none());

        let saved = creds("did:key:z1");
        store.save(&saved).unwrap();
        assert_eq!(store.load("did:key:z1"), Some(saved));
    }

    #[cfg(unix)]
    #[test]
    fn credentials_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save(&creds("did:key:z1")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
