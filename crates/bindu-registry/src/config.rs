//! Registration configuration.
//!
//! All configuration is read once at startup by the `from_env` constructors
//! and injected explicitly into the components that need it. Nothing in this
//! crate consults global state after construction, which keeps the
//! reconciler independently testable with hand-built configs.

use std::path::PathBuf;

use bindu_models::GrantType;

/// Configuration of the OAuth admin API and the registration policy.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Whether agents register themselves as OAuth clients on startup.
    pub auto_register: bool,
    /// Base URL of the authorization server's admin API.
    pub admin_url: String,
    /// Base URL of the authorization server's public endpoints.
    pub public_url: String,
    /// Per-request timeout, seconds.
    pub timeout_secs: u64,
    /// Whether to verify the admin API's TLS certificate.
    pub verify_tls: bool,
    /// Bounded retry count for transient transport failures.
    pub max_retries: u32,
    /// Grant types requested for newly created clients.
    pub default_grant_types: Vec<GrantType>,
    /// Scopes granted to newly created clients.
    pub default_scopes: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            auto_register: true,
            admin_url: "http://localhost:4445".to_string(),
            public_url: "http://localhost:4444".to_string(),
            timeout_secs: 30,
            verify_tls: true,
            max_retries: 3,
            default_grant_types: vec![GrantType::ClientCredentials],
            default_scopes: vec!["agent:read".to_string(), "agent:write".to_string()],
        }
    }
}

impl RegistryConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `BINDU_AUTO_REGISTER` | `true` | register agents on startup |
    /// | `BINDU_OAUTH_ADMIN_URL` | `http://localhost:4445` | admin API base URL |
    /// | `BINDU_OAUTH_PUBLIC_URL` | `http://localhost:4444` | public API base URL |
    /// | `BINDU_OAUTH_TIMEOUT_SECS` | `30` | per-request timeout |
    /// | `BINDU_OAUTH_VERIFY_TLS` | `true` | TLS certificate verification |
    /// | `BINDU_OAUTH_MAX_RETRIES` | `3` | transport retry budget |
    /// | `BINDU_OAUTH_GRANT_TYPES` | `client_credentials` | comma-separated grant types |
    /// | `BINDU_OAUTH_SCOPES` | `agent:read,agent:write` | comma-separated scopes |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            auto_register: env_bool("BINDU_AUTO_REGISTER", defaults.auto_register),
            admin_url: env_or("BINDU_OAUTH_ADMIN_URL", &defaults.admin_url),
            public_url: env_or("BINDU_OAUTH_PUBLIC_URL", &defaults.public_url),
            timeout_secs: env_parsed("BINDU_OAUTH_TIMEOUT_SECS", defaults.timeout_secs),
            verify_tls: env_bool("BINDU_OAUTH_VERIFY_TLS", defaults.verify_tls),
            max_retries: env_parsed("BINDU_OAUTH_MAX_RETRIES", defaults.max_retries),
            default_grant_types: env_list("BINDU_OAUTH_GRANT_TYPES")
                .unwrap_or(defaults.default_grant_types),
            default_scopes: std::env::var("BINDU_OAUTH_SCOPES")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.default_scopes),
        }
    }
}

/// Configuration of the optional Vault secret backend.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Whether Vault backup/restore is enabled at all.
    pub enabled: bool,
    /// Vault server address.
    pub addr: String,
    /// Vault token presented as `X-Vault-Token`.
    pub token: String,
    /// KV v2 mount point.
    pub mount: String,
}

impl VaultConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `BINDU_VAULT_ENABLED` | `false` | enable the secret backend |
    /// | `VAULT_ADDR` | `http://localhost:8200` | Vault server address |
    /// | `VAULT_TOKEN` | *(empty)* | Vault token |
    /// | `BINDU_VAULT_MOUNT` | `secret` | KV v2 mount point |
    pub fn from_env() -> Self {
        Self {
            enabled: env_bool("BINDU_VAULT_ENABLED", false),
            addr: env_or("VAULT_ADDR", "http://localhost:8200"),
            token: env_or("VAULT_TOKEN", ""),
            mount: env_or("BINDU_VAULT_MOUNT", "secret"),
        }
    }
}

/// Configuration of the agent's key material and state directory.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Directory holding the credentials file and the `pki` subdirectory.
    pub state_dir: PathBuf,
    /// Optional passphrase encrypting the private key at rest.
    pub key_passphrase: Option<String>,
    /// Force regeneration of existing keys (destroys the old identity).
    pub recreate_keys: bool,
}

impl IdentityConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `BINDU_STATE_DIR` | `~/.bindu` | agent state directory |
    /// | `BINDU_KEY_PASSPHRASE` | *(unset)* | private-key encryption passphrase |
    /// | `BINDU_RECREATE_KEYS` | `false` | regenerate keys on startup |
    pub fn from_env() -> Self {
        let state_dir = std::env::var("BINDU_STATE_DIR").map_or_else(
            |_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".bindu")
            },
            PathBuf::from,
        );
        Self {
            state_dir,
            key_passphrase: std::env::var("BINDU_KEY_PASSPHRASE").ok(),
            recreate_keys: env_bool("BINDU_RECREATE_KEYS", false),
        }
    }

    /// The PKI subdirectory holding the two key files.
    pub fn pki_dir(&self) -> PathBuf {
        self.state_dir.join("pki")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |v| matches!(v.as_str(), "1" | "true" | "yes"))
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Option<Vec<GrantType>> {
    let raw = std::env::var(key).ok()?;
    let parsed: Vec<GrantType> = raw
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    (!parsed.is_empty()).then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_defaults_point_at_hydra_ports() {
        let cfg = RegistryConfig::default();
        assert!(cfg.auto_register);
        assert_eq!(cfg.admin_url, "http://localhost:4445");
        assert_eq!(cfg.public_url, "http://localhost:4444");
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.default_grant_types, vec![GrantType::ClientCredentials]);
    }

    #[test]
    fn vault_disabled_by_default() {
        let cfg = VaultConfig::from_env();
        assert_eq!(cfg.mount, "secret");
        // VAULT_ADDR may be set on developer machines; only assert the shape.
        assert!(cfg.addr.starts_with("http"));
    }

    #[test]
    fn identity_config_pki_dir_is_nested() {
        let cfg = IdentityConfig {
            state_dir: PathBuf::from("/tmp/agent"),
            key_passphrase: None,
            recreate_keys: false,
        };
        assert_eq!(cfg.pki_dir(), PathBuf::from("/tmp/agent/pki"));
    }
}
