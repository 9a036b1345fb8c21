//! # Bindu Registry
//!
//! OAuth client registration and reconciliation for bindu agents.
//!
//! On startup an agent derives its DID (see `bindu-identity`) and asks the
//! [`ClientReconciler`] for valid OAuth client credentials. The reconciler
//! consults three independent, not-always-consistent stores in priority
//! order — the optional [`SecretBackend`], the remote admin API behind
//! [`OAuthAdmin`], and the local [`CredentialStore`] — and converges them,
//! creating or repairing the client registration as needed.
//!
//! Tie-break rules: the secret backend wins for the secret *value*, the
//! remote server wins for *existence*, the local file is a convenience cache.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`RegistryConfig`] / [`VaultConfig`] / [`IdentityConfig`] built from env vars |
//! | [`store`] | DID-keyed local credentials file |
//! | [`admin`] | [`OAuthAdmin`] trait and the reqwest-backed [`HydraAdminClient`] |
//! | [`secrets`] | [`SecretBackend`] trait and the Vault KV v2 backend |
//! | [`reconciler`] | the reconciliation algorithm |
//! | [`setup`] | startup identity flow (restore keys, generate, back up) |

pub mod admin;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod secrets;
pub mod setup;
pub mod store;

pub use admin::{HydraAdminClient, OAuthAdmin};
pub use config::{IdentityConfig, RegistryConfig, VaultConfig};
pub use error::RegistryError;
pub use reconciler::{ClientReconciler, RegistrationRequest};
pub use secrets::{SecretBackend, VaultBackend};
pub use setup::prepare_identity;
pub use store::CredentialStore;
