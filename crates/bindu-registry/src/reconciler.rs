//! The client reconciliation algorithm.
//!
//! Given a stable DID, [`ClientReconciler::reconcile`] returns one
//! authoritative [`AgentCredentials`], consulting the three stores in
//! priority order and converging them:
//!
//! 1. secret backend (when configured) — authoritative for the secret value;
//! 2. remote admin API — authoritative for whether the client exists;
//! 3. local credentials file — a convenience cache.
//!
//! At most one client creation happens per invocation, and a remote client
//! that is discoverable through any source is never duplicated. The public
//! entry point is also the error boundary for the whole registration flow:
//! transport and backend failures are logged and degrade to `None`, because
//! an unreachable registration server must not crash agent startup.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bindu_identity::AgentIdentity;
use bindu_models::{
    AgentCredentials, ClientMetadata, OAuthClientRequest, ED25519_VERIFICATION_2018,
};
use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::admin::OAuthAdmin;
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::secrets::SecretBackend;
use crate::store::CredentialStore;

/// Everything needed to (re)create an OAuth client for one agent.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Ephemeral agent instance id.
    pub agent_id: Uuid,
    /// Human-readable agent name (becomes the client name).
    pub agent_name: String,
    /// URL the agent is deployed at.
    pub agent_url: String,
    /// The agent's DID — the stable client id.
    pub did: String,
    /// Base58 public key for hybrid authentication, when key material exists.
    pub public_key_base58: Option<String>,
}

impl RegistrationRequest {
    /// Build a request from an [`AgentIdentity`].
    ///
    /// The DID is required; a missing or unreadable public key is tolerated
    /// (the client is registered without hybrid key material).
    pub fn from_identity(
        identity: &AgentIdentity,
        agent_id: Uuid,
        agent_name: &str,
        agent_url: &str,
    ) -> Result<Self, RegistryError> {
        let public_key_base58 = match identity.public_key_base58() {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(error = %e, "public key unavailable, registering without key material");
                None
            }
        };
        Ok(Self {
            agent_id,
            agent_name: agent_name.to_string(),
            agent_url: agent_url.to_string(),
            did: identity.did()?,
            public_key_base58,
        })
    }
}

/// Reconciles OAuth client state across the secret backend, the remote
/// admin API and the local credentials file.
pub struct ClientReconciler {
    config: RegistryConfig,
    admin: Arc<dyn OAuthAdmin>,
    store: CredentialStore,
    secrets: Option<Arc<dyn SecretBackend>>,
}

impl ClientReconciler {
    /// Build a reconciler with explicit collaborators. Pass `None` for
    /// `secrets` when no secret backend is configured.
    pub fn new(
        config: RegistryConfig,
        admin: Arc<dyn OAuthAdmin>,
        store: CredentialStore,
        secrets: Option<Arc<dyn SecretBackend>>,
    ) -> Self {
        Self {
            config,
            admin,
            store,
            secrets,
        }
    }

    /// Obtain authoritative credentials for `request.did`.
    ///
    /// Returns `None` when auto-registration is disabled or when the flow
    /// failed — the agent then starts degraded, without OAuth credentials.
    /// The secret backend is released on every exit path.
    pub async fn reconcile(&self, request: &RegistrationRequest) -> Option<AgentCredentials> {
        if !self.config.auto_register {
            info!("auto-registration disabled, skipping OAuth client setup");
            return None;
        }

        let result = self.try_reconcile(request).await;
        if let Some(secrets) = &self.secrets {
            secrets.close().await;
        }

        match result {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!(did = %request.did, error = %e, "OAuth client registration failed");
                warn!(
                    "agent will start without OAuth credentials; \
                     authentication may not work correctly"
                );
                None
            }
        }
    }

    async fn try_reconcile(
        &self,
        request: &RegistrationRequest,
    ) -> Result<AgentCredentials, RegistryError> {
        let did = &request.did;

        // Priority 1: the secret backend. Its copy of the secret is ground
        // truth, so if the remote client went missing we recreate it with
        // the same secret rather than minting a new one.
        let mut recovered: Option<AgentCredentials> = None;
        if let Some(secrets) = &self.secrets {
            if let Some(backed_up) = secrets.get_credentials(did).await? {
                if self.admin.get_client(&backed_up.client_id).await?.is_some() {
                    info!(did = %did, "backed-up credentials verified against authorization server");
                    self.store.save(&backed_up)?;
                    return Ok(backed_up);
                }
                warn!(
                    did = %did,
                    "secret backend has credentials but the client is gone remotely; \
                     recreating it with the same secret"
                );
                recovered = Some(backed_up);
            }
        }

        // Priority 2: the remote server decides whether the client exists.
        if self.admin.get_client(did).await?.is_some() {
            if let Some(local) = self.store.load(did) {
                info!(did = %did, "local credentials verified against authorization server");
                if let Some(secrets) = &self.secrets {
                    if recovered.is_none() && !secrets.store_credentials(&local).await {
                        warn!(did = %did, "failed to back up credentials to secret backend");
                    }
                }
                return Ok(local);
            }
            if let Some(backed_up) = recovered.take() {
                info!(did = %did, "adopting backed-up credentials for existing client");
                self.store.save(&backed_up)?;
                return Ok(backed_up);
            }
            // The client exists but nobody holds credentials for it: it is
            // unusable. Rebuild the whole triad from scratch.
            warn!(
                did = %did,
                "client exists remotely but no credentials found anywhere; \
                 deleting and recreating"
            );
            self.admin.delete_client(did).await?;
        } else if recovered.is_some() {
            info!(did = %did, "recreating client with secret from the secret backend");
        } else if self.store.load(did).is_some() {
            warn!(
                did = %did,
                "local credentials exist but the client is gone remotely; \
                 creating a new client (old credentials are superseded)"
            );
        }

        // Create: carry the recovered secret forward when there is one.
        let client_secret = recovered
            .map(|c| c.client_secret)
            .unwrap_or_else(mint_client_secret);
        let client = self.build_client_request(request, client_secret.clone());
        self.admin.create_client(&client).await?;

        let credentials = AgentCredentials::new(
            request.agent_id,
            did,
            client_secret,
            self.config.default_scopes.clone(),
        );

        // Persist: the local file always, the secret backend best-effort.
        self.store.save(&credentials)?;
        if let Some(secrets) = &self.secrets {
            if secrets.store_credentials(&credentials).await {
                info!(did = %did, "credentials backed up to secret backend");
            } else {
                warn!(did = %did, "failed to back up credentials to secret backend");
            }
        }

        Ok(credentials)
    }

    fn build_client_request(
        &self,
        request: &RegistrationRequest,
        client_secret: String,
    ) -> OAuthClientRequest {
        let has_key = request.public_key_base58.is_some();
        OAuthClientRequest {
            client_id: request.did.clone(),
            client_secret,
            client_name: request.agent_name.clone(),
            grant_types: self.config.default_grant_types.clone(),
            response_types: vec!["code".to_string(), "token".to_string()],
            scope: self.config.default_scopes.join(" "),
            token_endpoint_auth_method: "client_secret_post".to_string(),
            metadata: ClientMetadata {
                agent_id: request.agent_id,
                agent_url: request.agent_url.clone(),
                did: request.did.clone(),
                public_key: request.public_key_base58.clone(),
                key_type: has_key.then(|| "Ed25519".to_string()),
                verification_method: has_key.then(|| ED25519_VERIFICATION_2018.to_string()),
                registered_at: Utc::now(),
                hybrid_auth: true,
            },
        }
    }
}

/// Mint a high-entropy client secret: 32 random bytes, base64url without
/// padding (43 characters).
fn mint_client_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
