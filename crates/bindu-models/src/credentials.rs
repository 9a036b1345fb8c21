//! OAuth client credentials owned by a single agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OAuth2 client credentials minted for one agent identity.
///
/// The record is persisted to the local credentials file and, when a secret
/// backend is configured, backed up there as well. It is keyed by
/// [`client_id`](Self::client_id) everywhere: the `client_id` **is** the
/// agent's DID, which stays stable across reloads, while
/// [`agent_id`](Self::agent_id) is regenerated on every reload and must never
/// be used as a lookup key.
///
/// Credentials are never mutated in place; recreating a client produces a
/// fresh record that supersedes the old one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AgentCredentials {
    /// Ephemeral agent instance id (changes on every reload).
    pub agent_id: Uuid,
    /// OAuth client id — always the agent's DID.
    pub client_id: String,
    /// High-entropy client secret (base64url, ≥ 32 bytes of entropy).
    pub client_secret: String,
    /// When the client was registered, UTC.
    pub created_at: DateTime<Utc>,
    /// Scopes granted to the client at registration time.
    pub scopes: Vec<String>,
}

impl AgentCredentials {
    /// Build a fresh credentials record with `created_at` = now.
    pub fn new(agent_id: Uuid, did: &str, client_secret: String, scopes: Vec<String>) -> Self {
        Self {
            agent_id,
            client_id: did.to_string(),
            client_secret,
            created_at: Utc::now(),
            scopes,
        }
    }
}
