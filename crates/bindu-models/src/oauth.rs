//! Request and response bodies for the OAuth authorization-server admin API.
//!
//! These types mirror what an Ory-Hydra-style admin endpoint accepts and
//! returns for client registration. Only the fields the reconciliation flow
//! needs are modelled; everything else the server returns is ignored on
//! deserialisation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// GrantType
// ---------------------------------------------------------------------------

/// OAuth2 grant types a registered client may use.
///
/// Serialises to the wire names (`client_credentials`, …) both through serde
/// and through `Display`/`FromStr` (strum), so the same type works in JSON
/// bodies and in env-var configuration.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GrantType {
    /// Machine-to-machine `client_credentials` grant (the agent default).
    ClientCredentials,
    /// Interactive `authorization_code` grant.
    AuthorizationCode,
    /// `refresh_token` grant.
    RefreshToken,
}

// ---------------------------------------------------------------------------
// Client creation request
// ---------------------------------------------------------------------------

/// JSON body of `POST /admin/clients`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OAuthClientRequest {
    /// Client id — the agent's DID.
    pub client_id: String,
    /// Client secret the server must store for this client.
    pub client_secret: String,
    /// Human-readable client name (the agent name).
    pub client_name: String,
    /// Grant types the client is allowed to use.
    pub grant_types: Vec<GrantType>,
    /// OAuth response types (`code`, `token`).
    pub response_types: Vec<String>,
    /// Space-separated scope string.
    pub scope: String,
    /// Token endpoint auth method (`client_secret_post`).
    pub token_endpoint_auth_method: String,
    /// DID / agent metadata attached to the registration.
    pub metadata: ClientMetadata,
}

/// Agent metadata embedded in the OAuth client record.
///
/// `hybrid_auth` marks the client as usable with combined OAuth2
/// client-credential auth and DID signature verification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientMetadata {
    /// Ephemeral agent instance id at registration time.
    pub agent_id: Uuid,
    /// URL the agent is deployed at.
    pub agent_url: String,
    /// The agent's DID (same value as the client id).
    pub did: String,
    /// Base58-encoded Ed25519 public key, when key material is available.
    pub public_key: Option<String>,
    /// Key type label (`Ed25519`), present iff `public_key` is.
    pub key_type: Option<String>,
    /// DID verification method type, present iff `public_key` is.
    pub verification_method: Option<String>,
    /// When the registration was performed, UTC.
    pub registered_at: DateTime<Utc>,
    /// Hybrid OAuth2 + DID authentication flag (always `true` for agents).
    pub hybrid_auth: bool,
}

// ---------------------------------------------------------------------------
// Client record response
// ---------------------------------------------------------------------------

/// A client record as returned by `GET /admin/clients/{id}`.
///
/// Deliberately lenient: admin servers differ in which fields they echo back
/// (and most never return the secret), so everything beyond the id is
/// optional and unknown fields are dropped.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OAuthClientRecord {
    /// Client id (the DID).
    pub client_id: String,
    /// Client name, if the server echoes it.
    #[serde(default)]
    pub client_name: Option<String>,
    /// Space-separated scope string, if echoed.
    #[serde(default)]
    pub scope: Option<String>,
    /// Grant types, if echoed.
    #[serde(default)]
    pub grant_types: Option<Vec<GrantType>>,
    /// Metadata bag, if echoed. Kept as raw JSON — shapes vary per server.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_type_wire_names() {
        assert_eq!(GrantType::ClientCredentials.to_string(), "client_credentials");
        assert_eq!(
            serde_json::to_value(GrantType::AuthorizationCode).unwrap(),
            serde_json::json!("authorization_code")
        );
        assert_eq!(
            "refresh_token".parse::<GrantType>().unwrap(),
            GrantType::RefreshToken
        );
    }

    #[test]
    fn client_record_tolerates_minimal_response() {
        let record: OAuthClientRecord =
            serde_json::from_str(r#"{"client_id":"did:key:z1"}"#).unwrap();
        assert_eq!(record.client_id, "did:key:z1");
        assert!(record.client_name.is_none());
        assert!(record.metadata.is_null());
    }

    #[test]
    fn client_record_tolerates_unknown_fields() {
        let record: OAuthClientRecord = serde_json::from_str(
            r#"{"client_id":"x","audience":[],"skip_consent":false,"scope":"agent:read"}"#,
        )
        .unwrap();
        assert_eq!(record.scope.as_deref(), Some("agent:read"));
    }

    #[test]
    fn request_serialises_metadata_inline() {
        let req = OAuthClientRequest {
            client_id: "did:key:z1".into(),
            client_secret: "s".into(),
            client_name: "travel_agent".into(),
            grant_types: vec![GrantType::ClientCredentials],
            response_types: vec!["code".into(), "token".into()],
            scope: "agent:read agent:write".into(),
            token_endpoint_auth_method: "client_secret_post".into(),
            metadata: ClientMetadata {
                agent_id: Uuid::new_v4(),
                agent_url: "http://localhost:8030".into(),
                did: "did:key:z1".into(),
                public_key: None,
                key_type: None,
                verification_method: None,
                registered_at: Utc::now(),
                hybrid_auth: true,
            },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["grant_types"][0], "client_credentials");
        assert_eq!(value["metadata"]["hybrid_auth"], true);
        assert!(value["metadata"]["public_key"].is_null());
    }
}
