//! Error types for the `bindu-registry` crate.
//!
//! [`RegistryError`] unifies every failure mode of the registration flow.
//! The reconciler is the error boundary: all variants are caught there,
//! logged, and converted into a degraded absent-credentials result — an
//! unreachable registration server must never crash agent startup.

/// Errors raised while registering or reconciling OAuth clients.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The admin API rejected a client creation with a non-2xx status.
    #[error("client registration failed with status {status}: {body}")]
    Registration {
        /// HTTP status returned by the admin API.
        status: u16,
        /// Response body, for the operator log.
        body: String,
    },

    /// The admin API returned an unexpected non-2xx status on a query.
    #[error("admin API error (status {status}): {body}")]
    AdminApi {
        /// HTTP status returned by the admin API.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The secret backend returned an unexpected response.
    #[error("secret backend error: {0}")]
    SecretBackend(String),

    /// Identity key failure while extracting public-key material.
    #[error(transparent)]
    Identity(#[from] bindu_identity::IdentityError),

    /// Transport-level HTTP failure (after retries were exhausted).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialisation / deserialisation failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure in the local credential store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
