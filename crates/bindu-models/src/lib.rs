#![deny(missing_docs)]

//! # Bindu Models
//!
//! Core data types for the bindu agent identity and credential lifecycle.
//!
//! ## Type overview
//!
//! ```text
//! AgentCredentials            local + Vault copy of an OAuth client registration
//! OAuthClientRequest          JSON body sent to the admin API on registration
//! ├── GrantType               OAuth2 grant types the client may use
//! └── ClientMetadata          DID / agent metadata attached to the client
//! OAuthClientRecord           lenient view of a client returned by the admin API
//! DidDocument                 W3C-style DID document served for resolution
//! └── VerificationMethod      single Ed25519 authentication entry
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`credentials`] | [`AgentCredentials`] — the record cached locally and backed up remotely |
//! | [`oauth`] | Admin-API request/response bodies and [`GrantType`] |
//! | [`did`] | [`DidDocument`] and its verification method |

pub mod credentials;
pub mod did;
pub mod oauth;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `bindu_models::AgentCredentials` directly.
pub use credentials::*;
pub use did::*;
pub use oauth::*;
