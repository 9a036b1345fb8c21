//! OAuth authorization-server admin API client.
//!
//! The admin API is an external collaborator; the reconciler only needs the
//! three operations in [`OAuthAdmin`]. [`HydraAdminClient`] implements them
//! against an Ory-Hydra-style REST surface over reqwest, with per-request
//! timeout, a TLS-verification toggle and a bounded retry budget for
//! transport failures.

use std::time::Duration;

use async_trait::async_trait;
use bindu_models::{OAuthClientRecord, OAuthClientRequest};
use reqwest::{Method, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::RegistryError;

/// The three admin-API operations the reconciler depends on.
#[async_trait]
pub trait OAuthAdmin: Send + Sync {
    /// Fetch a client by id; `Ok(None)` when the client does not exist.
    async fn get_client(&self, client_id: &str)
        -> Result<Option<OAuthClientRecord>, RegistryError>;

    /// Register a new client. Non-2xx responses are
    /// [`RegistryError::Registration`].
    async fn create_client(&self, client: &OAuthClientRequest) -> Result<(), RegistryError>;

    /// Delete a client by id. A client that is already gone counts as
    /// success — the goal is convergence.
    async fn delete_client(&self, client_id: &str) -> Result<(), RegistryError>;
}

/// Reqwest-backed admin client for an Ory-Hydra-style authorization server.
#[derive(Debug, Clone)]
pub struct HydraAdminClient {
    http: reqwest::Client,
    admin_url: String,
    max_retries: u32,
}

impl HydraAdminClient {
    /// Build a client from the registry configuration.
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self {
            http,
            admin_url: config.admin_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    fn client_url(&self, client_id: &str) -> String {
        format!("{}/admin/clients/{client_id}", self.admin_url)
    }

    /// Send a request, retrying transport-level failures up to the
    /// configured budget. HTTP error statuses are not retried — they are
    /// decisions, not outages.
    async fn send_with_retries(
        &self,
        method: Method,
        url: &str,
        body: Option<&OAuthClientRequest>,
    ) -> Result<Response, RegistryError> {
        let mut attempt = 0;
        loop {
            let mut request = self.http.request(method.clone(), url);
            if let Some(body) = body {
                request = request.json(body);
            }
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        url,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "admin API request failed, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl OAuthAdmin for HydraAdminClient {
    async fn get_client(
        &self,
        client_id: &str,
    ) -> Result<Option<OAuthClientRecord>, RegistryError> {
        let url = self.client_url(client_id);
        let response = self.send_with_retries(Method::GET, &url, None).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record: OAuthClientRecord = response.json().await?;
                debug!(client_id, "client found on authorization server");
                Ok(Some(record))
            }
            status => Err(RegistryError::AdminApi {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn create_client(&self, client: &OAuthClientRequest) -> Result<(), RegistryError> {
        let url = format!("{}/admin/clients", self.admin_url);
        let response = self
            .send_with_retries(Method::POST, &url, Some(client))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Registration {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        info!(client_id = %client.client_id, "OAuth client created");
        Ok(())
    }

    async fn delete_client(&self, client_id: &str) -> Result<(), RegistryError> {
        let url = self.client_url(client_id);
        let response = self.send_with_retries(Method::DELETE, &url, None).await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            info!(client_id, "OAuth client deleted");
            return Ok(());
        }
        Err(RegistryError::AdminApi {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}
