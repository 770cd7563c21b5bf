//! Credential acquisition for collaborator calls.
//!
//! Every store and search call carries a user bearer token and a
//! service-to-service token. Credentials are fetched per call through the
//! [`CredentialsProvider`] seam; the processor never caches them across
//! cases, so token expiry mid-batch cannot strand the run.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result, response_error};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The header carrying the service-to-service token.
pub const SERVICE_AUTH_HEADER: &str = "Service-Authorization";

/// Bearer and service tokens attached to one collaborator call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The user bearer token.
    pub bearer: String,
    /// The service-to-service token.
    pub service: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer", &"[REDACTED]")
            .field("service", &"[REDACTED]")
            .finish()
    }
}

/// Supplies fresh credentials for one collaborator call.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Fetches a bearer token and a service token.
    ///
    /// # Errors
    ///
    /// Returns an error if either token cannot be obtained.
    async fn credentials(&self) -> Result<Credentials>;
}

/// Fetches credentials from the identity service over HTTP.
///
/// Exchanges user credentials at the token endpoint and the service
/// secret at the lease endpoint; holds no token state between calls.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    service_name: String,
    service_secret: String,
}

impl HttpIdentityClient {
    /// Creates a new identity client targeting the given base URL.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        service_name: impl Into<String>,
        service_secret: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            service_name: service_name.into(),
            service_secret: service_secret.into(),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.base_url.trim_end_matches('/'))
    }

    fn lease_url(&self) -> String {
        format!("{}/lease", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_bearer(&self) -> Result<String> {
        let request = TokenRequest {
            username: &self.username,
            password: &self.password,
        };
        let response = self
            .client
            .post(self.token_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(response_error("token request", response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::auth(format!("invalid token response: {e}")))?;
        Ok(token.access_token)
    }

    async fn fetch_service_token(&self) -> Result<String> {
        let request = LeaseRequest {
            name: &self.service_name,
            secret: &self.service_secret,
        };
        let response = self
            .client
            .post(self.lease_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::auth(format!("lease request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(response_error("lease request", response).await);
        }

        let lease: LeaseResponse = response
            .json()
            .await
            .map_err(|e| ClientError::auth(format!("invalid lease response: {e}")))?;
        Ok(lease.service_token)
    }
}

#[async_trait]
impl CredentialsProvider for HttpIdentityClient {
    async fn credentials(&self) -> Result<Credentials> {
        let bearer = self.fetch_bearer().await?;
        let service = self.fetch_service_token().await?;
        Ok(Credentials { bearer, service })
    }
}

/// Fixed credentials, for tests and local runs against stub collaborators.
#[derive(Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Creates a provider that always returns the given tokens.
    #[must_use]
    pub fn new(bearer: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                bearer: bearer.into(),
                service: service.into(),
            },
        }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials> {
        Ok(self.credentials.clone())
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct LeaseRequest<'a> {
    name: &'a str,
    secret: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaseResponse {
    service_token: String,
}
