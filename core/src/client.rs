//! Stateless HTTP request builder and response parser for the Crisp API.
//!
//! # Design
//! `CrispClient` holds only configuration (base URL, tier, credentials) and
//! carries no mutable state between calls. As a [`Transport`] it turns every
//! verb call made by a resource into an `HttpRequest`; the caller executes
//! the round-trip and feeds the `HttpResponse` back to `parse_response` or
//! `parse_empty`. The core stays deterministic and free of I/O.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Query};
use crate::resources::{WebsiteBatch, WebsiteConversation};
use crate::transport::Transport;
use crate::types::{Envelope, Tier};

pub const DEFAULT_BASE_URL: &str = "https://api.crisp.chat/v1";

#[derive(Debug, Clone)]
struct Credentials {
    identifier: String,
    key: SecretString,
}

/// Synchronous, stateless client for the Crisp REST API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct CrispClient {
    base_url: String,
    tier: Tier,
    credentials: Option<Credentials>,
}

impl Default for CrispClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CrispClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tier: Tier::default(),
            credentials: None,
        }
    }

    /// Build a client from the process environment.
    ///
    /// - `CRISP_API_URL` (optional) - base URL, defaults to [`DEFAULT_BASE_URL`]
    /// - `CRISP_TIER` (optional) - `user`, `website` or `plugin`
    /// - `CRISP_IDENTIFIER` / `CRISP_KEY` (optional, both or neither)
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup("CRISP_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut client = Self::new(&base_url);

        if let Some(tier) = lookup("CRISP_TIER") {
            client.set_tier(tier.parse()?);
        }

        match (lookup("CRISP_IDENTIFIER"), lookup("CRISP_KEY")) {
            (Some(identifier), Some(key)) => client.authenticate(&identifier, &key),
            (None, None) => {}
            _ => {
                return Err(ApiError::InvalidArgument(
                    "CRISP_IDENTIFIER and CRISP_KEY must be set together".to_string(),
                ))
            }
        }

        tracing::debug!(
            base_url = %client.base_url,
            tier = %client.tier,
            authenticated = client.is_authenticated(),
            "loaded client configuration from environment"
        );
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }

    pub fn authenticate(&mut self, identifier: &str, key: &str) {
        self.credentials = Some(Credentials {
            identifier: identifier.to_string(),
            key: SecretString::new(key.to_string()),
        });
    }

    pub fn authenticate_tier(&mut self, tier: Tier, identifier: &str, key: &str) {
        self.set_tier(tier);
        self.authenticate(identifier, key);
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn website_conversation(&self) -> WebsiteConversation<'_, Self> {
        WebsiteConversation::new(self)
    }

    pub fn website_batch(&self) -> WebsiteBatch<'_, Self> {
        WebsiteBatch::new(self)
    }

    /// Check the status, open the response envelope and decode its `data`.
    pub fn parse_response<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<T, ApiError> {
        let data = open_envelope(response)?;
        serde_json::from_value(data).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Like `parse_response` for acknowledgements whose payload is ignored.
    /// An empty 2xx body is accepted.
    pub fn parse_empty(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(());
        }
        open_envelope(response).map(|_| ())
    }

    fn build(
        &self,
        method: HttpMethod,
        url: String,
        query: Query,
        body: Option<Value>,
    ) -> HttpRequest {
        let mut headers = vec![("x-crisp-tier".to_string(), self.tier.to_string())];
        if let Some(credentials) = &self.credentials {
            let token = STANDARD.encode(format!(
                "{}:{}",
                credentials.identifier,
                credentials.key.expose_secret()
            ));
            headers.push(("authorization".to_string(), format!("Basic {token}")));
        }
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        tracing::debug!(%method, path = %url, query = query.len(), "built request");

        HttpRequest {
            method,
            path: url,
            query,
            headers,
            body: body.map(|value| value.to_string()),
        }
    }
}

impl Transport for CrispClient {
    type Output = HttpRequest;

    fn prepare_rest_url(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|segment| urlencoding::encode(segment))
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{path}", self.base_url)
    }

    fn get(&self, url: String, query: Query) -> HttpRequest {
        self.build(HttpMethod::Get, url, query, None)
    }

    fn post(&self, url: String, query: Option<Query>, body: Option<Value>) -> HttpRequest {
        self.build(HttpMethod::Post, url, query.unwrap_or_default(), body)
    }

    fn patch(&self, url: String, query: Option<Query>, body: Option<Value>) -> HttpRequest {
        self.build(HttpMethod::Patch, url, query.unwrap_or_default(), body)
    }

    fn delete(&self, url: String) -> HttpRequest {
        self.build(HttpMethod::Delete, url, Query::new(), None)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn open_envelope(response: HttpResponse) -> Result<Value, ApiError> {
    check_status(&response)?;
    let envelope: Envelope<Value> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    if envelope.error {
        tracing::warn!(reason = %envelope.reason, "service returned an error envelope");
        return Err(ApiError::Service {
            reason: envelope.reason,
        });
    }
    Ok(envelope.data)
}
