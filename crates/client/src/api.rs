//! REST client for the case template endpoints.
//!
//! Wraps the template, list and user HTTP endpoints using [`reqwest`] and
//! exposes them through the editor's [`TemplateStore`],
//! [`ReferenceCatalog`] and [`UserDirectory`] ports.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use casetpl_core::{CustomFieldDefinition, MetricDefinition, StoredTemplate, TemplateId, User};
use casetpl_editor::{ReferenceCatalog, StoreError, TemplateStore, UserDirectory};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;

const TEMPLATE_PATH: &str = "/api/case/template";
const METRICS_PATH: &str = "/api/list/case_metrics";
const CUSTOM_FIELDS_PATH: &str = "/api/list/custom_fields";
const USER_SEARCH_PATH: &str = "/api/user/_search";

/// HTTP client for one server.
pub struct TemplateApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Response returned when a template is created.
#[derive(Debug, Deserialize)]
struct CreatedTemplate {
    id: TemplateId,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl From<ClientError> for StoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ApiError { status, body } => StoreError::Api { status, body },
            ClientError::Request(e) if e.is_decode() => StoreError::Decode(e.to_string()),
            ClientError::Request(e) => StoreError::Transport(e.to_string()),
        }
    }
}

impl TemplateApi {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn template_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, TEMPLATE_PATH, id)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        tracing::debug!(%method, %url, "Template API request");
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// `POST /api/case/template/_search?range=all`
    pub async fn list_templates(&self) -> Result<Vec<StoredTemplate>, ClientError> {
        let response = self
            .request(
                reqwest::Method::POST,
                self.url(&format!("{TEMPLATE_PATH}/_search")),
            )
            .query(&[("range", "all")])
            .json(&serde_json::json!({ "query": {} }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /api/case/template/{id}`
    pub async fn get_template(&self, id: &str) -> Result<StoredTemplate, ClientError> {
        let response = self
            .request(reqwest::Method::GET, self.template_url(id))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /api/case/template`; returns the server-assigned id.
    pub async fn create_template(
        &self,
        body: &serde_json::Value,
    ) -> Result<TemplateId, ClientError> {
        let response = self
            .request(reqwest::Method::POST, self.url(TEMPLATE_PATH))
            .json(body)
            .send()
            .await?;
        let created: CreatedTemplate = Self::parse_response(response).await?;
        Ok(created.id)
    }

    /// `PATCH /api/case/template/{id}`
    pub async fn update_template(
        &self,
        id: &str,
        body: &serde_json::Value,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::PATCH, self.template_url(id))
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `DELETE /api/case/template/{id}`
    pub async fn delete_template(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, self.template_url(id))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `GET /api/list/case_metrics`
    pub async fn list_metrics(&self) -> Result<Vec<MetricDefinition>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, self.url(METRICS_PATH))
            .send()
            .await?;
        let entries: BTreeMap<String, MetricDefinition> = Self::parse_response(response).await?;
        Ok(sorted_metrics(entries))
    }

    /// `GET /api/list/custom_fields`, re-keyed by field reference.
    pub async fn list_custom_fields(
        &self,
    ) -> Result<BTreeMap<String, CustomFieldDefinition>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, self.url(CUSTOM_FIELDS_PATH))
            .send()
            .await?;
        let entries: BTreeMap<String, CustomFieldDefinition> =
            Self::parse_response(response).await?;
        Ok(index_by_reference(entries))
    }

    /// `POST /api/user/_search?range=all` restricted to active users.
    pub async fn list_active_users(&self) -> Result<Vec<User>, ClientError> {
        let response = self
            .request(reqwest::Method::POST, self.url(USER_SEARCH_PATH))
            .query(&[("range", "all")])
            .json(&serde_json::json!({ "query": { "status": "Ok" } }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ClientError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), %body, "Template API returned an error");
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// List entries come keyed by database id; the editor wants them by name.
fn sorted_metrics(entries: BTreeMap<String, MetricDefinition>) -> Vec<MetricDefinition> {
    let mut metrics: Vec<MetricDefinition> = entries.into_values().collect();
    metrics.sort_by(|a, b| a.name.cmp(&b.name));
    metrics
}

fn index_by_reference(
    entries: BTreeMap<String, CustomFieldDefinition>,
) -> BTreeMap<String, CustomFieldDefinition> {
    entries
        .into_values()
        .map(|def| (def.reference.clone(), def))
        .collect()
}

// ---------------------------------------------------------------------------
// Port implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl TemplateStore for TemplateApi {
    async fn list(&self) -> Result<Vec<StoredTemplate>, StoreError> {
        Ok(self.list_templates().await?)
    }

    async fn get(&self, id: &str) -> Result<StoredTemplate, StoreError> {
        Ok(self.get_template(id).await?)
    }

    async fn create(&self, body: &serde_json::Value) -> Result<TemplateId, StoreError> {
        Ok(self.create_template(body).await?)
    }

    async fn update(&self, id: &str, body: &serde_json::Value) -> Result<(), StoreError> {
        Ok(self.update_template(id, body).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        Ok(self.delete_template(id).await?)
    }
}

#[async_trait]
impl ReferenceCatalog for TemplateApi {
    async fn metrics(&self) -> Result<Vec<MetricDefinition>, StoreError> {
        Ok(self.list_metrics().await?)
    }

    async fn custom_fields(&self) -> Result<BTreeMap<String, CustomFieldDefinition>, StoreError> {
        Ok(self.list_custom_fields().await?)
    }
}

#[async_trait]
impl UserDirectory for TemplateApi {
    async fn active_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.list_active_users().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
