//! HTTP client for Azure Resource Manager.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::Endpoints;
use crate::error::CliError;

/// Compute provider API version.
pub const API_VERSION: &str = "2018-10-01";

/// ARM client scoped to one subscription.
#[derive(Debug, Clone)]
pub struct ArmClient {
    client: reqwest::Client,
    base_url: String,
    subscription_id: String,
}

impl ArmClient {
    /// Create a client authenticated with a bearer token.
    pub fn new(endpoints: &Endpoints, subscription_id: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("hostfit/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).context("Invalid token format")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: endpoints.resource_manager.trim_end_matches('/').to_string(),
            subscription_id: subscription_id.to_string(),
        })
    }

    /// Build a URL for a path below the subscription.
    fn url(&self, path: &str) -> String {
        format!(
            "{}/subscriptions/{}{}",
            self.base_url, self.subscription_id, path
        )
    }

    /// GET a single resource, optionally with `$expand`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        expand: Option<&str>,
    ) -> Result<T, CliError> {
        let mut request = self
            .client
            .get(self.url(path))
            .query(&[("api-version", API_VERSION)]);
        if let Some(expand) = expand {
            request = request.query(&[("$expand", expand)]);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// GET a collection, following `nextLink` until the last page.
    pub async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, CliError> {
        let first = self
            .client
            .get(self.url(path))
            .query(&[("api-version", API_VERSION)])
            .send()
            .await?;
        let mut page: Page<T> = self.handle_response(first).await?;
        let mut items = std::mem::take(&mut page.value);
        let mut pages = 1;

        while let Some(next) = page.next_link.take() {
            // nextLink carries its own query string
            let response = self.client.get(&next).send().await?;
            page = self.handle_response(response).await?;
            items.append(&mut page.value);
            pages += 1;
        }

        debug!(path, pages, items = items.len(), "Listed collection");
        Ok(items)
    }

    /// PUT a resource.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        let response = self
            .client
            .put(self.url(path))
            .query(&[("api-version", API_VERSION)])
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle a successful or error response.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CliError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to parse response: {}", e)))
        } else {
            self.handle_error(response).await
        }
    }

    /// Handle an error response.
    async fn handle_error<T>(&self, response: reqwest::Response) -> Result<T, CliError> {
        let status = response.status().as_u16();

        let body: ArmErrorResponse = response.json().await.unwrap_or_else(|_| ArmErrorResponse {
            error: ArmErrorDetail {
                code: "Unknown".to_string(),
                message: format!("HTTP {status}"),
            },
        });

        Err(CliError::arm(status, body.error.code, body.error.message))
    }
}

/// One page of an ARM collection.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,

    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

/// ARM error envelope.
#[derive(Debug, Deserialize)]
struct ArmErrorResponse {
    error: ArmErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ArmErrorDetail {
    code: String,
    message: String,
}
