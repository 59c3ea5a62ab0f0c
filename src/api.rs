use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::types::{ApiDraw, Draw};

pub const DEFAULT_API_URL: &str = "https://servicebus2.caixa.gov.br/portaldeloterias/api/lotofacil";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where draws come from when they are not cached.
#[async_trait]
pub trait DrawSource: Send + Sync {
    async fn fetch_latest(&self) -> FetchResult<Draw>;

    async fn fetch_by_number(&self, number: u32) -> FetchResult<Draw>;
}

#[async_trait]
impl<T: DrawSource + ?Sized> DrawSource for Arc<T> {
    async fn fetch_latest(&self) -> FetchResult<Draw> {
        (**self).fetch_latest().await
    }

    async fn fetch_by_number(&self, number: u32) -> FetchResult<Draw> {
        (**self).fetch_by_number(number).await
    }
}

/// Client for the Caixa lottery results API.
#[derive(Debug, Clone)]
pub struct CaixaClient {
    client: reqwest::Client,
    base_url: String,
}

impl CaixaClient {
    pub fn new(base_url: &str, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unreachable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, url: &str) -> FetchResult<Draw> {
        debug!(base_url = %self.base_url, url = %url, "fetching draw");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "results API request failed"))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "results API returned an error status");
            return Err(FetchError::Unreachable(format!("HTTP {} from {}", status, url)));
        }

        let body = response
            .bytes()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "failed reading results API body"))?;

        parse_draw(&body).inspect_err(|e| warn!(url = %url, error = %e, "unusable results API payload"))
    }
}

#[async_trait]
impl DrawSource for CaixaClient {
    async fn fetch_latest(&self) -> FetchResult<Draw> {
        self.fetch(&format!("{}/", self.base_url)).await
    }

    async fn fetch_by_number(&self, number: u32) -> FetchResult<Draw> {
        self.fetch(&format!("{}/{}", self.base_url, number)).await
    }
}

/// Decodes a response body into a canonical draw.
pub fn parse_draw(body: &[u8]) -> FetchResult<Draw> {
    let json: Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::MalformedPayload(format!("body is not JSON: {}", e)))?;

    let api: ApiDraw = serde_json::from_value(json)
        .map_err(|e| FetchError::MalformedPayload(format!("unexpected draw shape: {}", e)))?;

    Draw::try_from(api)
}
