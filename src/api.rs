use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use url::Url;

use crate::error::BundleError;
use crate::formats::{BundleRequest, BundleResult, SearchResult};

#[async_trait]
pub trait BookApi: Send + Sync {
    async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>, BundleError>;
    async fn analyze(&self, request: &BundleRequest) -> Result<BundleResult, BundleError>;
    async fn health(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct HttpBookApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookApi {
    pub fn new(api_url: &Url) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("bookbundle/0.1")
            .build()
            .context("build api http client")?;
        Ok(Self::with_client(client, api_url))
    }

    pub fn with_client(client: reqwest::Client, api_url: &Url) -> Self {
        Self {
            client,
            base_url: api_url.as_str().trim_end_matches('/').to_owned(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, String> {
    let status = response.status();
    let raw = response
        .text()
        .await
        .map_err(|err| format!("read response body: {err}"))?;
    if !status.is_success() {
        return Err(format!("server responded {status}"));
    }
    serde_json::from_str(&raw).map_err(|err| format!("parse response: {err}"))
}

#[async_trait]
impl BookApi for HttpBookApi {
    async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>, BundleError> {
        let endpoint = self.endpoint("books/search");
        let response = self
            .client
            .get(&endpoint)
            .query(&[("keyword", keyword)])
            .send()
            .await
            .map_err(|err| BundleError::SearchFailed(format!("GET {endpoint}: {err}")))?;
        let results: Vec<SearchResult> = read_json(response)
            .await
            .map_err(BundleError::SearchFailed)?;
        tracing::debug!(keyword, count = results.len(), "search finished");
        Ok(results)
    }

    async fn analyze(&self, request: &BundleRequest) -> Result<BundleResult, BundleError> {
        let endpoint = self.endpoint("bundle/analyze");
        let response = self
            .client
            .post(&endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| BundleError::AnalysisFailed(format!("POST {endpoint}: {err}")))?;
        let result: BundleResult = read_json(response)
            .await
            .map_err(BundleError::AnalysisFailed)?;
        tracing::info!(
            books = request.books.len(),
            sellers = result.sellers.len(),
            has_complete_seller = result.has_complete_seller,
            analysis_time_ms = result.analysis_time_ms,
            "bundle analysis finished"
        );
        Ok(result)
    }

    async fn health(&self) -> bool {
        let endpoint = self.endpoint("health");
        match self.client.get(&endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(%err, "health check failed");
                false
            }
        }
    }
}
