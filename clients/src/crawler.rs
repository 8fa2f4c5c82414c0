//! Peer crawler client.
//!
//! `GET {base}/representatives?min_weight=..&online_only=..` returns the
//! representative nodes the crawler can reach, or `null` when it has none.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use repwatch_monitor::{CrawledRepresentative, CrawlerSource, SourceError};

use crate::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct CrawlerClient {
    http: reqwest::Client,
    base_url: String,
}

impl CrawlerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Setup(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn representatives(
        &self,
        min_weight: u64,
        online_only: bool,
    ) -> Result<Vec<CrawledRepresentative>, ClientError> {
        let url = format!("{}/representatives", self.base_url.trim_end_matches('/'));
        debug!(%url, min_weight, online_only, "fetching crawled representatives");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("min_weight", min_weight.to_string()),
                ("online_only", online_only.to_string()),
            ])
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        if !response.status().is_success() {
            return Err(ClientError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("failed to parse crawler response: {e}")))?;
        parse_representatives(body)
    }
}

#[async_trait]
impl CrawlerSource for CrawlerClient {
    async fn representatives(
        &self,
        min_weight: u64,
        online_only: bool,
    ) -> Result<Vec<CrawledRepresentative>, SourceError> {
        Ok(CrawlerClient::representatives(self, min_weight, online_only).await?)
    }
}

fn parse_representatives(body: serde_json::Value) -> Result<Vec<CrawledRepresentative>, ClientError> {
    let reps: Option<Vec<CrawledRepresentative>> = serde_json::from_value(body)
        .map_err(|e| ClientError::InvalidResponse(format!("failed to parse crawler response: {e}")))?;
    Ok(reps.unwrap_or_default())
}
