// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::models::{LogQuery, LogSearchResponse};
use crate::{LogSearch, LogSearchError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;
use whales_config::ScanConfig;

/// Etherscan compatible log-search client
pub struct ExplorerClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl ExplorerClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LogSearchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LogSearchError::Transport(format!("invalid url {base_url}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LogSearchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self, LogSearchError> {
        Self::new(
            &config.log_search_url,
            config.api_key.clone(),
            config.timeout(),
        )
    }

    fn query_params(&self, query: &LogQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("chainid", query.chain_id.to_string()),
            ("module", "logs".to_string()),
            ("action", "getLogs".to_string()),
            ("fromBlock", query.from_block.to_string()),
            ("toBlock", query.to_block.to_string()),
            ("address", query.address.to_string()),
            ("topic0", query.topic0.to_string()),
        ];
        if let Some(page) = query.page {
            params.push(("page", page.page.to_string()));
            params.push(("offset", page.offset.to_string()));
        }
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.clone()));
        }
        params
    }
}

#[async_trait]
impl LogSearch for ExplorerClient {
    async fn get_logs(&self, query: &LogQuery) -> Result<LogSearchResponse, LogSearchError> {
        debug!(
            url = %self.base_url,
            from_block = query.from_block,
            to_block = query.to_block,
            page = query.page.map(|p| p.page),
            "Requesting logs"
        );

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| LogSearchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LogSearchError::Http(status.as_u16()));
        }

        response
            .json::<LogSearchResponse>()
            .await
            .map_err(|e| LogSearchError::Malformed(e.to_string()))
    }
}
