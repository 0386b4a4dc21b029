// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::models::{LogQuery, LogSearchResponse, PageRequest};
use crate::participants::{collect_participants, ParticipantSet};
use crate::{LogSearch, LogSearchError};
use alloy::primitives::{Address, B256};
use alloy::sol_types::SolEvent;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use whales_config::{AppConfig, BlockRange};
use whales_evm::contracts::IERC20;

/// Deepest result an Etherscan-compatible api will page into (`page * offset`)
pub const MAX_RESULT_WINDOW: u64 = 10_000;

/// Collects every address that sent or received the token within a block range
pub struct EventScanner<S> {
    search: Arc<S>,
    chain_id: u64,
    token: Address,
    topic0: B256,
    page_size: Option<u64>,
}

impl<S: LogSearch> EventScanner<S> {
    /// Scanner for ERC-20 `Transfer` events with a single request per scan
    pub fn new(search: Arc<S>, chain_id: u64, token: Address) -> Self {
        Self {
            search,
            chain_id,
            token,
            topic0: IERC20::Transfer::SIGNATURE_HASH,
            page_size: None,
        }
    }

    pub fn from_config(search: Arc<S>, config: &AppConfig) -> Self {
        let scanner = Self::new(search, config.chain().chain_id, config.token())
            .with_page_size(config.scan().page_size);
        match config.scan().event_topic {
            Some(topic) => scanner.with_topic(topic),
            None => scanner,
        }
    }

    pub fn with_topic(mut self, topic0: B256) -> Self {
        self.topic0 = topic0;
        self
    }

    pub fn with_page_size(mut self, page_size: Option<u64>) -> Self {
        self.page_size = page_size.filter(|size| *size > 0);
        self
    }

    /// Pages requested before giving up, bounded by [`MAX_RESULT_WINDOW`]
    pub fn max_pages(&self) -> u64 {
        self.page_size.map_or(1, |size| (MAX_RESULT_WINDOW / size).max(1))
    }

    /// Scan the inclusive range.
    ///
    /// Failures never surface as errors: a failed first request gives an empty set and a failed
    /// later page keeps what was gathered before it. Paging stops at a short page, at a page
    /// identical to the previous one (the api ignored `page`), or after [`Self::max_pages`].
    pub async fn scan(&self, range: BlockRange) -> ParticipantSet {
        info!(
            token = %self.token,
            from_block = range.from,
            to_block = range.to,
            "Scanning transfer logs"
        );

        let mut participants = ParticipantSet::new();
        let mut page = 1u64;
        let mut previous: Vec<Value> = Vec::new();

        loop {
            let query = self.query(range, page);
            let response = match self.fetch(&query).await {
                Ok(response) => response,
                Err(e) => {
                    if page == 1 {
                        warn!(error = %e, "Log search failed, no participants found");
                    } else {
                        warn!(page, error = %e, "Log search failed mid-scan, keeping earlier pages");
                    }
                    break;
                }
            };

            let entries = response.entries();
            if page > 1 && !entries.is_empty() && entries == previous.as_slice() {
                warn!(page, "Log search repeated the previous page, stopping pagination");
                break;
            }
            let skipped = collect_participants(entries, &mut participants);
            debug!(
                page,
                entries = entries.len(),
                skipped,
                participants = participants.len(),
                "Processed log page"
            );

            match self.page_size {
                Some(size) if entries.len() as u64 >= size => {
                    if page >= self.max_pages() {
                        warn!(
                            page,
                            "Reached the log search result window, later logs are not scanned"
                        );
                        break;
                    }
                    previous = entries.to_vec();
                    page += 1;
                }
                _ => break,
            }
        }

        info!(participants = participants.len(), "Scan complete");
        participants
    }

    fn query(&self, range: BlockRange, page: u64) -> LogQuery {
        LogQuery {
            chain_id: self.chain_id,
            address: self.token,
            topic0: self.topic0,
            from_block: range.from,
            to_block: range.to,
            page: self.page_size.map(|offset| PageRequest { page, offset }),
        }
    }

    async fn fetch(&self, query: &LogQuery) -> Result<LogSearchResponse, ScanFailure> {
        let response = self
            .search
            .get_logs(query)
            .await
            .map_err(ScanFailure::Search)?;
        if !response.is_ok() {
            return Err(ScanFailure::Reported {
                message: response.message,
                result: response.result.as_str().map(str::to_string),
            });
        }
        Ok(response)
    }
}

#[derive(Error, Debug)]
enum ScanFailure {
    #[error(transparent)]
    Search(LogSearchError),
    #[error("api reported: {message} ({})", .result.as_deref().unwrap_or("no details"))]
    Reported {
        message: String,
        result: Option<String>,
    },
}
