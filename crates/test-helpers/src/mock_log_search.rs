// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, B256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use whales_evm::contracts::IERC20;
use whales_indexer::models::{LogQuery, LogSearchResponse, STATUS_OK};
use whales_indexer::{LogSearch, LogSearchError};

/// A `Transfer` log entry as the log-search api returns it
pub fn transfer_log(from: Address, to: Address) -> Value {
    json!({
        "address": Address::ZERO.to_string(),
        "topics": [
            IERC20::Transfer::SIGNATURE_HASH.to_string(),
            B256::left_padding_from(from.as_slice()).to_string(),
            B256::left_padding_from(to.as_slice()).to_string(),
        ],
        "data": "0x",
    })
}

pub fn ok_response(entries: Vec<Value>) -> LogSearchResponse {
    LogSearchResponse {
        status: STATUS_OK.to_string(),
        message: "OK".to_string(),
        result: Value::Array(entries),
    }
}

pub fn error_response(message: &str, detail: &str) -> LogSearchResponse {
    LogSearchResponse {
        status: "0".to_string(),
        message: message.to_string(),
        result: Value::String(detail.to_string()),
    }
}

/// Replays scripted log-search responses and records every query it receives
#[derive(Clone, Default)]
pub struct MockLogSearch {
    responses: Arc<Mutex<Vec<Result<LogSearchResponse, LogSearchError>>>>,
    queries: Arc<Mutex<Vec<LogQuery>>>,
}

impl MockLogSearch {
    /// Responses are served in order; once exhausted every query fails with a transport error
    pub fn new(responses: Vec<Result<LogSearchResponse, LogSearchError>>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Arc::new(Mutex::new(responses)),
            queries: Arc::default(),
        }
    }

    /// Single successful page containing one `Transfer` per pair
    pub fn transfers(pairs: &[(Address, Address)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(from, to)| transfer_log(*from, *to))
            .collect();
        Self::new(vec![Ok(ok_response(entries))])
    }

    pub fn queries(&self) -> Vec<LogQuery> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LogSearch for MockLogSearch {
    async fn get_logs(&self, query: &LogQuery) -> Result<LogSearchResponse, LogSearchError> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query.clone());
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .unwrap_or_else(|| Err(LogSearchError::Transport("no scripted response".to_string())))
    }
}
