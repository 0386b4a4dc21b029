// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status the log-search api reports for a successful query
pub const STATUS_OK: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    /// Entries per page
    pub offset: u64,
}

/// One `module=logs&action=getLogs` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogQuery {
    pub chain_id: u64,
    pub address: Address,
    pub topic0: B256,
    pub from_block: u64,
    pub to_block: u64,
    pub page: Option<PageRequest>,
}

// Mirrors the json envelope returned by etherscan compatible apis
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogSearchResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    /// An array of log entries on success, usually an error string otherwise
    #[serde(default)]
    pub result: Value,
}

impl LogSearchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Log entries carried by the response. Anything that is not an array yields no entries.
    pub fn entries(&self) -> &[Value] {
        self.result.as_array().map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_parsing() {
        let ok: LogSearchResponse = serde_json::from_value(json!({
            "status": "1",
            "message": "OK",
            "result": [{ "topics": ["0x01"] }]
        }))
        .unwrap();
        assert!(ok.is_ok());
        assert_eq!(ok.entries().len(), 1);

        let err: LogSearchResponse = serde_json::from_value(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key"
        }))
        .unwrap();
        assert!(!err.is_ok());
        assert!(err.entries().is_empty());
    }
}
