// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::models::{LogQuery, LogSearchResponse};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LogSearchError {
    #[error("Request to the log search api failed: {0}")]
    Transport(String),
    #[error("Log search api answered with HTTP {0}")]
    Http(u16),
    #[error("Could not parse the log search response: {0}")]
    Malformed(String),
}

/// Trait for an injectable log-search backend
#[async_trait]
pub trait LogSearch: Send + Sync {
    async fn get_logs(&self, query: &LogQuery) -> Result<LogSearchResponse, LogSearchError>;
}
