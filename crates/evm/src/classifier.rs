// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ChainReader;
use alloy::primitives::Address;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bytecode at or below this length is treated as no code at all
const TRIVIAL_CODE_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Contract,
    #[serde(rename = "EOA")]
    Eoa,
}

impl AccountKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AccountKind::Contract => "Contract",
            AccountKind::Eoa => "EOA",
        }
    }

    /// Human readable label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Contract => "Contract",
            AccountKind::Eoa => "Wallet",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

pub struct AddressClassifier<R> {
    reader: Arc<R>,
    concurrency: usize,
}

impl<R: ChainReader> AddressClassifier<R> {
    pub fn new(reader: Arc<R>, concurrency: usize) -> Self {
        Self {
            reader,
            concurrency: concurrency.max(1),
        }
    }

    /// Classify by deployed bytecode. A failed lookup is reported as [`AccountKind::Eoa`].
    pub async fn classify(&self, address: Address) -> AccountKind {
        match self.reader.code_at(address).await {
            Ok(code) if code.len() > TRIVIAL_CODE_LEN => AccountKind::Contract,
            Ok(_) => AccountKind::Eoa,
            Err(e) => {
                warn!(%address, error = %e, "Code lookup failed, assuming a wallet");
                AccountKind::Eoa
            }
        }
    }

    /// Classify many addresses. The output lines up index for index with `addresses`.
    pub async fn classify_all(&self, addresses: &[Address]) -> Vec<AccountKind> {
        debug!(count = addresses.len(), "Classifying addresses");
        stream::iter(addresses.iter().copied())
            .map(|address| self.classify(address))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(AccountKind::Contract.type_name(), "Contract");
        assert_eq!(AccountKind::Contract.label(), "Contract");
        assert_eq!(AccountKind::Eoa.type_name(), "EOA");
        assert_eq!(AccountKind::Eoa.label(), "Wallet");
        assert_eq!(AccountKind::Eoa.to_string(), "EOA");
    }

    #[test]
    fn test_kind_serializes_as_type_name() {
        assert_eq!(
            serde_json::to_string(&AccountKind::Eoa).unwrap(),
            "\"EOA\""
        );
        assert_eq!(
            serde_json::to_string(&AccountKind::Contract).unwrap(),
            "\"Contract\""
        );
    }
}
