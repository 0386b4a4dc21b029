// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::rpc::{RpcAuth, RPC};
use alloy_primitives::{address, Address};
use anyhow::*;
use serde::{Deserialize, Serialize};

/// Multicall3 is deployed at the same address on every major EVM chain
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Polygon PoS
pub const DEFAULT_CHAIN_ID: u64 = 137;

pub const DEFAULT_EXPLORER_URL: &str = "https://polygonscan.com";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    /// Chain id sent to the log-search api
    pub chain_id: u64,
    pub rpc_url: String,
    pub rpc_auth: RpcAuth,
    /// Block explorer base url used for report links
    pub explorer_url: String,
    /// Aggregator contract used for batched balance reads
    pub multicall_address: Address,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            rpc_url: String::new(),
            rpc_auth: RpcAuth::None,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            multicall_address: MULTICALL3_ADDRESS,
        }
    }
}

impl ChainConfig {
    pub fn rpc(&self) -> Result<RPC> {
        if self.rpc_url.is_empty() {
            bail!("Missing `chain.rpc_url`. Set it in the config file or via WHALES_CHAIN__RPC_URL.");
        }
        RPC::from_url(&self.rpc_url)
            .map_err(|e| anyhow!("Failed to parse RPC URL for chain {}: {}", self.chain_id, e))
    }

    /// Explorer page for an address
    pub fn explorer_link(&self, address: &Address) -> String {
        format!(
            "{}/address/{}",
            self.explorer_url.trim_end_matches('/'),
            address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_link_uses_checksummed_address() {
        let chain = ChainConfig {
            explorer_url: "https://polygonscan.com/".to_string(),
            ..ChainConfig::default()
        };
        let addr: Address = "0xc2132d05d31c914a87c6611c10748aeb04b58e8f"
            .parse()
            .unwrap();
        assert_eq!(
            chain.explorer_link(&addr),
            "https://polygonscan.com/address/0xc2132D05D31c914a87C6611C10748AEb04B58e8F"
        );
    }

    #[test]
    fn rpc_is_required() {
        let chain = ChainConfig::default();
        assert!(chain.rpc().is_err());

        let chain = ChainConfig {
            rpc_url: "https://polygon-rpc.com".to_string(),
            ..ChainConfig::default()
        };
        assert!(chain.rpc().is_ok());
    }
}
