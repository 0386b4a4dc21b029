// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use anyhow::anyhow;
use async_trait::async_trait;

/// Trait abstracting the read-only provider methods the pipeline needs.
/// Enables unit testing without a real EVM provider.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `eth_call` against the latest block
    async fn eth_call(&self, to: Address, input: Bytes) -> Result<Bytes, anyhow::Error>;
    /// `eth_getCode` against the latest block
    async fn code_at(&self, address: Address) -> Result<Bytes, anyhow::Error>;
}

#[async_trait]
impl<P: Provider + Send + Sync> ChainReader for P {
    async fn eth_call(&self, to: Address, input: Bytes) -> Result<Bytes, anyhow::Error> {
        let tx = TransactionRequest::default().to(to).input(input.into());
        Provider::call(self, tx).await.map_err(|e| anyhow!("{}", e))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, anyhow::Error> {
        self.get_code_at(address).await.map_err(|e| anyhow!("{}", e))
    }
}
