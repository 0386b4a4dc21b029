// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::contracts::{IMulticall3, IERC20};
use crate::ChainReader;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use whales_config::{AppConfig, BalanceConfig};

/// A participant holding a strictly positive balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceRecord {
    pub address: Address,
    pub raw_balance: U256,
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("aggregated call failed: {0}")]
    Call(anyhow::Error),
    #[error("could not decode aggregated result: {0}")]
    Decode(String),
}

/// Outcome of querying all batches
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollectedBalances {
    /// Positive balances in participant order
    pub records: Vec<BalanceRecord>,
    pub batches: usize,
    pub failed_batches: usize,
}

/// Reads current balances for many addresses through one aggregated call per batch
pub struct BalanceAggregator<R> {
    reader: Arc<R>,
    token: Address,
    multicall: Address,
    batch_size: usize,
    batch_delay: Duration,
    concurrency: usize,
}

impl<R: ChainReader> BalanceAggregator<R> {
    pub fn new(reader: Arc<R>, token: Address, multicall: Address, config: &BalanceConfig) -> Self {
        Self {
            reader,
            token,
            multicall,
            batch_size: config.batch_size.max(1),
            batch_delay: config.batch_delay(),
            concurrency: config.concurrency.max(1),
        }
    }

    pub fn from_config(reader: Arc<R>, config: &AppConfig) -> Self {
        Self::new(
            reader,
            config.token(),
            config.chain().multicall_address,
            config.balances(),
        )
    }

    /// Query every address and keep the positive balances.
    ///
    /// A failing batch is logged and its addresses are left out; the remaining batches still
    /// run. Records come back in the order of `addresses` whatever order batches finish in.
    pub async fn collect(&self, addresses: &[Address]) -> CollectedBalances {
        let batches: Vec<&[Address]> = addresses.chunks(self.batch_size).collect();
        let total = batches.len();

        info!(
            addresses = addresses.len(),
            batches = total,
            batch_size = self.batch_size,
            "Checking current balances"
        );

        let results: Vec<Result<Vec<BalanceRecord>, BatchError>> =
            stream::iter(batches.into_iter().enumerate())
                .map(|(index, batch)| self.query_batch(index, total, batch))
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut collected = CollectedBalances {
            batches: total,
            ..CollectedBalances::default()
        };
        for result in results {
            match result {
                Ok(records) => collected.records.extend(records),
                Err(_) => collected.failed_batches += 1,
            }
        }

        info!(
            holders = collected.records.len(),
            failed_batches = collected.failed_batches,
            "Balance check complete"
        );
        collected
    }

    async fn query_batch(
        &self,
        index: usize,
        total: usize,
        batch: &[Address],
    ) -> Result<Vec<BalanceRecord>, BatchError> {
        if index > 0 && !self.batch_delay.is_zero() {
            tokio::time::sleep(self.batch_delay).await;
        }

        let calls = batch
            .iter()
            .map(|owner| IMulticall3::Call {
                target: self.token,
                callData: IERC20::balanceOfCall { owner: *owner }.abi_encode().into(),
            })
            .collect();

        let result = self.aggregate(calls).await;
        let return_data = match result {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    batch = index + 1,
                    total,
                    addresses = batch.len(),
                    error = %e,
                    "Balance batch failed, skipping its addresses"
                );
                return Err(e);
            }
        };

        if return_data.len() < batch.len() {
            debug!(
                batch = index + 1,
                expected = batch.len(),
                received = return_data.len(),
                "Aggregator returned fewer results than calls"
            );
        }

        let mut records = Vec::new();
        for (address, blob) in batch.iter().zip(return_data.iter()) {
            match decode_balance(blob) {
                Some(raw_balance) if !raw_balance.is_zero() => records.push(BalanceRecord {
                    address: *address,
                    raw_balance,
                }),
                Some(_) => {}
                None => debug!(%address, len = blob.len(), "Skipping undecodable balance"),
            }
        }

        debug!(
            batch = index + 1,
            total,
            holders = records.len(),
            "Balance batch done"
        );
        Ok(records)
    }

    async fn aggregate(&self, calls: Vec<IMulticall3::Call>) -> Result<Vec<Bytes>, BatchError> {
        let input = IMulticall3::aggregateCall { calls }.abi_encode();
        let output = self
            .reader
            .eth_call(self.multicall, input.into())
            .await
            .map_err(BatchError::Call)?;

        let decoded = IMulticall3::aggregateCall::abi_decode_returns(&output)
            .map_err(|e| BatchError::Decode(e.to_string()))?;
        Ok(decoded.returnData)
    }
}

/// Interpret a `balanceOf` result as a big-endian `uint256`
pub fn decode_balance(blob: &[u8]) -> Option<U256> {
    if blob.len() > 32 {
        return None;
    }
    U256::try_from_be_slice(blob)
}
