// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use whales_evm::contracts::{IMulticall3, IERC20};
use whales_evm::ChainReader;

/// Block number reported by every aggregated call
pub const MOCK_BLOCK_NUMBER: u64 = 1_000;

/// Bytecode long enough to count as a deployed contract
pub fn contract_code() -> Bytes {
    Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52])
}

#[derive(Default)]
struct ChainState {
    decimals: Option<u8>,
    symbol: Option<String>,
    total_supply: Option<U256>,
    balances: HashMap<Address, U256>,
    raw_results: HashMap<Address, Bytes>,
    code: HashMap<Address, Bytes>,
    failing_code: HashSet<Address>,
    reverting_owners: HashSet<Address>,
    latencies: HashMap<Address, Duration>,
    aggregate_batches: Vec<Vec<Address>>,
    completed_batches: Vec<Vec<Address>>,
    code_lookups: Vec<Address>,
}

/// Scripted [`ChainReader`] serving a single ERC-20 token and a Multicall3 aggregator.
///
/// Token reads answer for any target; an aggregated call reverts as a whole when it contains a
/// reverting owner, the way Multicall3 `aggregate` does.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    /// A token with the given metadata. Use [`MockChain::without_decimals`] and friends to
    /// script failures.
    pub fn token(decimals: u8, symbol: &str, total_supply: U256) -> Self {
        let chain = Self::default();
        {
            let mut state = chain.lock();
            state.decimals = Some(decimals);
            state.symbol = Some(symbol.to_string());
            state.total_supply = Some(total_supply);
        }
        chain
    }

    pub fn without_decimals(self) -> Self {
        self.lock().decimals = None;
        self
    }

    pub fn without_symbol(self) -> Self {
        self.lock().symbol = None;
        self
    }

    pub fn without_total_supply(self) -> Self {
        self.lock().total_supply = None;
        self
    }

    pub fn with_balance(self, owner: Address, balance: U256) -> Self {
        self.lock().balances.insert(owner, balance);
        self
    }

    /// Return `blob` verbatim as the balance result for `owner`
    pub fn with_raw_result(self, owner: Address, blob: Bytes) -> Self {
        self.lock().raw_results.insert(owner, blob);
        self
    }

    pub fn with_contract(self, address: Address) -> Self {
        self.lock().code.insert(address, contract_code());
        self
    }

    pub fn with_code(self, address: Address, code: Bytes) -> Self {
        self.lock().code.insert(address, code);
        self
    }

    /// Bytecode lookups for `address` fail
    pub fn with_failing_code(self, address: Address) -> Self {
        self.lock().failing_code.insert(address);
        self
    }

    /// Any aggregated call containing `owner` reverts
    pub fn with_reverting_owner(self, owner: Address) -> Self {
        self.lock().reverting_owners.insert(owner);
        self
    }

    /// Any aggregated call containing `owner` answers after `latency`
    pub fn with_latency(self, owner: Address, latency: Duration) -> Self {
        self.lock().latencies.insert(owner, latency);
        self
    }

    /// Owners of every aggregated call received, in arrival order
    pub fn aggregate_batches(&self) -> Vec<Vec<Address>> {
        self.lock().aggregate_batches.clone()
    }

    /// Owners of every aggregated call answered, in completion order
    pub fn completed_batches(&self) -> Vec<Vec<Address>> {
        self.lock().completed_batches.clone()
    }

    pub fn aggregate_calls(&self) -> usize {
        self.lock().aggregate_batches.len()
    }

    pub fn code_lookups(&self) -> Vec<Address> {
        self.lock().code_lookups.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChainState> {
        // A poisoned lock only happens after a panicking test
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn aggregate(&self, input: &[u8]) -> Result<Bytes> {
        let call = IMulticall3::aggregateCall::abi_decode(input)?;
        let mut owners = Vec::with_capacity(call.calls.len());
        for inner in &call.calls {
            let balance_of = IERC20::balanceOfCall::abi_decode(&inner.callData)?;
            owners.push(balance_of.owner);
        }

        let latency = {
            let mut state = self.lock();
            state.aggregate_batches.push(owners.clone());
            owners
                .iter()
                .filter_map(|owner| state.latencies.get(owner))
                .max()
                .copied()
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        state.completed_batches.push(owners.clone());

        if owners.iter().any(|o| state.reverting_owners.contains(o)) {
            bail!("execution reverted: Multicall3: call failed");
        }

        let return_data = owners
            .iter()
            .map(|owner| match state.raw_results.get(owner) {
                Some(blob) => blob.clone(),
                None => {
                    let balance = state.balances.get(owner).copied().unwrap_or_default();
                    Bytes::from(balance.to_be_bytes::<32>().to_vec())
                }
            })
            .collect();

        let encoded = IMulticall3::aggregateCall::abi_encode_returns(&IMulticall3::aggregateReturn {
            blockNumber: U256::from(MOCK_BLOCK_NUMBER),
            returnData: return_data,
        });
        Ok(encoded.into())
    }
}

fn selector(input: &[u8]) -> Option<[u8; 4]> {
    input.get(..4)?.try_into().ok()
}

#[async_trait]
impl ChainReader for MockChain {
    async fn eth_call(&self, _to: Address, input: Bytes) -> Result<Bytes> {
        let selector = selector(&input).ok_or_else(|| anyhow!("calldata too short"))?;

        if selector == IMulticall3::aggregateCall::SELECTOR {
            return self.aggregate(&input).await;
        }

        let state = self.lock();
        let output = if selector == IERC20::decimalsCall::SELECTOR {
            let decimals = state
                .decimals
                .ok_or_else(|| anyhow!("execution reverted"))?;
            IERC20::decimalsCall::abi_encode_returns(&decimals)
        } else if selector == IERC20::symbolCall::SELECTOR {
            let symbol = state
                .symbol
                .clone()
                .ok_or_else(|| anyhow!("execution reverted"))?;
            IERC20::symbolCall::abi_encode_returns(&symbol)
        } else if selector == IERC20::totalSupplyCall::SELECTOR {
            let supply = state
                .total_supply
                .ok_or_else(|| anyhow!("execution reverted"))?;
            IERC20::totalSupplyCall::abi_encode_returns(&supply)
        } else if selector == IERC20::balanceOfCall::SELECTOR {
            let call = IERC20::balanceOfCall::abi_decode(&input)?;
            let balance = state.balances.get(&call.owner).copied().unwrap_or_default();
            IERC20::balanceOfCall::abi_encode_returns(&balance)
        } else {
            bail!("unexpected selector 0x{}", alloy::hex::encode(selector));
        };
        Ok(output.into())
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        let mut state = self.lock();
        state.code_lookups.push(address);
        if state.failing_code.contains(&address) {
            bail!("code lookup for {address} timed out");
        }
        Ok(state.code.get(&address).cloned().unwrap_or_default())
    }
}
