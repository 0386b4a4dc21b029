// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::contracts::IERC20;
use crate::ChainReader;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use thiserror::Error;
use tracing::{info, warn};

/// Shown in place of a symbol the token would not report
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenReadError {
    #[error("call to {to} failed: {reason}")]
    Rpc { to: Address, reason: String },
    #[error("could not decode {function} output: {reason}")]
    Decode {
        function: &'static str,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Token {token} did not report its decimals, amounts cannot be scaled ({source})")]
    DecimalsUnavailable {
        token: Address,
        source: TokenReadError,
    },
}

/// A value that was either read from the token or substituted after a failed read
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Fallback { value: T, reason: TokenReadError },
}

impl<T> Lookup<T> {
    pub fn value(&self) -> &T {
        match self {
            Lookup::Found(value) => value,
            Lookup::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Lookup::Fallback { .. })
    }

    /// Why the fallback was used
    pub fn reason(&self) -> Option<&TokenReadError> {
        match self {
            Lookup::Found(_) => None,
            Lookup::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Static metadata needed to interpret raw balances. Fetched once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDescriptor {
    address: Address,
    decimals: u8,
    symbol: Lookup<String>,
    total_supply: Lookup<U256>,
}

impl TokenDescriptor {
    pub fn new(
        address: Address,
        decimals: u8,
        symbol: Lookup<String>,
        total_supply: Lookup<U256>,
    ) -> Self {
        Self {
            address,
            decimals,
            symbol,
            total_supply,
        }
    }

    /// Read decimals, symbol and total supply from the token contract.
    ///
    /// Decimals are required. A failed symbol read falls back to [`UNKNOWN_SYMBOL`] and a
    /// failed total supply read falls back to zero, which makes every positive balance clear
    /// the threshold.
    pub async fn fetch<R: ChainReader + ?Sized>(
        reader: &R,
        address: Address,
    ) -> Result<Self, DescriptorError> {
        let decimals = read(reader, address, IERC20::decimalsCall {})
            .await
            .map_err(|source| DescriptorError::DecimalsUnavailable {
                token: address,
                source,
            })?;

        let symbol = match read(reader, address, IERC20::symbolCall {}).await {
            Ok(symbol) => Lookup::Found(symbol),
            Err(reason) => {
                warn!(
                    token = %address,
                    error = %reason,
                    "Could not read token symbol, using {}",
                    UNKNOWN_SYMBOL
                );
                Lookup::Fallback {
                    value: UNKNOWN_SYMBOL.to_string(),
                    reason,
                }
            }
        };

        let total_supply = match read(reader, address, IERC20::totalSupplyCall {}).await {
            Ok(supply) => Lookup::Found(supply),
            Err(reason) => {
                warn!(
                    token = %address,
                    error = %reason,
                    "Could not read total supply, treating it as zero. Every holder with a positive balance will qualify."
                );
                Lookup::Fallback {
                    value: U256::ZERO,
                    reason,
                }
            }
        };

        let descriptor = Self::new(address, decimals, symbol, total_supply);
        info!(
            token = %address,
            symbol = descriptor.symbol(),
            decimals,
            total_supply = %descriptor.raw_total_supply(),
            "Resolved token"
        );
        Ok(descriptor)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn symbol(&self) -> &str {
        self.symbol.value()
    }

    pub fn symbol_lookup(&self) -> &Lookup<String> {
        &self.symbol
    }

    pub fn raw_total_supply(&self) -> U256 {
        *self.total_supply.value()
    }

    pub fn total_supply_lookup(&self) -> &Lookup<U256> {
        &self.total_supply
    }
}

async fn read<R, C>(reader: &R, to: Address, call: C) -> Result<C::Return, TokenReadError>
where
    R: ChainReader + ?Sized,
    C: SolCall,
{
    let output = reader
        .eth_call(to, call.abi_encode().into())
        .await
        .map_err(|e| TokenReadError::Rpc {
            to,
            reason: e.to_string(),
        })?;

    C::abi_decode_returns(&output).map_err(|e| TokenReadError::Decode {
        function: C::SIGNATURE,
        reason: e.to_string(),
    })
}
