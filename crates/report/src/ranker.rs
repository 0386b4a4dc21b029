// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::WhaleEntry;
use alloy::primitives::Address;
use tracing::{debug, warn};
use whales_config::ChainConfig;
use whales_evm::{AccountKind, BalanceRecord, TokenDescriptor};
use whales_utils::scale_amount;

/// A holder that cleared the threshold but is not yet classified
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub address: Address,
    pub amount: f64,
}

/// Applies the supply threshold and orders the survivors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhaleRanker {
    total_supply: f64,
    threshold_percent: f64,
    decimals: u8,
}

impl WhaleRanker {
    /// `total_supply` is in whole token units
    pub fn new(total_supply: f64, threshold_percent: f64, decimals: u8) -> Self {
        Self {
            total_supply,
            threshold_percent,
            decimals,
        }
    }

    pub fn for_token(token: &TokenDescriptor, threshold_percent: f64) -> Self {
        let total_supply = scale_amount(token.raw_total_supply(), token.decimals());
        if total_supply == 0.0 {
            warn!(
                token = %token.address(),
                "Total supply is zero, every holder with a positive balance qualifies"
            );
        }
        Self::new(total_supply, threshold_percent, token.decimals())
    }

    pub fn total_supply(&self) -> f64 {
        self.total_supply
    }

    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    /// Smallest amount that still counts as a whale
    pub fn minimum_amount(&self) -> f64 {
        self.total_supply * self.threshold_percent / 100.0
    }

    pub fn percentage(&self, amount: f64) -> f64 {
        if self.total_supply > 0.0 {
            amount / self.total_supply * 100.0
        } else {
            0.0
        }
    }

    /// Keep records whose scaled balance is at least [`Self::minimum_amount`]. Input order is kept.
    pub fn qualify(&self, records: &[BalanceRecord]) -> Vec<Candidate> {
        let minimum = self.minimum_amount();
        let candidates: Vec<Candidate> = records
            .iter()
            .map(|record| Candidate {
                address: record.address,
                amount: scale_amount(record.raw_balance, self.decimals),
            })
            .filter(|candidate| candidate.amount >= minimum)
            .collect();

        debug!(
            minimum,
            holders = records.len(),
            qualifying = candidates.len(),
            "Applied threshold"
        );
        candidates
    }

    /// Pair each candidate with its classification and sort by amount, largest first.
    ///
    /// `kinds` lines up with `candidates`. Equal amounts keep their input order.
    pub fn rank(
        &self,
        candidates: &[Candidate],
        kinds: &[AccountKind],
        chain: &ChainConfig,
    ) -> Vec<WhaleEntry> {
        let mut whales: Vec<WhaleEntry> = candidates
            .iter()
            .zip(kinds)
            .map(|(candidate, kind)| WhaleEntry {
                address: candidate.address,
                amount: candidate.amount,
                percentage: self.percentage(candidate.amount),
                kind: *kind,
                label: kind.label(),
                explorer: chain.explorer_link(&candidate.address),
            })
            .collect();

        // sort_by is stable
        whales.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        whales
    }
}
