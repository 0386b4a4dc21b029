// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use chrono::{DateTime, Local};
use serde::Serialize;
use whales_evm::{AccountKind, TokenDescriptor};

pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One ranked holder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhaleEntry {
    pub address: Address,
    /// Balance in whole token units
    pub amount: f64,
    /// Share of total supply, 0 when the supply is unknown
    pub percentage: f64,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub label: &'static str,
    pub explorer: String,
}

/// Everything persisted about one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub token: String,
    pub contract: Address,
    pub total_supply: f64,
    pub threshold_percent: f64,
    pub total_whales_found: usize,
    pub generated_at: String,
    pub whales: Vec<WhaleEntry>,
    #[serde(skip)]
    created_at: DateTime<Local>,
}

impl Report {
    pub fn new(
        token: &TokenDescriptor,
        total_supply: f64,
        threshold_percent: f64,
        whales: Vec<WhaleEntry>,
    ) -> Self {
        Self::at(token, total_supply, threshold_percent, whales, Local::now())
    }

    pub fn at(
        token: &TokenDescriptor,
        total_supply: f64,
        threshold_percent: f64,
        whales: Vec<WhaleEntry>,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            token: token.symbol().to_string(),
            contract: token.address(),
            total_supply,
            threshold_percent,
            total_whales_found: whales.len(),
            generated_at: created_at.format(GENERATED_AT_FORMAT).to_string(),
            whales,
            created_at,
        }
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }
}
