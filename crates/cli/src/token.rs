// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use whales_config::AppConfig;
use whales_entrypoint::token;
use whales_evm::Lookup;
use whales_utils::{format_amount, scale_amount};

pub async fn execute(config: &AppConfig) -> Result<()> {
    let descriptor = token::run(config).await?;

    println!("Token:        {}", descriptor.address());
    println!("Decimals:     {}", descriptor.decimals());
    println!(
        "Symbol:       {}{}",
        descriptor.symbol(),
        fallback_note(descriptor.symbol_lookup())
    );
    println!(
        "Total supply: {}{}",
        format_amount(
            scale_amount(descriptor.raw_total_supply(), descriptor.decimals()),
            2
        ),
        fallback_note(descriptor.total_supply_lookup())
    );
    println!("Raw supply:   {}", descriptor.raw_total_supply());
    Ok(())
}

fn fallback_note<T>(lookup: &Lookup<T>) -> String {
    match lookup.reason() {
        Some(reason) => format!(" (unavailable: {reason})"),
        None => String::new(),
    }
}
