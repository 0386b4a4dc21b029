// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use whales_config::AppConfig;
use whales_evm::helpers::ProviderConfig;
use whales_evm::{ChainReader, TokenDescriptor};

pub async fn run(config: &AppConfig) -> Result<TokenDescriptor> {
    let provider = ProviderConfig::from_chain(config.chain())?
        .create_readonly_provider()
        .await?;
    execute(config, provider.provider()).await
}

/// Resolve the configured token's metadata
pub async fn execute<R: ChainReader + ?Sized>(
    config: &AppConfig,
    reader: &R,
) -> Result<TokenDescriptor> {
    Ok(TokenDescriptor::fetch(reader, config.token()).await?)
}
