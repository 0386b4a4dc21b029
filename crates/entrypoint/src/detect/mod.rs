// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};
use whales_config::AppConfig;
use whales_evm::helpers::ProviderConfig;
use whales_evm::{AddressClassifier, BalanceAggregator, ChainReader, TokenDescriptor};
use whales_indexer::{EventScanner, ExplorerClient, LogSearch};
use whales_report::{Report, ReportSink, WhaleRanker};

/// A completed run that produced a report
#[derive(Debug)]
pub struct Detection {
    pub token: TokenDescriptor,
    pub report: Report,
    /// Where the report was saved
    pub path: PathBuf,
    pub participants: usize,
    /// Participants with a positive balance
    pub holders: usize,
    pub failed_batches: usize,
}

#[derive(Debug)]
pub enum Outcome {
    /// The scan found nothing. No report is written.
    NoActivity { token: TokenDescriptor },
    Report(Box<Detection>),
}

/// Connect to the configured chain and log-search api, then run the pipeline
pub async fn run(config: &AppConfig) -> Result<Outcome> {
    // Fail on a bad range before touching the network
    config.scan().range()?;

    let provider = ProviderConfig::from_chain(config.chain())?
        .create_readonly_provider()
        .await?;
    let search =
        ExplorerClient::from_config(config.scan()).context("Could not set up log search client")?;

    execute(config, provider.shared(), Arc::new(search)).await
}

/// Run every stage in order: token metadata, log scan, balances, threshold, classification,
/// ranking and persistence
#[instrument(name = "detect", skip_all, fields(token = %config.token()))]
pub async fn execute<R, S>(config: &AppConfig, reader: Arc<R>, search: Arc<S>) -> Result<Outcome>
where
    R: ChainReader,
    S: LogSearch,
{
    let range = config.scan().range()?;

    let token = TokenDescriptor::fetch(reader.as_ref(), config.token())
        .await
        .inspect_err(|e| error!("{e}"))?;

    let participants = EventScanner::from_config(search, config).scan(range).await;
    if participants.is_empty() {
        info!(
            from_block = range.from,
            to_block = range.to,
            "No activity found in this range"
        );
        return Ok(Outcome::NoActivity { token });
    }

    let balances = BalanceAggregator::from_config(reader.clone(), config)
        .collect(participants.as_slice())
        .await;

    let ranker = WhaleRanker::for_token(&token, config.report().threshold_percent);
    let candidates = ranker.qualify(&balances.records);
    info!(
        minimum = ranker.minimum_amount(),
        whales = candidates.len(),
        "Holders above threshold"
    );

    let addresses: Vec<Address> = candidates.iter().map(|c| c.address).collect();
    let kinds = AddressClassifier::new(reader, config.balances().concurrency)
        .classify_all(&addresses)
        .await;

    let whales = ranker.rank(&candidates, &kinds, config.chain());
    let report = Report::new(
        &token,
        ranker.total_supply(),
        ranker.threshold_percent(),
        whales,
    );
    let path = ReportSink::from_config(config.report())
        .write(&report)
        .context("Could not save report")?;

    Ok(Outcome::Report(Box::new(Detection {
        token,
        report,
        path,
        participants: participants.len(),
        holders: balances.records.len(),
        failed_batches: balances.failed_batches,
    })))
}
