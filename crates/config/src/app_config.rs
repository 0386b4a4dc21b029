// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::chain_config::ChainConfig;
use crate::load_config::{find_in_parent, resolve_config_path, DEFAULT_CONFIG_NAME};
use alloy_primitives::{Address, B256};
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_LOG_SEARCH_URL: &str = "https://api.etherscan.io/v2/api";
pub const DEFAULT_LOG_SEARCH_TIMEOUT_SECS: u64 = 40;
pub const DEFAULT_BATCH_SIZE: usize = 30;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 50;
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 0.1;
pub const DEFAULT_DISPLAY_LIMIT: usize = 100;

/// Environment variables with this prefix override file values. Nested keys are joined with
/// `__`, eg. `WHALES_SCAN__API_KEY`.
pub const ENV_PREFIX: &str = "WHALES_";

/// An inclusive block range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Result<Self> {
        if from > to {
            bail!("Invalid block range: from_block ({from}) is after to_block ({to})");
        }
        Ok(Self { from, to })
    }
}

/// Where and how transfer activity is searched
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
    /// Etherscan compatible `module=logs&action=getLogs` endpoint
    pub log_search_url: String,
    pub api_key: Option<String>,
    /// topic0 to search for. Defaults to the ERC-20 `Transfer` signature
    pub event_topic: Option<B256>,
    pub timeout_secs: u64,
    /// Request results page by page when set
    pub page_size: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            from_block: None,
            to_block: None,
            log_search_url: DEFAULT_LOG_SEARCH_URL.to_string(),
            api_key: None,
            event_topic: None,
            timeout_secs: DEFAULT_LOG_SEARCH_TIMEOUT_SECS,
            page_size: None,
        }
    }
}

impl ScanConfig {
    /// The scanned range. Only the `scan` command needs one so it is checked on demand.
    pub fn range(&self) -> Result<BlockRange> {
        let (Some(from), Some(to)) = (self.from_block, self.to_block) else {
            bail!("Both `scan.from_block` and `scan.to_block` must be set to scan for holders");
        };
        BlockRange::new(from, to)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BalanceConfig {
    /// Addresses per aggregated call
    pub batch_size: usize,
    /// Pause before every batch after the first
    pub batch_delay_ms: u64,
    /// Aggregated calls and bytecode lookups allowed in flight at once
    pub concurrency: usize,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            concurrency: 1,
        }
    }
}

impl BalanceConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Minimum share of total supply, in percent, for a holder to be reported
    pub threshold_percent: f64,
    /// Rows shown in the console table. The saved report is never truncated.
    pub display_limit: usize,
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            output_dir: PathBuf::from("."),
        }
    }
}

/// The configuration as read from disk and environment before validation
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UnvalidatedAppConfig {
    pub chain: ChainConfig,
    /// The token contract to analyse
    pub token: Option<Address>,
    pub scan: ScanConfig,
    pub balances: BalanceConfig,
    pub report: ReportConfig,
    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    pub otel: Option<String>,
}

/// The config actually used throughout a run. Built once and only read afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    chain: ChainConfig,
    token: Address,
    scan: ScanConfig,
    balances: BalanceConfig,
    report: ReportConfig,
    otel: Option<String>,
    #[serde(skip)]
    config_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn try_from_unvalidated(
        config: UnvalidatedAppConfig,
        config_file: Option<PathBuf>,
    ) -> Result<Self> {
        let Some(token) = config.token else {
            bail!("Missing `token`. Provide the token contract address in the config file, via WHALES_TOKEN or with --token.");
        };

        config.chain.rpc()?;

        if config.balances.batch_size == 0 {
            bail!("`balances.batch_size` must be greater than zero");
        }

        if config.balances.concurrency == 0 {
            bail!("`balances.concurrency` must be greater than zero");
        }

        if config.scan.page_size == Some(0) {
            bail!("`scan.page_size` must be greater than zero when set");
        }

        let threshold = config.report.threshold_percent;
        if !(0.0..=100.0).contains(&threshold) {
            bail!("`report.threshold_percent` must be between 0 and 100, got {threshold}");
        }

        Ok(AppConfig {
            chain: config.chain,
            token,
            scan: config.scan,
            balances: config.balances,
            report: config.report,
            otel: config.otel,
            config_file,
        })
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// The token contract address
    pub fn token(&self) -> Address {
        self.token
    }

    pub fn scan(&self) -> &ScanConfig {
        &self.scan
    }

    pub fn balances(&self) -> &BalanceConfig {
        &self.balances
    }

    pub fn report(&self) -> &ReportConfig {
        &self.report
    }

    /// Get the open telemetry collector url
    pub fn otel(&self) -> Option<String> {
        self.otel.clone()
    }

    /// The file the configuration was read from, if one existed
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Render the effective configuration with secrets masked
    pub fn to_redacted_yaml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.scan.api_key.is_some() {
            shown.scan.api_key = Some("<redacted>".to_string());
        }
        if !shown.chain.rpc_url.is_empty() {
            shown.chain.rpc_url = match crate::RPC::from_url(&shown.chain.rpc_url) {
                Ok(rpc) => rpc.redacted(),
                Err(_) => "<redacted>".to_string(),
            };
        }
        if !matches!(shown.chain.rpc_auth, crate::RpcAuth::None) {
            shown.chain.rpc_auth = crate::RpcAuth::Bearer("<redacted>".to_string());
        }
        Ok(serde_yaml::to_string(&shown)?)
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ScanOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ReportOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

/// Value struct for passing configuration from the cli to the configuration. Unset values
/// leave the lower layers untouched.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otel: Option<String>,
    pub scan: ScanOverrides,
    pub report: ReportOverrides,
}

/// Load the config from the given file, or the nearest `whales.config.yaml`, then apply
/// environment and cli overrides
pub fn load_config(config_file: Option<String>, overrides: CliOverrides) -> Result<AppConfig> {
    let cli_file = config_file.map(PathBuf::from);
    let cwd = env::current_dir()?;

    let resolved = resolve_config_path(
        find_in_parent,
        &cwd,
        &OsDirs::config_dir(),
        DEFAULT_CONFIG_NAME,
        cli_file.as_deref(),
    );

    // An explicitly requested file has to exist
    if cli_file.is_some() && !resolved.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Configuration file not found: {}", resolved.display()),
        )
        .into());
    }

    let found = resolved.is_file().then_some(resolved);

    let mut figment = Figment::from(Serialized::defaults(UnvalidatedAppConfig::default()));
    if let Some(path) = &found {
        figment = figment.merge(Yaml::file(path));
    }

    let config: UnvalidatedAppConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(&overrides))
        .extract()
        .context("Could not parse configuration")?;

    AppConfig::try_from_unvalidated(config, found)
}

pub struct OsDirs;
impl OsDirs {
    /// `~/.config/whales` on linux. Falls back to the working directory on platforms without
    /// a config dir.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("whales"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
