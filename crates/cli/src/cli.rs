// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::PathBuf;

use crate::helpers::telemetry::{setup_simple_tracing, setup_tracing};
use crate::{print_config, scan, token};
use alloy::primitives::Address;
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, instrument, warn, Level};
use whales_config::validation::{Percent, ValidUrl};
use whales_config::{load_config, AppConfig, CliOverrides, ReportOverrides, ScanOverrides};

#[derive(Parser, Debug)]
#[command(name = "whales")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")"))]
#[command(about = "Find the largest holders of an ERC-20 token from its transfer history", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `whales -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// Token contract address. Overrides `token` from the config
    #[arg(long, global = true)]
    pub token: Option<Address>,

    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    #[arg(long = "otel", global = true)]
    pub otel: Option<ValidUrl>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let config = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                setup_simple_tracing(self.log_level());
                return Err(e);
            }
        };

        let provider = setup_tracing(&config, self.log_level())?;
        info!("Config loaded from: {:?}", config.config_file());

        let result = match self.command {
            Commands::Scan { .. } => scan::execute(&config).await,
            Commands::Token => token::execute(&config).await,
            Commands::PrintConfig => print_config::execute(&config),
        };

        if let Some(provider) = provider {
            if let Err(e) = provider.shutdown() {
                warn!("Could not flush telemetry: {e}");
            }
        }

        result
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        load_config(self.config.clone(), self.overrides())
    }

    /// Values given on the command line, layered over file and environment config
    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            token: self.token,
            otel: self.otel.clone().map(Into::into),
            ..CliOverrides::default()
        };

        if let Commands::Scan {
            from_block,
            to_block,
            threshold,
            output_dir,
            top,
        } = &self.command
        {
            overrides.scan = ScanOverrides {
                from_block: *from_block,
                to_block: *to_block,
            };
            overrides.report = ReportOverrides {
                threshold_percent: threshold.map(|t| t.value()),
                display_limit: *top,
                output_dir: output_dir.clone(),
            };
        }

        overrides
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan transfer history and report every holder at or above the threshold
    Scan {
        /// First block of the scanned range
        #[arg(long)]
        from_block: Option<u64>,

        /// Last block of the scanned range (inclusive)
        #[arg(long)]
        to_block: Option<u64>,

        /// Minimum share of total supply in percent. Eg. `0.1` or `0.1%`
        #[arg(long)]
        threshold: Option<Percent>,

        /// Directory the json report is written to
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Rows shown in the console table
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show the token's decimals, symbol and total supply
    Token,

    /// Print the effective configuration
    PrintConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_flags_become_overrides() {
        let cli = Cli::parse_from([
            "whales",
            "--token",
            "0xc2132D05D31c914a87C6611C10748AEb04B58e8F",
            "scan",
            "--from-block",
            "10",
            "--to-block",
            "20",
            "--threshold",
            "0.5%",
            "--top",
            "25",
        ]);

        let overrides = cli.overrides();
        assert!(overrides.token.is_some());
        assert_eq!(overrides.scan.from_block, Some(10));
        assert_eq!(overrides.scan.to_block, Some(20));
        assert_eq!(overrides.report.threshold_percent, Some(0.5));
        assert_eq!(overrides.report.display_limit, Some(25));
        assert_eq!(overrides.report.output_dir, None);
    }

    #[test]
    fn test_log_level() {
        assert_eq!(Cli::parse_from(["whales", "token"]).log_level(), Level::WARN);
        assert_eq!(
            Cli::parse_from(["whales", "-vv", "token"]).log_level(),
            Level::DEBUG
        );
        assert_eq!(
            Cli::parse_from(["whales", "-q", "print-config"]).log_level(),
            Level::ERROR
        );
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        assert!(Cli::try_parse_from(["whales", "scan", "--threshold", "120"]).is_err());
    }
}
