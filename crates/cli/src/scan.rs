// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use tracing::instrument;
use whales_config::AppConfig;
use whales_entrypoint::detect::{self, Outcome};
use whales_report::WhaleTable;

#[instrument(name = "scan", skip_all)]
pub async fn execute(config: &AppConfig) -> Result<()> {
    match detect::run(config).await? {
        Outcome::NoActivity { .. } => {
            println!("No activity found in this range.");
        }
        Outcome::Report(detection) => {
            println!(
                "{} ({}): {} participants, {} holders with a balance",
                detection.token.symbol(),
                detection.token.address(),
                detection.participants,
                detection.holders
            );
            if detection.failed_batches > 0 {
                println!(
                    "{} balance batch(es) failed, their addresses are missing from this report",
                    detection.failed_batches
                );
            }
            println!();
            print!(
                "{}",
                WhaleTable::new(&detection.report, config.report().display_limit)
            );
            println!();
            println!("Report saved to {}", detection.path.display());
        }
    }
    Ok(())
}
