// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::Report;
use std::fmt;
use whales_utils::{format_amount, truncate};

const RULE_WIDTH: usize = 150;

/// Console rendering of the first `limit` whales of a report
pub struct WhaleTable<'a> {
    report: &'a Report,
    limit: usize,
}

impl<'a> WhaleTable<'a> {
    pub fn new(report: &'a Report, limit: usize) -> Self {
        Self { report, limit }
    }
}

impl fmt::Display for WhaleTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "WHALES >= {}% OF TOTAL SUPPLY ({} found)",
            report.threshold_percent, report.total_whales_found
        )?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "{:<5} {:<9} {:<9} {:<43} {:>24} {:>10}   {}",
            "#", "Type", "Label", "Address", "Balance", "% Supply", "Explorer"
        )?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;

        for (rank, whale) in report.whales.iter().take(self.limit).enumerate() {
            writeln!(
                f,
                "{:<5} {:<9} {:<9} {:<43} {:>24} {:>9}%   {}",
                rank + 1,
                whale.kind.type_name(),
                truncate(whale.label, 9),
                whale.address.to_string(),
                format_amount(whale.amount, 2),
                format!("{:.4}", whale.percentage),
                whale.explorer
            )?;
        }

        let hidden = report.whales.len().saturating_sub(self.limit);
        if hidden > 0 {
            writeln!(f, "... {hidden} more in the saved report")?;
        }
        Ok(())
    }
}

pub fn render_table(report: &Report, limit: usize) -> String {
    WhaleTable::new(report, limit).to_string()
}
