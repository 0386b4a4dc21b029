// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::Report;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, trace};
use whales_config::ReportConfig;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Could not create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not write report to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persists reports as pretty printed json files
pub struct ReportSink {
    output_dir: PathBuf,
}

impl ReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.output_dir.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `whales_<SYMBOL>_<unix seconds>.json`
    pub fn file_name(report: &Report) -> String {
        format!(
            "whales_{}_{}.json",
            sanitize_symbol(&report.token),
            report.created_at().timestamp()
        )
    }

    /// Write the report and return where it landed. An existing file is never overwritten;
    /// a numeric suffix is added instead.
    pub fn write(&self, report: &Report) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.available_path(&Self::file_name(report));
        let json = serde_json::to_string_pretty(report)?;
        trace!(path = %path.display(), "Writing report");

        fs::write(&path, json).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), whales = report.total_whales_found, "Report saved");
        Ok(path)
    }

    fn available_path(&self, file_name: &str) -> PathBuf {
        let path = self.output_dir.join(file_name);
        if !path.exists() {
            return path;
        }
        let stem = file_name.trim_end_matches(".json");
        (1..)
            .map(|n| self.output_dir.join(format!("{stem}_{n}.json")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(path)
    }
}

/// Keep only characters that are safe in a file name
pub fn sanitize_symbol(symbol: &str) -> String {
    let cleaned: String = symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "TOKEN".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_symbol() {
        assert_eq!(sanitize_symbol("USDT"), "USDT");
        assert_eq!(sanitize_symbol("USD₮0"), "USD0");
        assert_eq!(sanitize_symbol("a/b c"), "abc");
        assert_eq!(sanitize_symbol("wETH-e_2"), "wETH-e_2");
        assert_eq!(sanitize_symbol("../"), "TOKEN");
    }
}
