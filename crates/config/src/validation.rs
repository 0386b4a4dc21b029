// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::str::FromStr;

use anyhow::bail;
use url::Url;

/// A url argument parsed by clap
#[derive(Clone, Debug)]
pub struct ValidUrl(Url);

impl FromStr for ValidUrl {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ValidUrl(Url::parse(s)?))
    }
}

impl From<ValidUrl> for String {
    fn from(value: ValidUrl) -> Self {
        value.0.to_string()
    }
}

/// A percentage of total supply in `0..=100`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Percent(f64);

impl Percent {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl FromStr for Percent {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().trim_end_matches('%').parse()?;
        if !(0.0..=100.0).contains(&value) {
            bail!("percentage must be between 0 and 100, got {}", value);
        }
        Ok(Percent(value))
    }
}

impl From<Percent> for f64 {
    fn from(value: Percent) -> Self {
        value.0
    }
}
