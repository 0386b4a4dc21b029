// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use whales_config::AppConfig;
use whales_entrypoint::config::print;

pub fn execute(config: &AppConfig) -> Result<()> {
    print!("{}", print::execute(config)?);
    Ok(())
}
