// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use whales_config::AppConfig;

/// The effective configuration as YAML, prefixed with the file it was read from
pub fn execute(config: &AppConfig) -> Result<String> {
    let source = match config.config_file() {
        Some(path) => format!("# loaded from {}\n", path.display()),
        None => "# no config file found, using defaults and environment\n".to_string(),
    };
    Ok(format!("{source}{}", config.to_redacted_yaml()?))
}
