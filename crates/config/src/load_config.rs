// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;

/// File name searched for when no `--config` is given
pub const DEFAULT_CONFIG_NAME: &str = "whales.config.yaml";

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Walk up from `start` looking for `filename`
pub fn find_in_parent(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Decide which configuration file a run reads.
///
/// Precedence: an explicit cli path (relative paths are taken from `cwd`), then the nearest
/// `filename` in `cwd` or one of its ancestors, then `filename` in the OS config folder.
pub fn resolve_config_path(
    find_in_parent: FindInParent,
    cwd: &Path,
    default_config_dir: &Path,
    filename: &str,
    cli_file: Option<&Path>,
) -> PathBuf {
    if let Some(cli_file) = cli_file {
        if cli_file.is_absolute() {
            return cli_file.to_path_buf();
        }
        return clean(cwd.join(cli_file));
    }

    if let Some(found) = find_in_parent(cwd, filename) {
        return found;
    }

    clean(default_config_dir.join(filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    fn nothing(_: &Path, _: &str) -> Option<PathBuf> {
        None
    }

    fn in_project(_: &Path, _: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/project/whales.config.yaml"))
    }

    #[test]
    fn falls_back_to_os_config_dir() {
        let path = resolve_config_path(
            nothing,
            Path::new("/project/sub"),
            Path::new("/home/me/.config/whales"),
            DEFAULT_CONFIG_NAME,
            None,
        );
        assert_eq!(
            path,
            PathBuf::from("/home/me/.config/whales/whales.config.yaml")
        );
    }

    #[test]
    fn cli_path_wins_over_search() {
        let absolute = resolve_config_path(
            in_project,
            Path::new("/project/sub"),
            Path::new("/home/me/.config/whales"),
            DEFAULT_CONFIG_NAME,
            Some(Path::new("/etc/usdt.yaml")),
        );
        assert_eq!(absolute, PathBuf::from("/etc/usdt.yaml"));

        let relative = resolve_config_path(
            in_project,
            Path::new("/project/sub"),
            Path::new("/home/me/.config/whales"),
            DEFAULT_CONFIG_NAME,
            Some(Path::new("../tokens/usdc.yaml")),
        );
        assert_eq!(relative, PathBuf::from("/project/tokens/usdc.yaml"));
    }

    #[test]
    fn search_result_beats_default() {
        let path = resolve_config_path(
            in_project,
            Path::new("/project/sub"),
            Path::new("/home/me/.config/whales"),
            DEFAULT_CONFIG_NAME,
            None,
        );
        assert_eq!(path, PathBuf::from("/project/whales.config.yaml"));
    }

    #[test]
    fn find_in_parent_walks_upwards() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested)?;
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "token: null\n")?;

        let found = find_in_parent(&nested, DEFAULT_CONFIG_NAME);
        assert_eq!(found, Some(dir.path().join(DEFAULT_CONFIG_NAME)));
        assert_eq!(find_in_parent(&nested, "missing.yaml"), None);
        Ok(())
    }
}
