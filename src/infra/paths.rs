// src/infra/paths.rs — Config path resolution
//
// REDRAFT_HOME overrides everything. When unset, config lives in ~/.redraft/.

use std::path::PathBuf;

pub const HOME_ENV: &str = "REDRAFT_HOME";

/// Returns the REDRAFT_HOME override, if set.
fn redraft_home() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV).map(PathBuf::from)
}

/// Home directory, if the platform can tell us one.
pub fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Configuration directory: $REDRAFT_HOME/ or ~/.redraft/
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = redraft_home() {
        return Some(home);
    }
    dirs_home().map(|h| h.join(".redraft"))
}

/// Config file path
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
