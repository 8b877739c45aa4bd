//! XDG Base Directory utilities.

use std::path::PathBuf;

/// Application directory name under the XDG config home.
pub const APP_DIR: &str = "agent-resolver";

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Option<PathBuf> {
    config_home_with(|key| std::env::var(key).ok())
}

fn config_home_with(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(xdg) = lookup("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    lookup("HOME").map(|home| PathBuf::from(home).join(".config"))
}

/// Path of the global config file, if a config home can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    config_home().map(|home| home.join(APP_DIR).join("config.toml"))
}
