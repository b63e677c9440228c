// TabSort platform abstraction
// Where the host keeps its settings, and the async boundary to the browser itself.

use std::env;
use std::path::PathBuf;

pub mod browser;
pub mod stdio_bridge;

/// Overrides the config directory on every platform.
pub const CONFIG_DIR_ENV: &str = "TABSORT_CONFIG_DIR";

/// Returns the configuration directory for the native host.
///
/// - `$TABSORT_CONFIG_DIR` when set
/// - **Linux**: `$XDG_CONFIG_HOME/tabsort` or `~/.config/tabsort`
/// - **macOS**: `~/Library/Application Support/TabSort`
/// - **Windows**: `%APPDATA%/TabSort`
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    default_config_dir()
}

#[cfg(target_os = "linux")]
fn default_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("tabsort"),
        _ => home_dir().join(".config").join("tabsort"),
    }
}

#[cfg(target_os = "macos")]
fn default_config_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("TabSort")
}

#[cfg(target_os = "windows")]
fn default_config_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("TabSort")
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn default_config_dir() -> PathBuf {
    home_dir().join(".tabsort")
}

#[cfg(not(target_os = "windows"))]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}
