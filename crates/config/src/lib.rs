// Configuration loading

pub mod settings;

pub use settings::Settings;

use std::path::PathBuf;

/// Per-user configuration directory (`<config_dir>/leavesync`).
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leavesync")
}
