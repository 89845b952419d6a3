// User settings
// Loaded from ~/.config/leavesync/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Reconciliation
    /// Recon config (TOML) used when `--config` is not given.
    #[serde(rename = "recon.defaultConfig")]
    pub default_config: Option<String>,

    /// Allow-list spreadsheet used when `--allow-list` is not given.
    #[serde(rename = "recon.allowList")]
    pub allow_list: Option<String>,

    #[serde(rename = "recon.prefill")]
    pub prefill: bool,

    // Export
    /// Directory relative export paths are resolved against.
    #[serde(rename = "export.directory")]
    pub export_directory: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_config: None,
            allow_list: None,
            prefill: true,
            export_directory: None,
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Reconciliation
    // Paths may be absolute or relative to the working directory
    "recon.defaultConfig": null,
    "recon.allowList": null,
    "recon.prefill": true,

    // Export
    "export.directory": null
}
"#;

/// Drop `//` comment lines so the file stays plain JSON.
fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file();
            return settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Parse a settings file. Comment lines are tolerated, unknown keys ignored.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
        Self::parse(&contents).map_err(|e| format!("Error parsing {}: {}", path.display(), e))
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        serde_json::from_str(&strip_comments(contents)).map_err(|e| e.to_string())
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self) {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::debug!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(&path, DEFAULT_FILE) {
            log::debug!("Error writing default settings.json: {}", e);
        }
    }

    /// Resolve an export file name against `export.directory`.
    /// Absolute paths and unset directories leave `file` unchanged.
    pub fn export_path(&self, file: &Path) -> PathBuf {
        match &self.export_directory {
            Some(dir) if file.is_relative() && !dir.trim().is_empty() => Path::new(dir).join(file),
            _ => file.to_path_buf(),
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_parses_to_defaults() {
        assert_eq!(Settings::parse(DEFAULT_FILE).unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let s = Settings::parse(
            r#"{
    // only the allow-list
    "recon.allowList": "/data/allow.xlsx",
    "ui.somethingElse": 3
}"#,
        )
        .unwrap();
        assert_eq!(s.allow_list.as_deref(), Some("/data/allow.xlsx"));
        assert!(s.prefill);
        assert!(s.default_config.is_none());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(Settings::parse("{ \"recon.prefill\": maybe }").is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            prefill: false,
            export_directory: Some("/tmp/out".into()),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn export_path_resolution() {
        let mut s = Settings::default();
        assert_eq!(s.export_path(Path::new("edits.xlsx")), PathBuf::from("edits.xlsx"));
        s.export_directory = Some("/reports".into());
        assert_eq!(s.export_path(Path::new("edits.xlsx")), PathBuf::from("/reports/edits.xlsx"));
        assert_eq!(s.export_path(Path::new("/abs/edits.xlsx")), PathBuf::from("/abs/edits.xlsx"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = Settings::load_from(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(err.contains("/nonexistent/settings.json"));
    }
}
