//! Application settings — TOML-based, platform-aware paths.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Header comment prepended to saved settings files.
const SETTINGS_HEADER: &str =
    "# Camguard settings — changes made outside the app may be overwritten.\n\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Re-scan the device list periodically.
    #[serde(default)]
    pub auto_refresh: bool,

    /// Seconds between automatic re-scans.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Include Image-class and name-matched imaging devices, not just the
    /// Camera class.
    #[serde(default)]
    pub show_all_devices: bool,

    /// Announce state changes (consumed by the hosting front-end).
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            auto_refresh: false,
            refresh_interval_secs: default_refresh_interval(),
            show_all_devices: false,
            notifications_enabled: true,
        }
    }
}

impl Settings {
    /// Platform-specific settings directory.
    pub fn dir() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            dirs::config_dir().map(|p| p.join("Camguard"))
        }
        #[cfg(not(windows))]
        {
            dirs::config_dir().map(|p| p.join("camguard"))
        }
    }

    /// Full path to the settings file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("settings.toml"))
    }

    /// Refresh interval as a `Duration`, never below one second.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Load settings from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (settings, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        settings
    }

    /// Load from an arbitrary path, returning the settings and any parse
    /// warnings. A missing file yields defaults with no warning.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => (settings, vec![]),
                Err(e) => {
                    let warning = format!(
                        "settings parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load from the default path, returning settings and parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Save settings to an arbitrary path atomically (write to a temp
    /// file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{SETTINGS_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct
                // write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Save settings to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No settings directory",
            ));
        };
        self.save_to(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert!(!s.auto_refresh);
        assert_eq!(s.refresh_interval_secs, 5);
        assert!(!s.show_all_devices);
        assert!(s.notifications_enabled);
    }

    #[test]
    fn serialize_roundtrip() {
        let s = Settings {
            auto_refresh: true,
            refresh_interval_secs: 10,
            show_all_devices: true,
            notifications_enabled: false,
        };
        let toml_str = toml::to_string_pretty(&s).unwrap();
        let s2: Settings = toml::from_str(&toml_str).unwrap();
        assert!(s2.auto_refresh);
        assert_eq!(s2.refresh_interval_secs, 10);
        assert!(s2.show_all_devices);
        assert!(!s2.notifications_enabled);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let s: Settings = toml::from_str("auto_refresh = true").unwrap();
        assert!(s.auto_refresh);
        assert_eq!(s.refresh_interval_secs, 5);
        assert!(s.notifications_enabled);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let s: Settings = toml::from_str("").unwrap();
        assert!(!s.show_all_devices);
        assert!(s.notifications_enabled);
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let result: std::result::Result<Settings, _> =
            toml::from_str("auto_refresh = \"not a bool\"");
        assert!(result.is_err());
    }

    #[test]
    fn refresh_interval_floor_is_one_second() {
        let s = Settings {
            refresh_interval_secs: 0,
            ..Settings::default()
        };
        assert_eq!(s.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn settings_path_resolves() {
        assert!(Settings::dir().is_some());
        let path = Settings::path().unwrap();
        assert_eq!(path.file_name().unwrap(), "settings.toml");
    }

    #[test]
    fn save_to_load_from_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let s = Settings {
            auto_refresh: true,
            refresh_interval_secs: 7,
            show_all_devices: true,
            notifications_enabled: false,
        };
        s.save_to(&path).unwrap();

        let (loaded, warnings) = Settings::load_from(&path);
        assert!(warnings.is_empty());
        assert!(loaded.auto_refresh);
        assert_eq!(loaded.refresh_interval_secs, 7);
        assert!(loaded.show_all_devices);
        assert!(!loaded.notifications_enabled);
    }

    #[test]
    fn save_to_includes_header_and_cleans_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        Settings::default().save_to(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Camguard settings"));
        assert!(!dir.path().join("settings.toml.tmp").exists());
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (s, warnings) = Settings::load_from(&dir.path().join("nope.toml"));
        assert!(warnings.is_empty());
        assert!(!s.auto_refresh);
    }

    #[test]
    fn load_from_invalid_toml_warns_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is { not valid toml").unwrap();

        let (s, warnings) = Settings::load_from(&path);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("settings parse error"));
        assert_eq!(s.refresh_interval_secs, 5);
    }

    #[test]
    fn load_ignores_header_comment() {
        let toml_str = "# Camguard settings — changes made outside the app may be overwritten.\n\n\
                        auto_refresh = true\n";
        let s: Settings = toml::from_str(toml_str).unwrap();
        assert!(s.auto_refresh);
    }
}
