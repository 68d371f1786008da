//! Configuration file management
//!
//! This module handles loading and saving `config.toml` (typing speed,
//! error rate, urgent mode, control hotkeys) and provides a hot-reloading
//! view of it for settings that may change while the process runs.

use crate::config;
use crate::constants::{
    CONFIG_FILE_PERMISSIONS, CONFIG_PERMISSION_MASK_GROUP_OTHER, DEFAULT_PAUSE_KEY,
    DEFAULT_SPEED_KEY, DEFAULT_STOP_KEY, ERROR_RATE_DEFAULT, WPM_LIMIT, WPM_MAX_DEFAULT,
    WPM_MIN_DEFAULT,
};
use crate::typing::TypingSettings;
use crate::utils::keycode::parse_hotkey_code;
use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Settings read once per typing session
pub trait RuntimeSettings: Send + Sync {
    /// Full speed, no typos, no pauses
    fn urgent_mode(&self) -> bool;
}

/// Application configuration stored in config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Lower bound of the per-word WPM draw (default: 30)
    pub wpm_min: u32,
    /// Upper bound of the per-word WPM draw (default: 100)
    pub wpm_max: u32,
    /// Typo probability per word (default: 0.05)
    pub error_rate: f64,
    /// Type at full speed without mistakes (default: false)
    pub urgent_mode: bool,
    /// Toggle-pause key, pressed with Ctrl+Cmd+Shift (default: P)
    pub pause_hotkey: String,
    /// Emergency-stop key (default: X)
    pub stop_hotkey: String,
    /// Speed-up key (default: Right)
    pub speed_hotkey: String,
    /// Instance lock location (default: runtime directory)
    pub lock_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wpm_min: WPM_MIN_DEFAULT,
            wpm_max: WPM_MAX_DEFAULT,
            error_rate: ERROR_RATE_DEFAULT,
            urgent_mode: false,
            pause_hotkey: DEFAULT_PAUSE_KEY.to_string(),
            stop_hotkey: DEFAULT_STOP_KEY.to_string(),
            speed_hotkey: DEFAULT_SPEED_KEY.to_string(),
            lock_file: None,
        }
    }
}

impl Config {
    /// Get the standard config file path
    ///
    /// - macOS: `~/Library/Application Support/handson/config.toml`
    /// - Linux: `~/.config/handson/config.toml`
    /// - Windows: `%APPDATA%\handson\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Failed to determine config directory"))?
            .join("handson");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from standard location
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load config from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Config file doesn't exist
    /// - Failed to read file
    /// - TOML parsing fails
    /// - Values fail validation
    ///
    /// Permissions readable by group or others only produce a warning.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Configuration file not found at: {}\n\nRun 'handson setup' to create it.",
                path.display()
            );
        }

        #[cfg(unix)]
        {
            let metadata = fs::metadata(path).context("Failed to read config file metadata")?;
            let mode = metadata.permissions().mode();
            if mode & CONFIG_PERMISSION_MASK_GROUP_OTHER != 0 {
                warn!(
                    "Config file has permissive permissions: {:o}. Should be 600 (user read/write only).",
                    mode & 0o777
                );
            }
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path`, or the defaults when no file exists there
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_path(path)
        } else {
            debug!("No config file at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to the standard location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Save config to `path`
    ///
    /// Creates the parent directory if needed and sets permissions to 600.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        #[cfg(unix)]
        {
            let mut permissions = fs::metadata(path)?.permissions();
            permissions.set_mode(CONFIG_FILE_PERMISSIONS);
            fs::set_permissions(path, permissions)
                .context("Failed to set config file permissions")?;
        }

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Check ranges and hotkeys
    pub fn validate(&self) -> Result<()> {
        if self.wpm_min == 0 || self.wpm_max > WPM_LIMIT {
            bail!(
                "WPM range {}-{} must lie within 1-{}",
                self.wpm_min,
                self.wpm_max,
                WPM_LIMIT
            );
        }
        if self.wpm_min > self.wpm_max {
            bail!(
                "wpm_min ({}) must not exceed wpm_max ({})",
                self.wpm_min,
                self.wpm_max
            );
        }
        if !(0.0..=1.0).contains(&self.error_rate) {
            bail!("error_rate must be between 0.0 and 1.0 (got {})", self.error_rate);
        }

        let keys = [
            ("pause_hotkey", &self.pause_hotkey),
            ("stop_hotkey", &self.stop_hotkey),
            ("speed_hotkey", &self.speed_hotkey),
        ];
        let mut codes = Vec::with_capacity(keys.len());
        for (name, key) in keys {
            let code = parse_hotkey_code(key)
                .with_context(|| format!("Invalid {}: '{}'", name, key))?;
            if let Some((other, _)) = codes.iter().find(|(_, c)| *c == code) {
                bail!(
                    "Hotkeys must be different ({} and {} both set to '{}')",
                    other,
                    name,
                    key
                );
            }
            codes.push((name, code));
        }
        Ok(())
    }

    pub fn typing_settings(&self) -> TypingSettings {
        TypingSettings {
            wpm_min: self.wpm_min as f64,
            wpm_max: self.wpm_max as f64,
            error_rate: self.error_rate,
        }
    }
}

impl RuntimeSettings for Config {
    fn urgent_mode(&self) -> bool {
        self.urgent_mode
    }
}

struct Snapshot {
    config: Config,
    modified: Option<SystemTime>,
}

/// Config view that re-reads the file whenever its mtime changes.
///
/// Environment overrides are applied on top of every reload. A file that
/// fails to load keeps the previous values.
pub struct RuntimeConfig {
    path: PathBuf,
    snapshot: RwLock<Snapshot>,
}

impl RuntimeConfig {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut config = Config::load_or_default(&path)?;
        config::apply_env_overrides(&mut config);
        let modified = modified_time(&path);
        Ok(Self {
            path,
            snapshot: RwLock::new(Snapshot { config, modified }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings, reloading first if the file changed
    pub fn current(&self) -> Config {
        let modified = modified_time(&self.path);
        {
            let snapshot = self.snapshot.read();
            if snapshot.modified == modified {
                return snapshot.config.clone();
            }
        }

        let mut snapshot = self.snapshot.write();
        if snapshot.modified != modified {
            match Config::load_or_default(&self.path) {
                Ok(mut config) => {
                    config::apply_env_overrides(&mut config);
                    info!("Configuration reloaded from: {}", self.path.display());
                    snapshot.config = config;
                }
                Err(e) => warn!("Keeping previous configuration: {:#}", e),
            }
            snapshot.modified = modified;
        }
        snapshot.config.clone()
    }
}

impl RuntimeSettings for RuntimeConfig {
    fn urgent_mode(&self) -> bool {
        self.current().urgent_mode
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn bump_mtime(path: &Path, secs_ahead: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(secs_ahead))
            .unwrap();
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wpm_min, 30);
        assert_eq!(config.wpm_max, 100);
        assert!(!config.urgent_mode);
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let original = Config {
            wpm_min: 45,
            wpm_max: 80,
            error_rate: 0.02,
            urgent_mode: true,
            pause_hotkey: "B".to_string(),
            ..Config::default()
        };
        original.save_to_path(&path).expect("Failed to save config");

        let loaded = Config::load_from_path(&path).expect("Failed to load config");
        assert_eq!(original, loaded);
    }

    #[test]
    #[cfg(unix)]
    fn test_config_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save_to_path(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "Permissions should be 600");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "wpm_max = 60\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.wpm_max, 60);
        assert_eq!(config.wpm_min, WPM_MIN_DEFAULT);
        assert_eq!(config.stop_hotkey, DEFAULT_STOP_KEY);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from_path(&dir.path().join("absent.toml"));

        let error_msg = format!("{:#}", result.unwrap_err());
        assert!(error_msg.contains("not found") && error_msg.contains("setup"));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let inverted = Config {
            wpm_min: 90,
            wpm_max: 40,
            ..Config::default()
        };
        assert!(format!("{}", inverted.validate().unwrap_err()).contains("must not exceed"));

        let zero = Config {
            wpm_min: 0,
            ..Config::default()
        };
        assert!(zero.validate().is_err());

        let too_fast = Config {
            wpm_max: WPM_LIMIT + 1,
            ..Config::default()
        };
        assert!(too_fast.validate().is_err());

        let bad_rate = Config {
            error_rate: 1.5,
            ..Config::default()
        };
        assert!(bad_rate.validate().is_err());
    }

    #[test]
    fn test_duplicate_hotkeys_rejected_case_insensitive() {
        let config = Config {
            pause_hotkey: "m".to_string(),
            stop_hotkey: "M".to_string(),
            ..Config::default()
        };
        let error_msg = format!("{}", config.validate().unwrap_err());
        assert!(
            error_msg.contains("must be different"),
            "Error message should mention duplicates: {}",
            error_msg
        );
    }

    #[test]
    fn test_invalid_hotkey_in_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "stop_hotkey = \"F13\"\n").unwrap();

        let error_msg = format!("{:#}", Config::load_from_path(&path).unwrap_err());
        assert!(
            error_msg.contains("Invalid stop_hotkey"),
            "Error should mention invalid hotkey: {}",
            error_msg
        );
    }

    #[test]
    fn test_typing_settings_from_config() {
        let settings = Config::default().typing_settings();
        assert_eq!(settings.wpm_min, 30.0);
        assert_eq!(settings.wpm_max, 100.0);
        assert_eq!(settings.error_rate, ERROR_RATE_DEFAULT);
    }

    #[test]
    fn test_runtime_config_reloads_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "urgent_mode = false\n").unwrap();

        let runtime = RuntimeConfig::open(&path).unwrap();
        let before = runtime.current().urgent_mode;

        fs::write(&path, "urgent_mode = true\n").unwrap();
        bump_mtime(&path, 5);

        // Only changes from the file are observed; an env override, if one
        // is set in the outer environment, wins both times
        match config::parse_urgent_mode() {
            Some(forced) => assert_eq!(runtime.current().urgent_mode, forced),
            None => {
                assert!(!before);
                assert!(runtime.urgent_mode());
            }
        }
    }

    #[test]
    fn test_runtime_config_keeps_previous_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "error_rate = 0.01\n").unwrap();

        let runtime = RuntimeConfig::open(&path).unwrap();
        let before = runtime.current();

        fs::write(&path, "error_rate = \"lots\"\n").unwrap();
        bump_mtime(&path, 5);
        assert_eq!(runtime.current(), before);
    }
}
