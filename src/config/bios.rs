use super::defaults::{
    default_scan_paths, DEFAULT_ENTER_HOLD_SECS, DEFAULT_EXIT_HOLD_SECS, MAX_HOLD_SECS,
};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Persisted bootloader record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootloaderConfig {
    pub last_system_id: Option<String>,
    pub auto_launch: bool,
    pub enter_hold_seconds: f64,
    pub exit_hold_seconds: f64,
    pub scan_paths: Vec<String>,
    /// Advisory cache of the ids offered in the last BIOS menu.
    pub available_systems: Vec<String>,
}

impl Default for BootloaderConfig {
    fn default() -> Self {
        Self {
            last_system_id: None,
            auto_launch: true,
            enter_hold_seconds: DEFAULT_ENTER_HOLD_SECS,
            exit_hold_seconds: DEFAULT_EXIT_HOLD_SECS,
            scan_paths: default_scan_paths(),
            available_systems: Vec::new(),
        }
    }
}

impl BootloaderConfig {
    /// Parse a stored document, falling back to defaults field by field.
    ///
    /// Unknown fields are ignored. A known field with the wrong type (or a
    /// hold duration outside `(0, MAX_HOLD_SECS]`) keeps its default.
    pub fn from_json_str(text: &str) -> Self {
        let mut config = Self::default();
        let object = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                warn!("bootloader config is not a JSON object, using defaults");
                return config;
            }
            Err(err) => {
                warn!(error = %err, "bootloader config unreadable, using defaults");
                return config;
            }
        };

        if let Some(value) = field::<Option<String>>(&object, &["last_system_id", "last_system"]) {
            config.last_system_id = value.filter(|id| !id.trim().is_empty());
        }
        if let Some(value) = field(&object, &["auto_launch"]) {
            config.auto_launch = value;
        }
        if let Some(value) = hold_seconds(&object, &["enter_hold_seconds", "bios_enter_hold_seconds"]) {
            config.enter_hold_seconds = value;
        }
        if let Some(value) = hold_seconds(
            &object,
            &["exit_hold_seconds", "bios_exit_long_press_seconds"],
        ) {
            config.exit_hold_seconds = value;
        }
        if let Some(value) = field(&object, &["scan_paths"]) {
            config.scan_paths = value;
        }
        if let Some(value) = field(&object, &["available_systems"]) {
            config.available_systems = value;
        }
        config
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize bootloader config")
    }

    pub fn enter_hold(&self) -> Duration {
        hold_duration(self.enter_hold_seconds, DEFAULT_ENTER_HOLD_SECS)
    }

    pub fn exit_hold(&self) -> Duration {
        hold_duration(self.exit_hold_seconds, DEFAULT_EXIT_HOLD_SECS)
    }

    /// Remember a completed system switch along with the ids that were on offer.
    pub fn record_selection(&mut self, system_id: &str, available: Vec<String>) {
        self.last_system_id = Some(system_id.to_string());
        self.available_systems = available;
    }
}

/// First present alias wins; a wrong type logs and yields `None`.
fn field<T: DeserializeOwned>(object: &Map<String, Value>, names: &[&str]) -> Option<T> {
    let (name, value) = names
        .iter()
        .find_map(|name| object.get(*name).map(|value| (*name, value)))?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(field = name, error = %err, "invalid bootloader config field, using default");
            None
        }
    }
}

fn valid_hold(secs: f64) -> bool {
    secs.is_finite() && secs > 0.0 && secs <= MAX_HOLD_SECS
}

fn hold_seconds(object: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    let value = field::<f64>(object, names)?;
    if valid_hold(value) {
        Some(value)
    } else {
        warn!(
            field = names[0],
            value,
            max = MAX_HOLD_SECS,
            "hold duration out of range, using default"
        );
        None
    }
}

/// Out-of-range values (the fields are public) fall back to `default`.
fn hold_duration(secs: f64, default: f64) -> Duration {
    let secs = if valid_hold(secs) { secs } else { default };
    Duration::from_secs_f64(secs)
}

/// Reads and writes the bootloader record at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. A missing file is created with defaults; any other
    /// problem is logged and answered with defaults.
    pub fn load(&self) -> BootloaderConfig {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                info!(path = %self.path.display(), "loaded bootloader config");
                BootloaderConfig::from_json_str(&text)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no bootloader config, creating default");
                let config = BootloaderConfig::default();
                if let Err(err) = self.save(&config) {
                    warn!(error = %err, "failed to write default bootloader config");
                }
                config
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cannot read bootloader config, using defaults");
                BootloaderConfig::default()
            }
        }
    }

    /// Write the record through a sibling temp file so readers never see a partial document.
    pub fn save(&self, config: &BootloaderConfig) -> Result<()> {
        let text = config.to_json_string()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, text).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        debug!(path = %self.path.display(), "saved bootloader config");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
