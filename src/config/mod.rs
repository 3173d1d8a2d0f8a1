//! Command-line options and the persisted bootloader record.

mod bios;
mod defaults;
mod validation;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub use bios::{BootloaderConfig, ConfigStore};
pub use defaults::{
    default_scan_paths, DEFAULT_AUDIO_DIR, DEFAULT_CONFIG_PATH, DEFAULT_ENTER_HOLD_SECS,
    DEFAULT_EXIT_HOLD_SECS, DEFAULT_EXTENSION_TIMEOUT_SECS, DEFAULT_KEY_REPEAT_MS,
    DEFAULT_MAX_TIMEOUT_RETRIES, DEFAULT_MENU_TIMEOUT_SECS, DEFAULT_PHONE_SYSTEMS_DIR, MAX_HOLD_SECS,
};

/// CLI options for the payphone appliance.
#[derive(Debug, Parser, Clone)]
#[command(about = "Payphone voice menu engine", author, version)]
pub struct AppConfig {
    /// Bootloader config file (created with defaults when missing)
    #[arg(long, env = "PAYPHONE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Directory holding prompt audio clips
    #[arg(long = "audio-dir", env = "AUDIO_DIR", default_value = DEFAULT_AUDIO_DIR)]
    pub audio_dir: PathBuf,

    /// Event source: a file or serial device, or `-` for stdin
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Run one phone system directly, bypassing the bootloader
    #[arg(long = "system", env = "PAYPHONE_LEGACY_MODE", value_name = "ID")]
    pub system: Option<String>,

    /// Print discovered phone systems and exit
    #[arg(long = "list-systems", default_value_t = false)]
    pub list_systems: bool,

    /// Log prompts instead of playing them
    #[arg(long = "no-audio", default_value_t = false)]
    pub no_audio: bool,

    /// Preferred audio output device name
    #[arg(long = "output-device")]
    pub output_device: Option<String>,

    /// Print detected audio output devices and exit
    #[arg(long = "list-output-devices", default_value_t = false)]
    pub list_output_devices: bool,

    /// Seconds to wait for a key before replaying a menu prompt
    #[arg(long = "menu-timeout-secs", default_value_t = DEFAULT_MENU_TIMEOUT_SECS)]
    pub menu_timeout_secs: u64,

    /// Seconds of inactivity after the last extension digit before it is submitted
    #[arg(
        long = "extension-timeout-secs",
        default_value_t = DEFAULT_EXTENSION_TIMEOUT_SECS
    )]
    pub extension_timeout_secs: f64,

    /// Prompt replays on timeout before falling back
    #[arg(
        long = "max-timeout-retries",
        default_value_t = DEFAULT_MAX_TIMEOUT_RETRIES
    )]
    pub max_timeout_retries: u32,

    /// Invalid entries on one menu before falling back (unlimited when unset)
    #[arg(long = "max-invalid-inputs")]
    pub max_invalid_inputs: Option<u32>,

    /// Longest gap between repeated key events that still counts as a held key (ms)
    #[arg(long = "key-repeat-ms", default_value_t = DEFAULT_KEY_REPEAT_MS)]
    pub key_repeat_ms: u64,

    /// Write JSON trace logs to a file
    #[arg(long = "logs", env = "PAYPHONE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all logging (overrides --logs)
    #[arg(long = "no-logs", env = "PAYPHONE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Minimum level for stderr logging
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
