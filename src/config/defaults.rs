use std::ops::RangeInclusive;

pub const DEFAULT_CONFIG_PATH: &str = ".bios_config.json";
pub const DEFAULT_AUDIO_DIR: &str = "audio_files";
pub const DEFAULT_PHONE_SYSTEMS_DIR: &str = "./phone_systems";

pub const DEFAULT_MENU_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXTENSION_TIMEOUT_SECS: f64 = 3.0;
pub const DEFAULT_MAX_TIMEOUT_RETRIES: u32 = 2;
pub const DEFAULT_KEY_REPEAT_MS: u64 = 250;

pub const DEFAULT_ENTER_HOLD_SECS: f64 = 3.0;
pub const DEFAULT_EXIT_HOLD_SECS: f64 = 5.0;
/// Longest hold gesture the bootloader record may ask for.
pub const MAX_HOLD_SECS: f64 = 600.0;

pub(super) const MENU_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=600;
pub(super) const EXTENSION_TIMEOUT_RANGE: RangeInclusive<f64> = 0.5..=60.0;
pub(super) const MAX_TIMEOUT_RETRIES_LIMIT: u32 = 10;
pub(super) const MAX_INVALID_INPUTS_RANGE: RangeInclusive<u32> = 1..=50;
pub(super) const KEY_REPEAT_RANGE: RangeInclusive<u64> = 50..=2000;

/// Scan paths written into a fresh bootloader config.
pub fn default_scan_paths() -> Vec<String> {
    vec![
        crate::registry::BUILTIN_SCAN_PATH.to_string(),
        DEFAULT_PHONE_SYSTEMS_DIR.to_string(),
    ]
}
