use super::defaults::{
    EXTENSION_TIMEOUT_RANGE, KEY_REPEAT_RANGE, MAX_INVALID_INPUTS_RANGE,
    MAX_TIMEOUT_RETRIES_LIMIT, MENU_TIMEOUT_RANGE,
};
use super::AppConfig;
use crate::engine::{EnginePolicy, SystemPrompts};
use crate::menu::TreeDefaults;
use anyhow::{bail, Result};
use clap::Parser;
use std::time::Duration;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize optional strings.
    pub fn validate(&mut self) -> Result<()> {
        if !MENU_TIMEOUT_RANGE.contains(&self.menu_timeout_secs) {
            bail!(
                "--menu-timeout-secs must be between {} and {}, got {}",
                MENU_TIMEOUT_RANGE.start(),
                MENU_TIMEOUT_RANGE.end(),
                self.menu_timeout_secs
            );
        }
        if !EXTENSION_TIMEOUT_RANGE.contains(&self.extension_timeout_secs) {
            bail!(
                "--extension-timeout-secs must be between {} and {}, got {}",
                EXTENSION_TIMEOUT_RANGE.start(),
                EXTENSION_TIMEOUT_RANGE.end(),
                self.extension_timeout_secs
            );
        }
        if self.max_timeout_retries > MAX_TIMEOUT_RETRIES_LIMIT {
            bail!(
                "--max-timeout-retries must be between 0 and {MAX_TIMEOUT_RETRIES_LIMIT}, got {}",
                self.max_timeout_retries
            );
        }
        if let Some(limit) = self.max_invalid_inputs {
            if !MAX_INVALID_INPUTS_RANGE.contains(&limit) {
                bail!(
                    "--max-invalid-inputs must be between {} and {}, got {limit}",
                    MAX_INVALID_INPUTS_RANGE.start(),
                    MAX_INVALID_INPUTS_RANGE.end()
                );
            }
        }
        if !KEY_REPEAT_RANGE.contains(&self.key_repeat_ms) {
            bail!(
                "--key-repeat-ms must be between {} and {} ms, got {}",
                KEY_REPEAT_RANGE.start(),
                KEY_REPEAT_RANGE.end(),
                self.key_repeat_ms
            );
        }
        if self.input.trim().is_empty() {
            bail!("--input must be a path or '-'");
        }

        self.system = normalize_optional(self.system.take());
        self.output_device = normalize_optional(self.output_device.take());
        if let Some(id) = &self.system {
            if id.contains(['/', '\\']) {
                bail!("--system must be a phone system id, got '{id}'");
            }
        }
        Ok(())
    }

    pub fn tree_defaults(&self) -> TreeDefaults {
        TreeDefaults {
            node_timeout: Duration::from_secs(self.menu_timeout_secs),
            extension_timeout: Duration::from_secs_f64(self.extension_timeout_secs),
        }
    }

    pub fn engine_policy(&self) -> EnginePolicy {
        EnginePolicy {
            max_timeout_retries: self.max_timeout_retries,
            max_invalid_inputs: self.max_invalid_inputs,
            prompts: SystemPrompts::default(),
        }
    }

    pub fn key_repeat(&self) -> Duration {
        Duration::from_millis(self.key_repeat_ms)
    }

    pub fn reads_stdin(&self) -> bool {
        self.input.trim() == "-"
    }
}

/// Treat blank values (e.g. an exported but empty env var) as unset.
fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
