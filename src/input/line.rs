//! Text line protocol spoken by the keypad/hook front end.
//!
//! ```text
//! KEY:5       digit pressed (repeated while held)
//! KEY:*       star pressed
//! HOOK:OFF    handset lifted
//! HOOK:ON     handset replaced (hang up)
//! READY       link banner, ignored
//! ```

use super::event::{HookState, InputEvent};
use crate::menu::Key;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("unknown key value '{0}'")]
    UnknownKey(String),
    #[error("unknown hook value '{0}'")]
    UnknownHook(String),
    #[error("unrecognized line '{0}'")]
    Unrecognized(String),
}

/// Decode one line. `Ok(None)` means the line carries no event (banner, blank).
pub fn parse_line(line: &str) -> Result<Option<InputEvent>, LineError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("READY") {
        return Ok(None);
    }
    let Some((tag, value)) = trimmed.split_once(':') else {
        return Err(LineError::Unrecognized(trimmed.to_string()));
    };
    let value = value.trim();
    match tag.trim().to_ascii_uppercase().as_str() {
        "KEY" => {
            let mut chars = value.chars();
            match (chars.next().and_then(Key::from_char), chars.next()) {
                (Some(key), None) => Ok(Some(InputEvent::Key(key))),
                _ => Err(LineError::UnknownKey(value.to_string())),
            }
        }
        "HOOK" => match value.to_ascii_uppercase().as_str() {
            "ON" => Ok(Some(InputEvent::Hook(HookState::OnHook))),
            "OFF" => Ok(Some(InputEvent::Hook(HookState::OffHook))),
            _ => Err(LineError::UnknownHook(value.to_string())),
        },
        _ => Err(LineError::Unrecognized(trimmed.to_string())),
    }
}

/// Encode an event back into its wire form.
pub fn format_event(event: InputEvent) -> String {
    match event {
        InputEvent::Key(key) => format!("KEY:{key}"),
        InputEvent::Hook(HookState::OnHook) => "HOOK:ON".to_string(),
        InputEvent::Hook(HookState::OffHook) => "HOOK:OFF".to_string(),
    }
}
