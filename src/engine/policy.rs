/// Clips the engine plays on its own behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompts {
    pub invalid_option: String,
    pub invalid_extension: String,
    pub timeout: String,
}

impl Default for SystemPrompts {
    fn default() -> Self {
        Self {
            invalid_option: "prompts/invalid_option".to_string(),
            invalid_extension: "prompts/invalid_extension".to_string(),
            timeout: "prompts/timeout".to_string(),
        }
    }
}

/// Retry and error ceilings applied to every node of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePolicy {
    /// Prompt replays allowed on timeout before falling back.
    pub max_timeout_retries: u32,
    /// Invalid entries allowed on one node before falling back. `None` = unlimited.
    pub max_invalid_inputs: Option<u32>,
    pub prompts: SystemPrompts,
}

pub const DEFAULT_MAX_TIMEOUT_RETRIES: u32 = 2;

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            max_timeout_retries: DEFAULT_MAX_TIMEOUT_RETRIES,
            max_invalid_inputs: None,
            prompts: SystemPrompts::default(),
        }
    }
}
