//! Caller session state machine.
//!
//! [`NavigationEngine`] walks a [`MenuTree`](crate::menu::MenuTree) in
//! response to key presses, hook changes, and timer expiry. It plays prompts
//! through an [`AudioPort`](crate::audio::AudioPort), collects multi-digit
//! extensions on nodes that ask for them, and reports when the session ends.

mod extension;
mod navigator;
mod policy;
mod session;
#[cfg(test)]
mod tests;

pub use extension::{push_key, resolve_buffer, Collect};
pub use navigator::NavigationEngine;
pub use policy::{EnginePolicy, SystemPrompts, DEFAULT_MAX_TIMEOUT_RETRIES};
pub use session::{EndReason, SessionState, Step};
