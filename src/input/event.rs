use crate::menu::Key;

/// Position of the handset on the hook switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    /// Handset resting on the cradle (call over).
    OnHook,
    /// Handset lifted.
    OffHook,
}

/// Debounced hardware event delivered to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Hook(HookState),
}

impl InputEvent {
    pub fn is_hang_up(self) -> bool {
        matches!(self, InputEvent::Hook(HookState::OnHook))
    }
}

/// Drop key presses that were queued ahead of a hang-up.
///
/// Keys typed before the last `OnHook` in `batch` belong to a call that has
/// already ended, so they must not reach the next session. Hook events keep
/// their order.
pub fn discard_keys_before_hang_up(batch: Vec<InputEvent>) -> Vec<InputEvent> {
    let Some(last_hang_up) = batch.iter().rposition(|event| event.is_hang_up()) else {
        return batch;
    };
    batch
        .into_iter()
        .enumerate()
        .filter(|(idx, event)| *idx >= last_hang_up || matches!(event, InputEvent::Hook(_)))
        .map(|(_, event)| event)
        .collect()
}
