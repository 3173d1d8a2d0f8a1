use super::Appliance;
use crate::audio::{AudioPort, DIAL_TONE_CLIP};
use crate::engine::{EnginePolicy, NavigationEngine};
use crate::input::{HookState, InputEvent};
use crate::menu::MenuTree;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs one phone system on every pickup, with no bootloader gestures.
pub struct DirectSystem {
    id: String,
    tree: Arc<MenuTree>,
    audio: Arc<dyn AudioPort>,
    policy: EnginePolicy,
    session: Option<NavigationEngine>,
}

impl DirectSystem {
    pub fn new(
        id: impl Into<String>,
        tree: Arc<MenuTree>,
        audio: Arc<dyn AudioPort>,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            id: id.into(),
            tree,
            audio,
            policy,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&NavigationEngine> {
        self.session.as_ref()
    }
}

impl Appliance for DirectSystem {
    fn handle(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::Hook(HookState::OffHook) => {
                if self.session.is_some() {
                    debug!("hook-off while already off hook, ignoring");
                    return;
                }
                if let Err(err) = self.audio.play(DIAL_TONE_CLIP) {
                    warn!(clip = DIAL_TONE_CLIP, error = %err, "prompt unavailable");
                }
                info!(system_id = %self.id, "starting session");
                self.session = Some(NavigationEngine::start_after_current(
                    Arc::clone(&self.tree),
                    Arc::clone(&self.audio),
                    self.policy.clone(),
                    now,
                ));
            }
            InputEvent::Hook(HookState::OnHook) => {
                if let Some(mut session) = self.session.take() {
                    session.hang_up();
                }
            }
            InputEvent::Key(key) => match self.session.as_mut() {
                Some(session) => {
                    session.handle_key(key, now);
                }
                None => debug!(key = %key, "key while on hook, ignoring"),
            },
        }
    }

    fn poll(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.poll(now);
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.session.as_ref().and_then(NavigationEngine::next_deadline)
    }
}
