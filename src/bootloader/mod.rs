//! Meta phone system that chooses which registered system answers the line.
//!
//! Lifting the handset and keeping it off hook for `enter_hold_seconds`
//! opens the BIOS menu; pressing any key earlier launches the last selected
//! system. While a system runs, holding `*` for `exit_hold_seconds` returns
//! to the BIOS menu. Everything else passes straight through to the running
//! system's [`NavigationEngine`].

mod hold;
mod legacy;
mod menu;

pub use hold::{HoldTimer, StarHold, StarSignal};
pub use legacy::DirectSystem;
pub use menu::{BiosMenu, BIOS_MAIN_CLIP, BIOS_MENU_TIMEOUT, NO_SYSTEMS_CLIP};

use crate::audio::{AudioPort, DIAL_TONE_CLIP};
use crate::config::{BootloaderConfig, ConfigStore};
use crate::engine::{EndReason, EnginePolicy, NavigationEngine, Step};
use crate::input::{HookState, InputEvent};
use crate::menu::Key;
use crate::registry::SystemRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootState {
    Idle,
    HoldingForBios,
    ShowingBiosMenu,
    RunningSystem(String),
}

/// Anything the event loop can drive.
pub trait Appliance {
    fn handle(&mut self, event: InputEvent, now: Instant);
    fn poll(&mut self, now: Instant);
    fn next_deadline(&self) -> Option<Instant>;
}

pub struct BootloaderController {
    registry: Arc<SystemRegistry>,
    audio: Arc<dyn AudioPort>,
    store: ConfigStore,
    config: BootloaderConfig,
    policy: EnginePolicy,
    state: BootState,
    enter_hold: HoldTimer,
    star: StarHold,
    session: Option<NavigationEngine>,
    bios: Option<BiosMenu>,
}

impl BootloaderController {
    pub fn new(
        registry: Arc<SystemRegistry>,
        audio: Arc<dyn AudioPort>,
        store: ConfigStore,
        config: BootloaderConfig,
        policy: EnginePolicy,
        key_repeat: Duration,
    ) -> Self {
        Self {
            registry,
            audio,
            store,
            config,
            policy,
            state: BootState::Idle,
            enter_hold: HoldTimer::default(),
            star: StarHold::new(key_repeat),
            session: None,
            bios: None,
        }
    }

    pub fn state(&self) -> &BootState {
        &self.state
    }

    pub fn config(&self) -> &BootloaderConfig {
        &self.config
    }

    /// Session of the running system or of the BIOS menu.
    pub fn session(&self) -> Option<&NavigationEngine> {
        self.session.as_ref()
    }

    pub fn active_system(&self) -> Option<&str> {
        match &self.state {
            BootState::RunningSystem(id) => Some(id),
            _ => None,
        }
    }

    fn pick_up(&mut self, now: Instant) {
        if self.state != BootState::Idle {
            debug!("hook-off while already off hook, ignoring");
            return;
        }
        self.play(DIAL_TONE_CLIP);
        if !self.config.auto_launch {
            info!("auto launch disabled, entering BIOS menu");
            self.show_bios(now);
            return;
        }
        self.enter_hold.arm(now);
        self.state = BootState::HoldingForBios;
    }

    fn hang_up(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.hang_up();
        }
        self.session = None;
        self.bios = None;
        self.enter_hold.cancel();
        self.star.reset();
        self.audio.stop();
        if self.state != BootState::Idle {
            info!("handset on hook, bootloader idle");
        }
        self.state = BootState::Idle;
    }

    fn key(&mut self, key: Key, now: Instant) {
        match self.state {
            BootState::Idle => debug!(key = %key, "key while on hook, ignoring"),
            BootState::HoldingForBios => {
                // The key only signals intent; it never reaches the system.
                self.enter_hold.cancel();
                debug!(key = %key, "key during enter hold, launching last system");
                self.launch_last(now);
            }
            BootState::ShowingBiosMenu => self.bios_key(key, now),
            BootState::RunningSystem(_) => self.running_key(key, now),
        }
    }

    fn running_key(&mut self, key: Key, now: Instant) {
        if key == Key::Star {
            let signal = self.star.press(self.config.exit_hold(), now);
            self.on_star_signal(signal, now);
            return;
        }
        if self.star.release() == StarSignal::ShortPress {
            self.forward(Key::Star, now);
        }
        self.forward(key, now);
    }

    fn on_star_signal(&mut self, signal: StarSignal, now: Instant) {
        match signal {
            StarSignal::Holding => {}
            StarSignal::ShortPress => self.forward(Key::Star, now),
            StarSignal::LongPress => self.exit_to_bios(now),
        }
    }

    fn bios_key(&mut self, key: Key, now: Instant) {
        // Repeats of the `*` hold that opened this menu are not selections.
        if key == Key::Star && self.star.continues(now) {
            return;
        }
        self.star.reset();
        let Some(session) = self.session.as_mut() else {
            self.audio.stop();
            self.play(NO_SYSTEMS_CLIP);
            return;
        };
        let step = session.handle_key(key, now);
        self.after_bios_step(step, now);
    }

    fn after_bios_step(&mut self, step: Step, now: Instant) {
        match step {
            Step::Continue => {}
            Step::Ended(EndReason::LeafReached(node)) => {
                let selected = self
                    .bios
                    .as_ref()
                    .and_then(|menu| menu.system_for(node))
                    .map(str::to_string);
                match selected {
                    Some(id) => self.select(&id, now),
                    None => self.show_bios(now),
                }
            }
            Step::Ended(EndReason::TimedOut) => {
                debug!("BIOS menu timed out, restarting it");
                self.show_bios(now);
            }
            Step::Ended(reason) => debug!(?reason, "BIOS session ended"),
        }
    }

    fn forward(&mut self, key: Key, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Step::Ended(reason) = session.handle_key(key, now) {
            debug!(?reason, "system session over, waiting for hang-up");
        }
    }

    fn select(&mut self, id: &str, now: Instant) {
        let offered = self
            .bios
            .as_ref()
            .map(BiosMenu::system_ids)
            .unwrap_or_default();
        self.config.record_selection(id, offered);
        if let Err(err) = self.store.save(&self.config) {
            warn!(error = %err, "failed to persist system selection");
        }
        info!(system_id = id, "system selected from BIOS menu");
        self.launch(id, now, true);
    }

    fn launch_last(&mut self, now: Instant) {
        let last = self
            .config
            .last_system_id
            .clone()
            .filter(|id| self.registry.contains(id));
        match last {
            Some(id) => self.launch(&id, now, false),
            None => {
                info!("no launchable last system, entering BIOS menu");
                self.show_bios(now);
            }
        }
    }

    fn launch(&mut self, id: &str, now: Instant, after_current: bool) {
        let tree = match self.registry.get(id).map(|system| Arc::clone(system.tree())) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(error = %err, "cannot launch system");
                self.show_bios(now);
                return;
            }
        };
        let audio = Arc::clone(&self.audio);
        let policy = self.policy.clone();
        let session = if after_current {
            NavigationEngine::start_after_current(tree, audio, policy, now)
        } else {
            NavigationEngine::start(tree, audio, policy, now)
        };
        info!(system_id = id, "launching phone system");
        self.bios = None;
        self.star.reset();
        self.session = Some(session);
        self.state = BootState::RunningSystem(id.to_string());
    }

    fn exit_to_bios(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.preempt();
        }
        info!(
            system_id = self.active_system().unwrap_or_default(),
            "exit hold reached, entering BIOS menu"
        );
        self.show_bios(now);
    }

    fn show_bios(&mut self, now: Instant) {
        self.session = None;
        self.bios = None;
        self.state = BootState::ShowingBiosMenu;
        match BiosMenu::build(&self.registry) {
            Ok(Some(menu)) => {
                let session = NavigationEngine::start(
                    Arc::clone(menu.tree()),
                    Arc::clone(&self.audio),
                    self.policy.clone(),
                    now,
                );
                self.session = Some(session);
                self.bios = Some(menu);
            }
            Ok(None) => {
                warn!("no phone systems discovered");
                self.play(NO_SYSTEMS_CLIP);
            }
            Err(err) => {
                error!(error = %err, "failed to build BIOS menu");
                self.play(NO_SYSTEMS_CLIP);
            }
        }
    }

    fn play(&self, clip: &str) {
        if let Err(err) = self.audio.play(clip) {
            warn!(clip, error = %err, "prompt unavailable");
        }
    }
}

impl Appliance for BootloaderController {
    fn handle(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::Hook(HookState::OnHook) => self.hang_up(),
            InputEvent::Hook(HookState::OffHook) => self.pick_up(now),
            InputEvent::Key(key) => self.key(key, now),
        }
    }

    fn poll(&mut self, now: Instant) {
        match self.state {
            BootState::Idle => {}
            BootState::HoldingForBios => {
                if self.enter_hold.elapsed(self.config.enter_hold(), now) {
                    self.enter_hold.cancel();
                    info!("enter hold reached, entering BIOS menu");
                    self.show_bios(now);
                }
            }
            BootState::ShowingBiosMenu => {
                if let Some(session) = self.session.as_mut() {
                    let step = session.poll(now);
                    self.after_bios_step(step, now);
                }
            }
            BootState::RunningSystem(_) => {
                let signal = self.star.poll(self.config.exit_hold(), now);
                self.on_star_signal(signal, now);
                if let (BootState::RunningSystem(_), Some(session)) =
                    (&self.state, self.session.as_mut())
                {
                    session.poll(now);
                }
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        let session = self.session.as_ref().and_then(NavigationEngine::next_deadline);
        match self.state {
            BootState::Idle => None,
            BootState::HoldingForBios => self.enter_hold.deadline(self.config.enter_hold()),
            BootState::ShowingBiosMenu => session,
            BootState::RunningSystem(_) => {
                let star = self.star.deadline(self.config.exit_hold());
                match (session, star) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                }
            }
        }
    }
}
