use super::extension::{push_key, resolve_buffer, Collect};
use super::policy::EnginePolicy;
use super::session::{EndReason, SessionState, Step};
use crate::audio::AudioPort;
use crate::input::{HookState, InputEvent};
use crate::menu::{ActionOutcome, Key, MenuTree, NodeId, Transition};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Drives one caller session through a [`MenuTree`].
///
/// The engine owns no clock. Every entry point takes `now`, and the caller
/// asks [`NavigationEngine::next_deadline`] when to call
/// [`NavigationEngine::poll`] next.
pub struct NavigationEngine {
    tree: Arc<MenuTree>,
    audio: Arc<dyn AudioPort>,
    policy: EnginePolicy,
    state: SessionState,
    deadline: Option<Instant>,
    retries: u32,
    invalid_inputs: u32,
    /// Queue the next prompt behind current audio instead of replacing it.
    queue_next: bool,
}

impl NavigationEngine {
    /// Start a session at the root. Constructing the engine is the hook-off.
    pub fn start(
        tree: Arc<MenuTree>,
        audio: Arc<dyn AudioPort>,
        policy: EnginePolicy,
        now: Instant,
    ) -> Self {
        Self::start_inner(tree, audio, policy, now, false)
    }

    /// Like [`NavigationEngine::start`], but the root prompt is queued behind
    /// whatever is already playing.
    pub fn start_after_current(
        tree: Arc<MenuTree>,
        audio: Arc<dyn AudioPort>,
        policy: EnginePolicy,
        now: Instant,
    ) -> Self {
        Self::start_inner(tree, audio, policy, now, true)
    }

    fn start_inner(
        tree: Arc<MenuTree>,
        audio: Arc<dyn AudioPort>,
        policy: EnginePolicy,
        now: Instant,
        queued: bool,
    ) -> Self {
        let root = tree.root();
        let mut engine = Self {
            tree,
            audio,
            policy,
            state: SessionState::AwaitingInput(root),
            deadline: None,
            retries: 0,
            invalid_inputs: 0,
            queue_next: queued,
        };
        engine.enter(root, now);
        engine
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.state.node()
    }

    /// Digits collected so far on an extension node.
    pub fn buffer(&self) -> &str {
        match &self.state {
            SessionState::CollectingExtension { buffer, .. } => buffer,
            _ => "",
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn invalid_inputs(&self) -> u32 {
        self.invalid_inputs
    }

    pub fn tree(&self) -> &Arc<MenuTree> {
        &self.tree
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.state, SessionState::Ended(_))
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.state {
            SessionState::Ended(reason) => Some(reason),
            _ => None,
        }
    }

    /// Instant at which [`NavigationEngine::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.is_ended() {
            None
        } else {
            self.deadline
        }
    }

    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Step {
        match event {
            InputEvent::Key(key) => self.handle_key(key, now),
            InputEvent::Hook(HookState::OnHook) => self.hang_up(),
            InputEvent::Hook(HookState::OffHook) => self.step(),
        }
    }

    pub fn handle_key(&mut self, key: Key, now: Instant) -> Step {
        let node = match &self.state {
            SessionState::Ended(_) => return self.step(),
            SessionState::AwaitingInput(node) => *node,
            SessionState::CollectingExtension { node, .. } => *node,
        };
        // A press interrupts whatever prompt is playing.
        self.audio.stop();
        debug!(key = %key, node = self.tree.node(node).path(), "key pressed");

        if self.tree.node(node).extension().is_some() {
            self.collect(node, key, now);
        } else {
            self.select(node, key, now);
        }
        self.step()
    }

    /// Fire any timer whose deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Step {
        match self.next_deadline() {
            Some(deadline) if now >= deadline => self.on_timeout(now),
            _ => {}
        }
        self.step()
    }

    pub fn hang_up(&mut self) -> Step {
        if !self.is_ended() {
            self.audio.stop();
            info!("caller hung up");
            self.end(EndReason::HungUp);
        }
        self.step()
    }

    /// End the session because another component took over the line.
    pub fn preempt(&mut self) -> Step {
        if !self.is_ended() {
            self.audio.stop();
            self.end(EndReason::Preempted);
        }
        self.step()
    }

    fn step(&self) -> Step {
        match self.state {
            SessionState::Ended(reason) => Step::Ended(reason),
            _ => Step::Continue,
        }
    }

    fn end(&mut self, reason: EndReason) {
        debug!(?reason, "session ended");
        self.state = SessionState::Ended(reason);
        self.deadline = None;
    }

    /// Forward navigation into `target`: prompt, action, then wait or end.
    fn enter(&mut self, target: NodeId, now: Instant) {
        let tree = Arc::clone(&self.tree);
        let node = tree.node(target);
        info!(node = node.path(), clip = node.clip(), "entering node");
        self.retries = 0;
        self.invalid_inputs = 0;
        self.play(node.clip());

        let outcome = node
            .action()
            .map(|action| action.invoke())
            .unwrap_or_default();
        if outcome == ActionOutcome::ReturnToRoot {
            // Let the node's own prompt finish before the root prompt.
            self.queue_next = true;
            self.revisit(tree.root(), now);
            return;
        }
        if node.is_leaf() {
            self.end(EndReason::LeafReached(target));
            return;
        }
        self.await_input(target, now);
    }

    /// Re-present a node reached through a back/home link or a fallback.
    /// The action is not re-invoked.
    fn revisit(&mut self, target: NodeId, now: Instant) {
        let tree = Arc::clone(&self.tree);
        let node = tree.node(target);
        info!(node = node.path(), "returning to node");
        self.retries = 0;
        self.invalid_inputs = 0;
        self.play(node.clip());
        if node.is_leaf() {
            self.end(EndReason::LeafReached(target));
            return;
        }
        self.await_input(target, now);
    }

    fn await_input(&mut self, node: NodeId, now: Instant) {
        let data = self.tree.node(node);
        self.state = if data.extension().is_some() {
            SessionState::CollectingExtension {
                node,
                buffer: String::new(),
            }
        } else {
            SessionState::AwaitingInput(node)
        };
        self.deadline = Some(now + data.timeout());
    }

    fn follow(&mut self, from: NodeId, transition: Transition, now: Instant) {
        match transition {
            Transition::Child(child) => self.enter(child, now),
            Transition::Parent => {
                let target = self.tree.fallback(from).unwrap_or(self.tree.root());
                self.revisit(target, now);
            }
            Transition::Root => self.revisit(self.tree.root(), now),
        }
    }

    fn select(&mut self, node: NodeId, key: Key, now: Instant) {
        let pressed = key.to_string();
        match self.tree.transition(node, &pressed) {
            Some(transition) => self.follow(node, transition, now),
            None => {
                let prompt = self.policy.prompts.invalid_option.clone();
                self.reject(node, &prompt, now);
            }
        }
    }

    fn collect(&mut self, node: NodeId, key: Key, now: Instant) {
        let Some(extension) = self.tree.node(node).extension().copied() else {
            return;
        };
        if self.buffer().is_empty() && !key.is_digit() && extension.terminator != Some(key) {
            let pressed = key.to_string();
            if let Some(transition @ (Transition::Parent | Transition::Root)) =
                self.tree.transition(node, &pressed)
            {
                self.follow(node, transition, now);
                return;
            }
        }

        let SessionState::CollectingExtension { buffer, .. } = &mut self.state else {
            return;
        };
        match push_key(&extension, buffer, key) {
            Collect::Pending => {
                self.deadline = Some(now + extension.timeout);
            }
            Collect::Terminated | Collect::LengthReached => self.submit(node, now),
        }
    }

    fn submit(&mut self, node: NodeId, now: Instant) {
        let buffer = match &mut self.state {
            SessionState::CollectingExtension { buffer, .. } => std::mem::take(buffer),
            _ => return,
        };
        debug!(extension = %buffer, "extension submitted");
        match resolve_buffer(&self.tree, node, &buffer) {
            Some(child) => self.enter(child, now),
            None => {
                let prompt = self.policy.prompts.invalid_extension.clone();
                self.reject(node, &prompt, now);
            }
        }
    }

    /// Count an invalid entry, then either re-prompt or fall back.
    fn reject(&mut self, node: NodeId, prompt: &str, now: Instant) {
        self.invalid_inputs += 1;
        if let Some(limit) = self.policy.max_invalid_inputs {
            if self.invalid_inputs >= limit {
                warn!(
                    node = self.tree.node(node).path(),
                    invalid_inputs = self.invalid_inputs,
                    "invalid input limit reached"
                );
                self.fall_back(node, now);
                return;
            }
        }
        self.play(prompt);
        self.enqueue(self.tree.node(node).clip());
        self.deadline = Some(now + self.tree.node(node).timeout());
    }

    fn on_timeout(&mut self, now: Instant) {
        let (node, pending) = match &self.state {
            SessionState::Ended(_) => return,
            SessionState::AwaitingInput(node) => (*node, false),
            SessionState::CollectingExtension { node, buffer } => (*node, !buffer.is_empty()),
        };
        if pending {
            self.submit(node, now);
        } else {
            self.node_timeout(node, now);
        }
    }

    fn node_timeout(&mut self, node: NodeId, now: Instant) {
        if self.retries < self.policy.max_timeout_retries {
            self.retries += 1;
            debug!(
                node = self.tree.node(node).path(),
                retry = self.retries,
                "timeout, replaying prompt"
            );
            let tree = Arc::clone(&self.tree);
            self.play(tree.node(node).clip());
            self.deadline = Some(now + tree.node(node).timeout());
            return;
        }
        self.fall_back(node, now);
    }

    fn fall_back(&mut self, node: NodeId, now: Instant) {
        match self.tree.fallback(node) {
            Some(parent) => self.revisit(parent, now),
            None => {
                let prompt = self.policy.prompts.timeout.clone();
                self.play(&prompt);
                self.end(EndReason::TimedOut);
            }
        }
    }

    fn play(&mut self, clip: &str) {
        if std::mem::take(&mut self.queue_next) {
            self.enqueue(clip);
            return;
        }
        if let Err(err) = self.audio.play(clip) {
            warn!(clip, error = %err, "prompt unavailable");
        }
    }

    fn enqueue(&self, clip: &str) {
        if let Err(err) = self.audio.enqueue(clip) {
            warn!(clip, error = %err, "prompt unavailable");
        }
    }
}
