use crate::menu::NodeId;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Handset replaced.
    HungUp,
    /// A leaf node was entered and its action completed.
    LeafReached(NodeId),
    /// The root timed out after its last replay.
    TimedOut,
    /// The bootloader took the line away from this session.
    Preempted,
}

/// Where a session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput(NodeId),
    CollectingExtension { node: NodeId, buffer: String },
    Ended(EndReason),
}

impl SessionState {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            SessionState::AwaitingInput(node) => Some(*node),
            SessionState::CollectingExtension { node, .. } => Some(*node),
            SessionState::Ended(_) => None,
        }
    }
}

/// Outcome of feeding the engine one event or timer check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Ended(EndReason),
}
