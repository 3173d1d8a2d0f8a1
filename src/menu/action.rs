/// What the engine should do after a node's action has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionOutcome {
    /// Carry on with the node's normal behaviour.
    #[default]
    Continue,
    /// Abandon the current branch and replay the root menu.
    ReturnToRoot,
}

/// Side effect attached to a menu node, invoked when the node is entered.
///
/// The engine never inspects the implementation; menu applications supply
/// whatever behaviour they need (launch a recording, flip a relay, ...).
pub trait NodeAction: Send + Sync {
    fn invoke(&self) -> ActionOutcome;
}

impl<F> NodeAction for F
where
    F: Fn() -> ActionOutcome + Send + Sync,
{
    fn invoke(&self) -> ActionOutcome {
        self()
    }
}
