//! Menu data model: prompts, keyed transitions, and the immutable tree the
//! navigation engine walks.
//!
//! Menus are described with the [`MenuNode`] builder and frozen into a
//! [`MenuTree`]. All structural checks (key syntax, duplicate keys,
//! extension settings) happen at that point, so a malformed menu is
//! rejected before any caller picks up the handset.

mod action;
mod error;
mod key;
mod node;
mod tree;

pub use action::{ActionOutcome, NodeAction};
pub use error::TreeError;
pub use key::{is_key_sequence, Key};
pub use node::{ExtensionSpec, Link, MenuNode};
pub use tree::{
    Extension, MenuTree, NodeData, NodeId, Transition, TreeDefaults, DEFAULT_EXTENSION_TIMEOUT,
    DEFAULT_NODE_TIMEOUT, MAX_TIMEOUT,
};
