//! Multi-digit extension collection.
//!
//! While a node is in extension mode every digit goes into a buffer instead
//! of being matched on its own. The buffer is submitted when the terminator
//! is pressed, when it reaches the fixed length, or when the inactivity
//! timer fires, and is then matched exactly against the node's keys.

use crate::menu::{Extension, Key, MenuTree, NodeId, Transition};

/// Result of feeding one key to the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collect {
    /// Keep waiting for digits.
    Pending,
    /// The terminator was pressed; the buffer is complete as is.
    Terminated,
    /// The buffer reached the node's fixed length.
    LengthReached,
}

/// Apply `key` to `buffer` under `extension`.
///
/// The terminator is checked first and is never buffered, so it wins when
/// both the terminator and the length rule could apply to the same key.
pub fn push_key(extension: &Extension, buffer: &mut String, key: Key) -> Collect {
    if extension.terminator == Some(key) {
        return Collect::Terminated;
    }
    buffer.push(key.as_char());
    match extension.length {
        Some(length) if length > 0 && buffer.chars().count() >= length => Collect::LengthReached,
        _ => Collect::Pending,
    }
}

/// Exact match of a complete buffer against the node's option keys.
///
/// There is no prefix or wildcard matching, and an empty buffer never matches.
pub fn resolve_buffer(tree: &MenuTree, node: NodeId, buffer: &str) -> Option<NodeId> {
    if buffer.is_empty() {
        return None;
    }
    match tree.transition(node, buffer)? {
        Transition::Child(child) => Some(child),
        Transition::Parent | Transition::Root => None,
    }
}
