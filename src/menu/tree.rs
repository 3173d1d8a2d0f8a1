use super::action::NodeAction;
use super::error::TreeError;
use super::key::{is_key_sequence, Key};
use super::node::{ExtensionSpec, Link, MenuNode};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_EXTENSION_TIMEOUT: Duration = Duration::from_secs(3);
/// Longest node or extension timeout a tree accepts.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(86_400);

/// Stable index of a node inside one [`MenuTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a key leads from a given node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Child(NodeId),
    Parent,
    Root,
}

/// Resolved extension settings for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension {
    pub length: Option<usize>,
    pub terminator: Option<Key>,
    pub timeout: Duration,
}

/// Timeouts applied to nodes that do not set their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeDefaults {
    pub node_timeout: Duration,
    pub extension_timeout: Duration,
}

impl Default for TreeDefaults {
    fn default() -> Self {
        Self {
            node_timeout: DEFAULT_NODE_TIMEOUT,
            extension_timeout: DEFAULT_EXTENSION_TIMEOUT,
        }
    }
}

pub struct NodeData {
    clip: String,
    transitions: BTreeMap<String, Transition>,
    action: Option<Arc<dyn NodeAction>>,
    parent: Option<NodeId>,
    timeout: Duration,
    extension: Option<Extension>,
    path: String,
}

impl NodeData {
    pub fn clip(&self) -> &str {
        &self.clip
    }

    pub fn action(&self) -> Option<&Arc<dyn NodeAction>> {
        self.action.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn extension(&self) -> Option<&Extension> {
        self.extension.as_ref()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (&str, Transition)> {
        self.transitions.iter().map(|(key, t)| (key.as_str(), *t))
    }

    /// Key path from the root, e.g. `root/1/101`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Leaves end the session once entered.
    pub fn is_leaf(&self) -> bool {
        self.transitions.is_empty()
    }
}

/// Immutable arena of menu nodes. The root is always the first node.
///
/// Children are addressed by [`NodeId`]; "go back" transitions are resolved
/// through the stored parent id instead of a pointer, so the tree has a
/// single owner and can be shared behind an `Arc`.
pub struct MenuTree {
    nodes: Vec<NodeData>,
}

impl MenuTree {
    /// Validate and flatten a node hierarchy using the default timeouts.
    pub fn build(root: MenuNode) -> Result<Self, TreeError> {
        Self::build_with(root, TreeDefaults::default())
    }

    pub fn build_with(root: MenuNode, defaults: TreeDefaults) -> Result<Self, TreeError> {
        let mut tree = Self { nodes: Vec::new() };
        tree.insert(root, None, "root".to_string(), &defaults)?;
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Exact lookup of `key` on `from`. Back-references resolve to concrete ids.
    pub fn resolve(&self, from: NodeId, key: &str) -> Option<NodeId> {
        if key.is_empty() {
            return None;
        }
        Some(match self.transition(from, key)? {
            Transition::Child(id) => id,
            Transition::Parent => self.node(from).parent.unwrap_or(self.root()),
            Transition::Root => self.root(),
        })
    }

    /// Raw transition for `key`, distinguishing children from back-references.
    pub fn transition(&self, from: NodeId, key: &str) -> Option<Transition> {
        self.node(from).transitions.get(key).copied()
    }

    /// Node a timeout falls back to; `None` at the root.
    pub fn fallback(&self, from: NodeId) -> Option<NodeId> {
        self.node(from).parent
    }

    fn insert(
        &mut self,
        node: MenuNode,
        parent: Option<NodeId>,
        path: String,
        defaults: &TreeDefaults,
    ) -> Result<NodeId, TreeError> {
        validate_node(&node, &path)?;

        let id = NodeId(self.nodes.len());
        let timeout = node.timeout.unwrap_or(defaults.node_timeout);
        let extension = node.extension.map(|spec| Extension {
            length: spec.length,
            terminator: spec.terminator,
            timeout: spec.timeout.unwrap_or(defaults.extension_timeout),
        });
        let mut transitions = BTreeMap::new();
        for (key, link) in &node.links {
            let transition = match link {
                Link::Parent => Transition::Parent,
                Link::Root => Transition::Root,
            };
            transitions.insert(key.clone(), transition);
        }
        self.nodes.push(NodeData {
            clip: node.clip,
            transitions,
            action: node.action,
            parent,
            timeout,
            extension,
            path: path.clone(),
        });

        for (key, child) in node.options {
            let child_path = format!("{path}/{key}");
            let child_id = self.insert(child, Some(id), child_path, defaults)?;
            self.nodes[id.0]
                .transitions
                .insert(key, Transition::Child(child_id));
        }
        Ok(id)
    }
}

fn validate_timeout(timeout: Option<Duration>, path: &str) -> Result<(), TreeError> {
    match timeout {
        Some(Duration::ZERO) => Err(TreeError::ZeroTimeout {
            path: path.to_string(),
        }),
        Some(timeout) if timeout > MAX_TIMEOUT => Err(TreeError::TimeoutTooLong {
            path: path.to_string(),
            max_secs: MAX_TIMEOUT.as_secs(),
        }),
        _ => Ok(()),
    }
}

fn validate_node(node: &MenuNode, path: &str) -> Result<(), TreeError> {
    validate_timeout(node.timeout, path)?;

    let mut seen = std::collections::HashSet::new();
    let all_keys = node
        .options
        .iter()
        .map(|(key, _)| key)
        .chain(node.links.iter().map(|(key, _)| key));
    for key in all_keys {
        if !is_key_sequence(key) {
            return Err(TreeError::InvalidKey {
                path: path.to_string(),
                key: key.clone(),
            });
        }
        if !seen.insert(key.as_str()) {
            return Err(TreeError::DuplicateKey {
                path: path.to_string(),
                key: key.clone(),
            });
        }
    }

    // Back/home links are single presses in every mode.
    if let Some((key, _)) = node.links.iter().find(|(key, _)| key.chars().count() != 1) {
        return Err(TreeError::MultiSymbolLink {
            path: path.to_string(),
            key: key.clone(),
        });
    }

    match &node.extension {
        None => {
            if let Some((key, _)) = node.options.iter().find(|(key, _)| key.chars().count() > 1) {
                return Err(TreeError::MultiSymbolKey {
                    path: path.to_string(),
                    key: key.clone(),
                });
            }
            Ok(())
        }
        Some(spec) => validate_extension(node, spec, path),
    }
}

fn validate_extension(node: &MenuNode, spec: &ExtensionSpec, path: &str) -> Result<(), TreeError> {
    validate_timeout(spec.timeout, path)?;
    let has_length = matches!(spec.length, Some(len) if len > 0);
    if !has_length && spec.terminator.is_none() {
        return Err(TreeError::ExtensionWithoutTerminus {
            path: path.to_string(),
        });
    }
    if spec.length == Some(0) && spec.terminator.is_some() {
        return Err(TreeError::ExtensionWithoutTerminus {
            path: path.to_string(),
        });
    }
    if let Some(terminator) = spec.terminator {
        if terminator.is_digit() {
            return Err(TreeError::InvalidTerminator {
                path: path.to_string(),
                terminator: terminator.as_char(),
            });
        }
        if let Some((key, _)) = node
            .options
            .iter()
            .find(|(key, _)| key.contains(terminator.as_char()))
        {
            return Err(TreeError::TerminatorInKey {
                path: path.to_string(),
                key: key.clone(),
                terminator: terminator.as_char(),
            });
        }
    }
    if let Some(expected) = spec.length.filter(|len| *len > 0) {
        if let Some((key, _)) = node
            .options
            .iter()
            .find(|(key, _)| key.chars().count() != expected)
        {
            return Err(TreeError::ExtensionLengthMismatch {
                path: path.to_string(),
                key: key.clone(),
                expected,
            });
        }
    }
    let has_single = node.options.iter().any(|(key, _)| key.chars().count() == 1);
    let has_multi = node.options.iter().any(|(key, _)| key.chars().count() > 1);
    if has_single && has_multi {
        return Err(TreeError::MixedExtensionKeyLengths {
            path: path.to_string(),
        });
    }
    // Back/home keys are only reachable when they cannot be mistaken for data.
    for (key, _) in &node.links {
        let collides = key.chars().any(|ch| ch.is_ascii_digit())
            || spec
                .terminator
                .is_some_and(|terminator| key.contains(terminator.as_char()));
        if collides {
            return Err(TreeError::LinkCollidesWithExtension {
                path: path.to_string(),
                key: key.clone(),
            });
        }
    }
    Ok(())
}
