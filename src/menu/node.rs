use super::action::NodeAction;
use super::key::Key;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Non-owning transition declared on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Return to the parent node (the root stays on itself).
    Parent,
    /// Return to the tree root.
    Root,
}

/// Multi-digit collection settings for a node in extension mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtensionSpec {
    /// Submit as soon as this many digits are buffered.
    pub length: Option<usize>,
    /// Submit when this key is pressed. Never buffered as data.
    pub terminator: Option<Key>,
    /// Inactivity window after the last digit. `None` uses the tree default.
    pub timeout: Option<Duration>,
}

impl ExtensionSpec {
    /// Fixed-length extensions (`101`, `102`, ...), submitted without a terminator.
    pub fn fixed(length: usize) -> Self {
        Self {
            length: Some(length),
            terminator: None,
            timeout: None,
        }
    }

    /// Variable-length extensions submitted with `terminator`.
    pub fn terminated(terminator: Key) -> Self {
        Self {
            length: None,
            terminator: Some(terminator),
            timeout: None,
        }
    }

    pub fn with_terminator(mut self, terminator: Key) -> Self {
        self.terminator = Some(terminator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ExtensionSpec {
    fn default() -> Self {
        Self::terminated(Key::Pound)
    }
}

/// Builder-side description of one prompt and its transitions.
///
/// A `MenuNode` owns its children outright. It is turned into an immutable
/// [`MenuTree`](super::MenuTree) with [`MenuTree::build`](super::MenuTree::build),
/// which is where every structural rule is checked.
pub struct MenuNode {
    pub(crate) clip: String,
    pub(crate) options: Vec<(String, MenuNode)>,
    pub(crate) links: Vec<(String, Link)>,
    pub(crate) action: Option<Arc<dyn NodeAction>>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) extension: Option<ExtensionSpec>,
}

impl MenuNode {
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            options: Vec::new(),
            links: Vec::new(),
            action: None,
            timeout: None,
            extension: None,
        }
    }

    /// Add a child reached by `key` (a single symbol, or a digit string in extension mode).
    pub fn option(mut self, key: impl Into<String>, child: MenuNode) -> Self {
        self.options.push((key.into(), child));
        self
    }

    /// Pressing `key` returns to the parent node.
    pub fn back(self, key: Key) -> Self {
        self.link(key.to_string(), Link::Parent)
    }

    /// Pressing `key` returns to the root node.
    pub fn home(self, key: Key) -> Self {
        self.link(key.to_string(), Link::Root)
    }

    pub fn link(mut self, key: impl Into<String>, link: Link) -> Self {
        self.links.push((key.into(), link));
        self
    }

    pub fn action(mut self, action: impl NodeAction + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    pub fn shared_action(mut self, action: Arc<dyn NodeAction>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn extension(mut self, spec: ExtensionSpec) -> Self {
        self.extension = Some(spec);
        self
    }

    pub fn clip(&self) -> &str {
        &self.clip
    }
}

impl fmt::Debug for MenuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuNode")
            .field("clip", &self.clip)
            .field("options", &self.options)
            .field("links", &self.links)
            .field("has_action", &self.action.is_some())
            .field("timeout", &self.timeout)
            .field("extension", &self.extension)
            .finish()
    }
}
