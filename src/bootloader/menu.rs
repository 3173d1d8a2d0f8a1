use crate::menu::{MenuNode, MenuTree, NodeId, TreeDefaults, TreeError};
use crate::registry::SystemRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const BIOS_MAIN_CLIP: &str = "bios/main_menu";
pub const NO_SYSTEMS_CLIP: &str = "prompts/no_systems";
pub const BIOS_MENU_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_BIOS_ENTRIES: usize = 9;

/// Synthetic selection menu: digit `n` announces the n-th discovered system.
pub struct BiosMenu {
    tree: Arc<MenuTree>,
    entries: Vec<(NodeId, String)>,
}

impl BiosMenu {
    /// `None` when the registry is empty.
    pub fn build(registry: &SystemRegistry) -> Result<Option<Self>, TreeError> {
        if registry.is_empty() {
            return Ok(None);
        }
        let mut root = MenuNode::new(BIOS_MAIN_CLIP).timeout(BIOS_MENU_TIMEOUT);
        let mut listed = Vec::new();
        for (idx, system) in registry.records().iter().enumerate() {
            if idx >= MAX_BIOS_ENTRIES {
                warn!(system_id = system.id(), "too many phone systems for the BIOS menu, skipping");
                continue;
            }
            let digit = (idx + 1).to_string();
            root = root.option(
                digit.clone(),
                MenuNode::new(format!("bios/system_{}", system.id())),
            );
            listed.push((digit, system.id().to_string()));
        }

        let tree = MenuTree::build_with(root, TreeDefaults::default())?;
        let entries = listed
            .into_iter()
            .filter_map(|(digit, id)| tree.resolve(tree.root(), &digit).map(|node| (node, id)))
            .collect();
        Ok(Some(Self {
            tree: Arc::new(tree),
            entries,
        }))
    }

    pub fn tree(&self) -> &Arc<MenuTree> {
        &self.tree
    }

    /// System announced by the leaf `node`.
    pub fn system_for(&self, node: NodeId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| *id == node)
            .map(|(_, system)| system.as_str())
    }

    /// Ids offered in this menu, in digit order.
    pub fn system_ids(&self) -> Vec<String> {
        self.entries.iter().map(|(_, id)| id.clone()).collect()
    }
}
