use super::LoadError;
use crate::menu::{ExtensionSpec, Key, Link, MenuNode, MAX_TIMEOUT};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// File that marks a directory as a phone system.
pub const MANIFEST_FILE: &str = "system.json";

/// On-disk description of a phone system.
#[derive(Debug, Deserialize)]
pub(crate) struct Manifest {
    pub(crate) display_name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) menu: NodeSpec,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeSpec {
    clip: String,
    #[serde(default, deserialize_with = "keyed_entries")]
    options: Vec<(String, NodeSpec)>,
    back: Option<String>,
    home: Option<String>,
    timeout_secs: Option<f64>,
    extension: Option<ExtensionManifest>,
}

#[derive(Debug, Deserialize)]
struct ExtensionManifest {
    length: Option<usize>,
    terminator: Option<String>,
    timeout_secs: Option<f64>,
}

pub(crate) fn parse(path: &Path, text: &str) -> Result<Manifest, LoadError> {
    serde_json::from_str(text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl NodeSpec {
    /// Convert into a builder node. Structural rules are left to the tree builder.
    pub(crate) fn into_node(self, path: &Path) -> Result<MenuNode, LoadError> {
        let mut node = MenuNode::new(self.clip);
        if let Some(secs) = self.timeout_secs {
            node = node.timeout(seconds(path, "timeout_secs", secs)?);
        }
        if let Some(ext) = self.extension {
            let mut spec = ExtensionSpec {
                length: ext.length,
                terminator: None,
                timeout: None,
            };
            match ext.terminator {
                Some(symbol) => spec.terminator = Some(single_key(path, "terminator", &symbol)?),
                // A bare extension block defaults to `#` unless a fixed length submits it.
                None if ext.length.is_none() => spec.terminator = Some(Key::Pound),
                None => {}
            }
            if let Some(secs) = ext.timeout_secs {
                spec.timeout = Some(seconds(path, "extension.timeout_secs", secs)?);
            }
            node = node.extension(spec);
        }
        if let Some(key) = self.back {
            node = node.link(key, Link::Parent);
        }
        if let Some(key) = self.home {
            node = node.link(key, Link::Root);
        }
        for (key, child) in self.options {
            node = node.option(key, child.into_node(path)?);
        }
        Ok(node)
    }
}

fn seconds(path: &Path, field: &str, secs: f64) -> Result<Duration, LoadError> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|duration| *duration <= MAX_TIMEOUT)
        .ok_or_else(|| LoadError::Invalid {
            path: path.to_path_buf(),
            message: format!(
                "{field} must be between 0 and {} seconds, got {secs}",
                MAX_TIMEOUT.as_secs()
            ),
        })
}

fn single_key(path: &Path, field: &str, symbol: &str) -> Result<Key, LoadError> {
    let mut chars = symbol.chars();
    match (chars.next().and_then(Key::from_char), chars.next()) {
        (Some(key), None) => Ok(key),
        _ => Err(LoadError::Invalid {
            path: path.to_path_buf(),
            message: format!("{field} must be a single keypad symbol, got '{symbol}'"),
        }),
    }
}

/// Deserialize a JSON object into ordered pairs, keeping repeated keys so
/// the tree builder can reject them instead of silently keeping the last.
fn keyed_entries<'de, D>(deserializer: D) -> Result<Vec<(String, NodeSpec)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, NodeSpec)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of key to menu node")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, node)) = map.next_entry::<String, NodeSpec>()? {
                entries.push((key, node));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}
