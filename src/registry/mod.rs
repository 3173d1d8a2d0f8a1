//! Phone system discovery.
//!
//! A scan path is either `builtin`, the systems compiled into the binary, or
//! a directory holding `system.json` manifests. Every candidate's menu is
//! built and validated during discovery, so a broken system is reported
//! once at boot and never offered in the BIOS menu.

mod manifest;

pub use manifest::MANIFEST_FILE;

use crate::menu::{MenuNode, MenuTree, TreeDefaults, TreeError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Scan path naming the compiled-in catalog.
pub const BUILTIN_SCAN_PATH: &str = "builtin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMetadata {
    pub display_name: String,
    pub description: String,
    pub version: String,
}

impl SystemMetadata {
    /// Metadata reported for a system that supplies none.
    pub fn fallback(id: &str) -> Self {
        Self {
            display_name: id.to_string(),
            description: String::new(),
            version: "unknown".to_string(),
        }
    }
}

/// Static registration entry for a compiled-in phone system.
#[derive(Clone, Copy)]
pub struct SystemDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub build: fn() -> MenuNode,
}

impl fmt::Debug for SystemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDescriptor")
            .field("id", &self.id)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemSource {
    Builtin,
    Directory(PathBuf),
}

impl fmt::Display for SystemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemSource::Builtin => f.write_str(BUILTIN_SCAN_PATH),
            SystemSource::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A discovered, validated phone system.
#[derive(Clone)]
pub struct PhoneSystem {
    id: String,
    metadata: SystemMetadata,
    tree: Arc<MenuTree>,
    source: SystemSource,
}

impl PhoneSystem {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> &SystemMetadata {
        &self.metadata
    }

    pub fn tree(&self) -> &Arc<MenuTree> {
        &self.tree
    }

    pub fn source(&self) -> &SystemSource {
        &self.source
    }
}

impl fmt::Debug for PhoneSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhoneSystem")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("nodes", &self.tree.len())
            .field("source", &self.source)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("phone system '{0}' is not registered")]
    NotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid manifest {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("system '{id}' has an invalid menu: {source}")]
    Tree {
        id: String,
        #[source]
        source: TreeError,
    },

    #[error("cannot derive a system id from {}", .0.display())]
    UnnamedDirectory(PathBuf),
}

/// A candidate that was found but could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub location: String,
    pub error: LoadError,
}

/// Discovered systems in discovery order, indexed by id.
#[derive(Debug, Default)]
pub struct SystemRegistry {
    systems: Vec<PhoneSystem>,
    failures: Vec<LoadFailure>,
}

impl SystemRegistry {
    /// Scan `scan_paths` in order. The first system seen for an id wins.
    ///
    /// Load failures are recorded in [`SystemRegistry::failures`] and never
    /// abort the scan.
    pub fn discover(
        scan_paths: &[String],
        catalog: &[SystemDescriptor],
        defaults: TreeDefaults,
    ) -> Self {
        let mut registry = Self::default();
        for scan_path in scan_paths {
            if scan_path == BUILTIN_SCAN_PATH {
                for descriptor in catalog {
                    registry.load_builtin(descriptor, defaults);
                }
                continue;
            }
            registry.scan_directory(Path::new(scan_path), defaults);
        }
        info!(
            systems = registry.systems.len(),
            failures = registry.failures.len(),
            "system discovery complete"
        );
        registry
    }

    pub fn get(&self, id: &str) -> Result<&PhoneSystem, RegistryError> {
        self.systems
            .iter()
            .find(|system| system.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_ok()
    }

    /// Metadata for `id`, or `{id, "", "unknown"}` when none is known.
    pub fn metadata(&self, id: &str) -> SystemMetadata {
        self.get(id)
            .map(|system| system.metadata.clone())
            .unwrap_or_else(|_| SystemMetadata::fallback(id))
    }

    pub fn records(&self) -> &[PhoneSystem] {
        &self.systems
    }

    pub fn ids(&self) -> Vec<String> {
        self.systems.iter().map(|system| system.id.clone()).collect()
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    fn load_builtin(&mut self, descriptor: &SystemDescriptor, defaults: TreeDefaults) {
        if self.skip_duplicate(descriptor.id, &SystemSource::Builtin) {
            return;
        }
        match build_tree(descriptor.id, (descriptor.build)(), defaults) {
            Ok(tree) => self.register(PhoneSystem {
                id: descriptor.id.to_string(),
                metadata: SystemMetadata {
                    display_name: descriptor.display_name.to_string(),
                    description: descriptor.description.to_string(),
                    version: descriptor.version.to_string(),
                },
                tree,
                source: SystemSource::Builtin,
            }),
            Err(error) => self.record_failure(format!("builtin:{}", descriptor.id), error),
        }
    }

    fn scan_directory(&mut self, dir: &Path, defaults: TreeDefaults) {
        if !dir.is_dir() {
            debug!(path = %dir.display(), "scan path missing, skipping");
            return;
        }
        if dir.join(MANIFEST_FILE).is_file() {
            self.load_directory(dir, defaults);
            return;
        }
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                self.record_failure(
                    dir.display().to_string(),
                    LoadError::Io {
                        path: dir.to_path_buf(),
                        source,
                    },
                );
                return;
            }
        };
        let mut candidates: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir() && path.join(MANIFEST_FILE).is_file())
            .collect();
        candidates.sort();
        for candidate in candidates {
            self.load_directory(&candidate, defaults);
        }
    }

    fn load_directory(&mut self, dir: &Path, defaults: TreeDefaults) {
        let location = dir.display().to_string();
        let Some(id) = directory_id(dir) else {
            self.record_failure(location, LoadError::UnnamedDirectory(dir.to_path_buf()));
            return;
        };
        let source = SystemSource::Directory(dir.to_path_buf());
        if self.skip_duplicate(&id, &source) {
            return;
        }
        match load_manifest(&id, dir, defaults) {
            Ok((metadata, tree)) => self.register(PhoneSystem {
                id,
                metadata,
                tree,
                source,
            }),
            Err(error) => self.record_failure(location, error),
        }
    }

    fn skip_duplicate(&self, id: &str, source: &SystemSource) -> bool {
        let Ok(existing) = self.get(id) else {
            return false;
        };
        warn!(
            system_id = id,
            skipped = %source,
            kept = %existing.source,
            "duplicate system id, keeping first"
        );
        true
    }

    fn register(&mut self, system: PhoneSystem) {
        debug!(system_id = %system.id, source = %system.source, "registered phone system");
        self.systems.push(system);
    }

    fn record_failure(&mut self, location: String, error: LoadError) {
        warn!(location = %location, error = %error, "failed to load phone system");
        self.failures.push(LoadFailure { location, error });
    }
}

/// Stable id of a directory-based system: its directory name.
fn directory_id(dir: &Path) -> Option<String> {
    let name = dir.canonicalize().ok()?.file_name()?.to_str()?.to_string();
    (!name.is_empty()).then_some(name)
}

fn build_tree(id: &str, root: MenuNode, defaults: TreeDefaults) -> Result<Arc<MenuTree>, LoadError> {
    MenuTree::build_with(root, defaults)
        .map(Arc::new)
        .map_err(|source| LoadError::Tree {
            id: id.to_string(),
            source,
        })
}

fn load_manifest(
    id: &str,
    dir: &Path,
    defaults: TreeDefaults,
) -> Result<(SystemMetadata, Arc<MenuTree>), LoadError> {
    let path = dir.join(MANIFEST_FILE);
    let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    let manifest = manifest::parse(&path, &text)?;
    let fallback = SystemMetadata::fallback(id);
    let metadata = SystemMetadata {
        display_name: manifest.display_name.unwrap_or(fallback.display_name),
        description: manifest.description.unwrap_or(fallback.description),
        version: manifest.version.unwrap_or(fallback.version),
    };
    let root = manifest.menu.into_node(&path)?;
    let tree = build_tree(id, root, defaults)?;
    Ok((metadata, tree))
}
