//! Loaded module handles.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::script::value::{Namespace, Value};

/// Shared handle to a loaded module.
///
/// Handles stay valid after the module is dropped from the registry, so a
/// reload never invalidates values the host is still holding.
pub type ModuleHandle = Rc<LoadedModule>;

/// Where a module's source came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOrigin {
    /// A package directory with a `mod.rig` entry script.
    Package { dir: PathBuf, entry: PathBuf },
    /// A single `.rig` source file.
    File(PathBuf),
    /// Created by the host (REPL session, inline eval), with no backing path.
    Host,
}

impl ModuleOrigin {
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleOrigin::Package { .. } => "package",
            ModuleOrigin::File(_) => "file",
            ModuleOrigin::Host => "host",
        }
    }

    /// The path this module was loaded from, if it has one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ModuleOrigin::Package { dir, .. } => Some(dir),
            ModuleOrigin::File(path) => Some(path),
            ModuleOrigin::Host => None,
        }
    }

    /// Whether this origin refers to the given source path.
    ///
    /// Packages match on directory equality. Files match if their path
    /// contains the requested path as a substring, which tolerates relative
    /// versus absolute spellings of the same location. Host modules never
    /// match a path.
    pub fn refers_to(&self, source_path: &Path) -> bool {
        match self {
            ModuleOrigin::Package { dir, .. } => dir.as_path() == source_path,
            ModuleOrigin::File(file) => file
                .to_string_lossy()
                .contains(&*source_path.to_string_lossy()),
            ModuleOrigin::Host => false,
        }
    }
}

impl fmt::Display for ModuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str("<host>"),
        }
    }
}

/// A module registered under a unique name.
pub struct LoadedModule {
    pub name: String,
    pub origin: ModuleOrigin,
    namespace: RefCell<Namespace>,
}

impl LoadedModule {
    pub fn new(name: impl Into<String>, origin: ModuleOrigin) -> ModuleHandle {
        Rc::new(Self {
            name: name.into(),
            origin,
            namespace: RefCell::new(Namespace::new()),
        })
    }

    /// Look up a module-level binding.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.namespace.borrow().get(name).cloned()
    }

    /// Create or overwrite a module-level binding.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.namespace.borrow_mut().insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.namespace.borrow().contains_key(name)
    }

    /// Snapshot of all bindings in definition order.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.namespace
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

// Namespaces can contain the module itself (a module may import under its
// own registered name), so Debug must not recurse into them.
impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
