//! Dynamic source loading.
//!
//! A [`SourceLoader`] turns rig sources on disk into registered, executed
//! modules. Sources come in two shapes: a single `.rig` file, or a package
//! directory containing a `mod.rig` entry script. Loading the same path again
//! replaces the previous registration; two distinct paths that would claim
//! the same name get numeric suffixes (`calib`, `calib_1`, ...).
//!
//! The module becomes visible in the registry before its source runs, so a
//! source can `use` itself under its registered name while it is still
//! executing. If execution fails the registration is rolled back.

pub mod discover;
pub mod engine;
pub mod error;
pub mod module;
pub mod registry;

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::loader::engine::{ScriptEngine, SourceEngine};
use crate::loader::error::{LoadError, LoadResult};
use crate::loader::module::{LoadedModule, ModuleHandle, ModuleOrigin};
use crate::loader::registry::ModuleRegistry;

/// File extension of rig scripts.
pub const SOURCE_EXTENSION: &str = ".rig";
/// Entry script of a package directory.
pub const PACKAGE_ENTRY: &str = "mod.rig";

/// How a source path maps onto a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceShape {
    /// Derived module name, before collision handling.
    pub module_name: String,
    /// The script the engine will execute.
    pub entry: PathBuf,
    pub origin: ModuleOrigin,
}

/// Classify a path as a loadable source.
///
/// A directory with a `mod.rig` inside is a package; anything whose path ends
/// in `.rig` is treated as a source file, whether or not it exists yet (a
/// missing file surfaces as a read error at execution time). Everything else
/// is not loadable.
pub fn classify_source(path: &Path) -> Option<SourceShape> {
    let entry = path.join(PACKAGE_ENTRY);
    if path.is_dir() && entry.is_file() {
        return Some(SourceShape {
            module_name: package_name(path),
            origin: ModuleOrigin::Package {
                dir: path.to_path_buf(),
                entry: entry.clone(),
            },
            entry,
        });
    }
    if path.to_string_lossy().ends_with(SOURCE_EXTENSION) {
        return Some(SourceShape {
            module_name: file_stem(path),
            origin: ModuleOrigin::File(path.to_path_buf()),
            entry: path.to_path_buf(),
        });
    }
    None
}

/// Module name for a package directory: its last real path segment.
fn package_name(path: &Path) -> String {
    path.components()
        .rev()
        .find_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Module name for a source file: the file name minus its extension.
///
/// A file named just `.rig` derives the empty name; collision handling still
/// assigns it a usable registered name.
fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(SOURCE_EXTENSION) {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// Pick the name a module registers under: the derived name if free,
/// otherwise the first free `{name}_{i}` counting up from 1.
pub fn resolve_name(registry: &ModuleRegistry, base: &str) -> String {
    if !registry.contains(base) {
        return base.to_string();
    }
    let mut i = 1;
    loop {
        let candidate = format!("{base}_{i}");
        if !registry.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

/// Loads and unloads rig sources against its own module registry.
pub struct SourceLoader<E = ScriptEngine> {
    registry: ModuleRegistry,
    engine: E,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::with_engine(ScriptEngine::default())
    }
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SourceEngine> SourceLoader<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            registry: ModuleRegistry::new(),
            engine,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Load (or reload) the source at `path` and register the module.
    ///
    /// Any previous module loaded from the same path is unloaded first, so
    /// reloading keeps the original registered name instead of accumulating
    /// suffixed duplicates. On execution failure the half-initialized module
    /// is dropped from the registry and the error is returned.
    pub fn load(&mut self, path: impl AsRef<Path>) -> LoadResult<ModuleHandle> {
        let path = path.as_ref();
        self.unload(path);

        let shape = classify_source(path).ok_or_else(|| LoadError::InvalidSource {
            path: path.to_path_buf(),
        })?;
        let name = resolve_name(&self.registry, &shape.module_name);
        debug!(module = %name, entry = %shape.entry.display(), "executing source");

        let module = LoadedModule::new(name, shape.origin);
        // Registered before execution so the source can `use` itself.
        self.registry.insert(module.clone());

        match self.engine.execute_file(&shape.entry, &module, &self.registry) {
            Ok(_) => {
                info!(module = %module.name, path = %path.display(), "loaded source");
                Ok(module)
            }
            Err(err) => {
                self.registry.remove(&module.name);
                Err(err.into())
            }
        }
    }

    /// Drop every registered module that was loaded from `path`.
    ///
    /// Paths that are not loadable sources, or that no registered module came
    /// from, are silently ignored. Candidates are shortlisted by name
    /// containment and confirmed against their recorded origin, so a suffixed
    /// duplicate (`calib_1`) loaded from a different path survives an unload
    /// of `calib`.
    pub fn unload(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let Some(shape) = classify_source(path) else {
            return;
        };

        let matching: Vec<String> = self
            .registry
            .modules()
            .filter(|module| module.name.contains(&shape.module_name))
            .filter(|module| module.origin.refers_to(path))
            .map(|module| module.name.clone())
            .collect();

        for name in matching {
            debug!(module = %name, path = %path.display(), "unloading module");
            self.registry.remove(&name);
        }
    }

    /// Reports for every registered module, in registration order.
    pub fn reports(&self) -> Vec<ModuleReport> {
        self.registry
            .modules()
            .map(|module| ModuleReport::new(module))
            .collect()
    }
}

/// Snapshot of one registered module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    pub name: String,
    pub kind: &'static str,
    pub path: Option<PathBuf>,
    pub bindings: Vec<BindingReport>,
}

/// Snapshot of one module-level binding.
#[derive(Debug, Clone, Serialize)]
pub struct BindingReport {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub value: String,
}

impl ModuleReport {
    pub fn new(module: &LoadedModule) -> Self {
        Self {
            name: module.name.clone(),
            kind: module.origin.kind(),
            path: module.origin.path().map(Path::to_path_buf),
            bindings: module
                .bindings()
                .into_iter()
                .map(|(name, value)| BindingReport {
                    name,
                    type_name: value.type_name(),
                    value: value.repr(),
                })
                .collect(),
        }
    }
}
