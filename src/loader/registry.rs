//! The module registry.
//!
//! One registry instance backs one loading session. It is an explicit value
//! owned by a [`SourceLoader`](crate::loader::SourceLoader) rather than
//! process-global state, so independent sessions (or tests) never see each
//! other's modules.

use indexmap::IndexMap;

use crate::loader::module::ModuleHandle;

/// Registered modules, keyed by their unique registered name.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: IndexMap<String, ModuleHandle>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its own name, displacing any previous holder.
    pub fn insert(&mut self, module: ModuleHandle) -> Option<ModuleHandle> {
        self.modules.insert(module.name.clone(), module)
    }

    pub fn get(&self, name: &str) -> Option<ModuleHandle> {
        self.modules.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Remove a module by name. The handle stays alive for anyone holding it.
    pub fn remove(&mut self, name: &str) -> Option<ModuleHandle> {
        self.modules.shift_remove(name)
    }

    /// Registered modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleHandle> {
        self.modules.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
