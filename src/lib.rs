//! camrig
//!
//! Support toolkit for camera-rig calibration workflows: a loader that turns
//! rig scripts on disk into registered modules, the rigscript language they
//! are written in, and the numeric and console helpers those workflows share.
//!
//! # Example
//!
//! ```no_run
//! use camrig::loader::SourceLoader;
//!
//! fn main() -> camrig::Result<()> {
//!     let mut loader = SourceLoader::new();
//!     let module = loader.load("rigs/calib.rig")?;
//!     println!("loaded {}", module.name);
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/camrig")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod loader;
pub mod repl;
pub mod script;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

use std::path::Path;

use tracing::debug;

use crate::loader::engine::{ScriptEngine, SourceEngine};
use crate::loader::module::{LoadedModule, ModuleHandle, ModuleOrigin};
use crate::loader::registry::ModuleRegistry;
use crate::loader::SourceLoader;
use crate::script::value::Value;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const NAME: &str = "camrig";

/// Evaluate a standalone source string in a fresh, unregistered host module.
///
/// # Example
///
/// ```
/// let value = camrig::eval_str("let f = 2.8; f * 10;").unwrap();
/// assert_eq!(value.to_string(), "28.0");
/// ```
pub fn eval_str(source: &str) -> Result<Value> {
    debug!("evaluating inline source");
    let engine = ScriptEngine::default();
    let registry = ModuleRegistry::new();
    let module = LoadedModule::new("snippet", ModuleOrigin::Host);
    let value = engine.execute_str(source, &module, &registry)?;
    Ok(value)
}

/// Load and execute the source at `path` with a fresh loader.
pub fn run_file(path: &Path) -> Result<ModuleHandle> {
    let mut loader = SourceLoader::new();
    let module = loader
        .load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(module)
}
