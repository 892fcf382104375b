//! Execution capability used by the loader.

use std::fs;
use std::path::Path;

use crate::loader::module::ModuleHandle;
use crate::loader::registry::ModuleRegistry;
use crate::script::error::{ScriptError, ScriptResult};
use crate::script::eval::{run_program, EngineConfig};
use crate::script::value::Value;

/// Executes source text into a module's namespace.
///
/// The loader needs exactly this capability and nothing more about the
/// language. Tests substitute engines that record calls or fail on demand.
pub trait SourceEngine {
    /// Run a source string against `module`'s namespace.
    fn execute_str(
        &self,
        source: &str,
        module: &ModuleHandle,
        registry: &ModuleRegistry,
    ) -> ScriptResult<Value>;

    /// Read and run a source file against `module`'s namespace.
    fn execute_file(
        &self,
        path: &Path,
        module: &ModuleHandle,
        registry: &ModuleRegistry,
    ) -> ScriptResult<Value> {
        let source = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.execute_str(&source, module, registry)
    }
}

/// The stock rigscript engine.
#[derive(Debug, Clone, Default)]
pub struct ScriptEngine {
    config: EngineConfig,
}

impl ScriptEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl SourceEngine for ScriptEngine {
    fn execute_str(
        &self,
        source: &str,
        module: &ModuleHandle,
        registry: &ModuleRegistry,
    ) -> ScriptResult<Value> {
        let program = crate::script::compile(source)?;
        Ok(run_program(&program, module, registry, &self.config)?)
    }
}
