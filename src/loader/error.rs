//! Loader errors.

use std::path::PathBuf;

use crate::script::ScriptError;

/// Load failure
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The path is neither a package directory nor a `.rig` source file.
    #[error("specified path `{}` is not a rig source file or package directory", .path.display())]
    InvalidSource { path: PathBuf },
    /// The source was recognized but could not be read or executed.
    #[error(transparent)]
    Script(#[from] ScriptError),
}

pub type LoadResult<T> = Result<T, LoadError>;
