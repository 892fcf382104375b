//! Script pipeline errors.

use std::path::PathBuf;

use crate::script::eval::EvalError;
use crate::script::lexer::LexError;
use crate::script::parser::ParseError;

/// Any failure while reading, lexing, parsing or evaluating a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ScriptResult<T> = Result<T, ScriptError>;
