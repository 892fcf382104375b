//! The rigscript language: lexer, parser and evaluator.

pub mod builtins;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod value;

pub use error::{ScriptError, ScriptResult};

use parser::ast::Program;

/// Lex and parse a source string.
pub fn compile(source: &str) -> ScriptResult<Program> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(&tokens)?;
    Ok(program)
}
