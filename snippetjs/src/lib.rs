//! SnippetJS Library
//!
//! Metered, deterministic interpreter for a small JavaScript subset with
//! 18-digit fixed-point numbers.
//!
//! The pipeline is `tokenize` → `build` → `interpret_with_state`.

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod decimal;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;

pub use analyzer::{Dependencies, Signature, parse_signature, trace_dependencies};
pub use ast::{Ast, NodeId, Span};
pub use config::InterpreterConfig;
pub use error::{Result, SnippetError};
pub use interp::{Collaborators, HostValue, RunContext};
pub use lexer::tokenize;
pub use parser::build;

/// Run a built program with default limits and no collaborators
pub fn interpret_with_state(ast: &Ast, context: &RunContext) -> Result<HostValue> {
    interpret_with(ast, context, &InterpreterConfig::default(), &Collaborators::new())
}

/// Run a built program with explicit limits and collaborators
pub fn interpret_with(
    ast: &Ast,
    context: &RunContext,
    config: &InterpreterConfig,
    collaborators: &Collaborators,
) -> Result<HostValue> {
    let mut interpreter = interp::Interpreter::new(ast, config, collaborators);
    interpreter.run(context)
}

/// Tokenize, build and run `source`, then serialize the result
pub fn interpret_to_string(source: &str) -> Result<String> {
    let tokens = tokenize(source)?;
    let ast = build(&tokens)?;
    let result = interpret_with_state(&ast, &RunContext::new())?;
    Ok(result.to_string())
}
