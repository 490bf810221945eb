//! SnippetJS CLI

use clap::{Parser, Subcommand};
use snippetjs::config::{InterpreterConfig, RunContextFile};
use snippetjs::error::report_error;
use snippetjs::interp::{Collaborators, RunContext};
use snippetjs::lexer::TokenRecord;
use snippetjs::{SnippetError, build, tokenize};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "snippetjs", version, about = "SnippetJS - metered JavaScript subset interpreter")]
struct Cli {
    /// Log pipeline stages (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tokenize and dump tokens as JSON
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// Build and dump the AST arena as JSON
    Ast {
        /// Source file to parse
        file: PathBuf,
    },
    /// Run the entry function and print the result
    Run {
        /// Source file to run
        file: PathBuf,
        /// Run context (JSON)
        #[arg(long)]
        context: Option<PathBuf>,
        /// Interpreter limits (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the entry function's signature
    Signature {
        /// Source file to inspect
        file: PathBuf,
    },
    /// Print the token ids and contract addresses the program depends on
    Deps {
        /// Source file to inspect
        file: PathBuf,
        /// Run context (JSON)
        #[arg(long)]
        context: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let result = match cli.command {
        Command::Tokens { file } => tokenize_file(&file),
        Command::Ast { file } => ast_file(&file),
        Command::Run { file, context, config } => run_file(&file, context.as_deref(), config.as_deref()),
        Command::Signature { file } => signature_file(&file),
        Command::Deps { file, context } => deps_file(&file, context.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Attach an ariadne report to library errors before they reach `main`
fn reported<T>(path: &Path, source: &str, result: Result<T, SnippetError>) -> Result<T, SnippetError> {
    if let Err(e) = &result {
        report_error(&path.display().to_string(), source, e);
    }
    result
}

fn load_context(path: Option<&Path>) -> Result<RunContext, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(RunContextFile::load(path)?.into_context()),
        None => Ok(RunContext::new()),
    }
}

fn tokenize_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let tokens = reported(path, &source, tokenize(&source))?;
    let records: Vec<TokenRecord> = tokens.iter().map(TokenRecord::from).collect();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn ast_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let ast = reported(path, &source, tokenize(&source).and_then(|t| build(&t)))?;
    println!("{}", serde_json::to_string_pretty(&ast)?);
    Ok(())
}

fn run_file(path: &Path, context: Option<&Path>, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let context = load_context(context)?;
    let config = match config {
        Some(path) => InterpreterConfig::load(path)?,
        None => InterpreterConfig::default(),
    };

    let collaborators = Collaborators::new();
    let result = reported(
        path,
        &source,
        tokenize(&source)
            .and_then(|t| build(&t))
            .and_then(|ast| snippetjs::interpret_with(&ast, &context, &config, &collaborators)),
    )?;
    println!("{result}");
    Ok(())
}

fn signature_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let signature = reported(
        path,
        &source,
        tokenize(&source)
            .and_then(|t| build(&t))
            .and_then(|ast| snippetjs::parse_signature(&ast)),
    )?;
    println!("{signature}");
    Ok(())
}

fn deps_file(path: &Path, context: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let context = load_context(context)?;

    let ast = reported(path, &source, tokenize(&source).and_then(|t| build(&t)))?;
    let deps = snippetjs::trace_dependencies(&ast, &context);
    println!("{}", serde_json::to_string_pretty(&deps)?);
    Ok(())
}
