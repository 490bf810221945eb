//! Interpreter limits and run contexts loaded from files
//!
//! Limits come from TOML, run contexts from JSON. Every key is optional.

use crate::ast::NodeId;
use crate::interp::{HostValue, RunContext};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Failure while reading a configuration or context file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Execution limits for one interpretation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Work units available to the call
    pub step_budget: u64,
    /// Longest string a concatenation may produce, in bytes
    pub max_string_length: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            step_budget: 1_000_000,
            max_string_length: 1 << 20,
        }
    }
}

impl InterpreterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read_file(path)?)
    }

    pub fn with_step_budget(mut self, step_budget: u64) -> Self {
        self.step_budget = step_budget;
        self
    }
}

/// Named pre-bound identifier in a context file
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifierEntry {
    pub name: String,
    pub value: serde_json::Value,
}

/// JSON form of a run context
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunContextFile {
    pub start_node_index: usize,
    pub args: Vec<serde_json::Value>,
    pub identifiers: Vec<IdentifierEntry>,
}

impl RunContextFile {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_file(path)?)
    }

    pub fn into_context(self) -> RunContext {
        let mut context = RunContext::new()
            .starting_at(NodeId(self.start_node_index))
            .with_args(self.args.iter().map(HostValue::from_json).collect());
        for entry in &self.identifiers {
            context = context.with_identifier(&entry.name, HostValue::from_json(&entry.value));
        }
        context
    }
}
