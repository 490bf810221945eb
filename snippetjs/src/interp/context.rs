//! Per-call run context

use super::HostValue;
use crate::ast::NodeId;

/// What one interpretation call starts from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    /// `NodeId::ROOT` runs the first top-level function; otherwise a `FunctionDecl` node
    pub start_node: NodeId,
    /// Positional arguments for the entry function
    pub args: Vec<HostValue>,
    /// Read-only globals such as `tokenAttributes`
    pub identifiers: Vec<(String, HostValue)>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(mut self, node: NodeId) -> Self {
        self.start_node = node;
        self
    }

    pub fn with_args(mut self, args: Vec<HostValue>) -> Self {
        self.args = args;
        self
    }

    pub fn with_identifier(mut self, name: &str, value: HostValue) -> Self {
        self.identifiers.push((name.to_string(), value));
        self
    }
}
