//! Abstract Syntax Tree definitions
//!
//! Nodes live in one flat arena and refer to their children by `NodeId`.
//! The `Program` node is always at index 0.

mod ops;
mod span;

pub use ops::*;
pub use span::*;

use crate::decimal::Decimal;
use serde::Serialize;

/// Index of a node in its `Ast` arena
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Function declaration
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    /// Always a `Block`
    pub body: NodeId,
}

/// Function parameter with an optional default expression
#[derive(Debug, Clone, Serialize)]
pub struct Param {
    pub name: String,
    pub default: Option<NodeId>,
}

/// One `name = init` inside a `var` statement
#[derive(Debug, Clone, Serialize)]
pub struct Declarator {
    pub name: String,
    pub init: Option<NodeId>,
}

/// Object literal entry. Duplicate keys are kept here and resolved at evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub key: String,
    pub value: NodeId,
}

/// Member access property
#[derive(Debug, Clone, Serialize)]
pub enum MemberProperty {
    /// `object.name`
    Named(String),
    /// `object[expr]`
    Computed(NodeId),
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Number(Decimal),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

/// Arena node
#[derive(Debug, Clone, Serialize)]
pub enum Node {
    Program {
        body: Vec<NodeId>,
    },
    FunctionDecl(Function),

    // Statements
    VarDecl {
        declarations: Vec<Declarator>,
    },
    Block {
        body: Vec<NodeId>,
    },
    If {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    For {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    While {
        test: NodeId,
        body: NodeId,
    },
    Break,
    Continue,
    Return {
        argument: Option<NodeId>,
    },
    Empty,
    Expression {
        expression: NodeId,
    },

    // Expressions
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Logical {
        op: LogicalOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOp,
        argument: NodeId,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        argument: NodeId,
    },
    Assign {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },
    Conditional {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    Sequence {
        expressions: Vec<NodeId>,
    },
    Call {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    Member {
        object: NodeId,
        property: MemberProperty,
    },
    /// Elided elements are not stored
    Array {
        elements: Vec<NodeId>,
    },
    Object {
        properties: Vec<Property>,
    },
    Identifier(String),
    Literal(Literal),
}

impl Node {
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Node::FunctionDecl(func) => Some(func),
            _ => None,
        }
    }

    /// Whether the node can be the target of `=` or `++`
    pub fn is_assignable(&self) -> bool {
        matches!(self, Node::Identifier(_) | Node::Member { .. })
    }
}

/// Flat node arena produced by `build`
#[derive(Debug, Clone, Serialize)]
pub struct Ast {
    nodes: Vec<Spanned<Node>>,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    /// Create an arena holding an empty `Program` at the root
    pub fn new() -> Self {
        Ast {
            nodes: vec![Spanned::new(Node::Program { body: Vec::new() }, Span::default())],
        }
    }

    pub fn push(&mut self, node: Node, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Spanned::new(node, span));
        id
    }

    /// Replace a node in place. Used to finish the root once its body is known.
    pub fn replace(&mut self, id: NodeId, node: Node, span: Span) {
        self.nodes[id.0] = Spanned::new(node, span);
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).map(|n| &n.node)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes.get(id.0).map(|n| n.span).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level statements of the program
    pub fn program_body(&self) -> &[NodeId] {
        match &self[NodeId::ROOT] {
            Node::Program { body } => body,
            _ => &[],
        }
    }

    /// Top-level function declarations in source order
    pub fn functions(&self) -> impl Iterator<Item = (NodeId, &Function)> + '_ {
        self.program_body()
            .iter()
            .filter_map(|&id| self[id].as_function().map(|f| (id, f)))
    }
}

impl std::ops::Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0].node
    }
}
