//! Static analysis over a built program
//!
//! Nothing here evaluates code. `parse_signature` reads the entry function's
//! header and `trace_dependencies` lists the token ids and contract addresses
//! that `executeToken` / `staticcallContract` call sites would reach.

use crate::ast::{Ast, Literal, MemberProperty, Node, NodeId};
use crate::decimal::Decimal;
use crate::error::{Result, SnippetError};
use crate::interp::{HostValue, RunContext};
use serde::Serialize;
use std::collections::HashMap;

/// Name and ordered parameter names of the entry function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub args: Vec<String>,
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}

/// External resources a program would touch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependencies {
    pub contract_dependees: Vec<String>,
    pub exe_token_dependees: Vec<Decimal>,
}

/// Read the first top-level function's name and parameters
pub fn parse_signature(ast: &Ast) -> Result<Signature> {
    let Some((_, func)) = ast.functions().next() else {
        return Err(SnippetError::parse("no function declaration", ast.span(NodeId::ROOT)));
    };
    Ok(Signature {
        name: func.name.clone(),
        args: func.params.iter().map(|p| p.name.clone()).collect(),
    })
}

/// Constant seen as the first argument of a call site
#[derive(Debug, Clone)]
enum Constant {
    Number(Decimal),
    String(String),
}

impl Constant {
    fn from_literal(literal: &Literal) -> Option<Self> {
        match literal {
            Literal::Number(n) => Some(Constant::Number(n.clone())),
            Literal::String(s) => Some(Constant::String(s.clone())),
            _ => None,
        }
    }

    fn from_host(value: &HostValue) -> Option<Self> {
        match value {
            HostValue::Number(n) => Some(Constant::Number(n.clone())),
            HostValue::String(s) => Some(Constant::String(s.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Callee {
    Token,
    Contract,
}

/// List the dependees of every top-level function.
///
/// Call sites with a literal first argument come first, then those whose
/// argument resolves through a single `var x = <literal>` binding, each group
/// in source order. Repeats keep their first position.
pub fn trace_dependencies(ast: &Ast, context: &RunContext) -> Dependencies {
    let globals: HashMap<&str, Constant> = context
        .identifiers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), Constant::from_host(value)?)))
        .collect();

    let mut literal_sites = Vec::new();
    let mut resolved_sites = Vec::new();

    for (func_id, _) in ast.functions() {
        let nodes = collect_nodes(ast, func_id);
        let bindings = single_bindings(ast, func_id, &nodes);

        for &id in &nodes {
            let Node::Call { callee, arguments } = &ast[id] else {
                continue;
            };
            let kind = match &ast[*callee] {
                Node::Identifier(name) if name == "executeToken" => Callee::Token,
                Node::Identifier(name) if name == "staticcallContract" => Callee::Contract,
                _ => continue,
            };
            let Some(&first) = arguments.first() else {
                continue;
            };
            match &ast[first] {
                Node::Literal(literal) => {
                    if let Some(constant) = Constant::from_literal(literal) {
                        literal_sites.push((kind, constant));
                    }
                }
                Node::Identifier(name) => {
                    let constant = match bindings.get(name.as_str()) {
                        Some(Binding::Single(constant)) => Some(constant.clone()),
                        Some(_) => None,
                        None => globals.get(name.as_str()).cloned(),
                    };
                    match constant {
                        Some(constant) => resolved_sites.push((kind, constant)),
                        None => log::debug!("skipping unresolvable call site {id}"),
                    }
                }
                _ => log::debug!("skipping dynamic call site {id}"),
            }
        }
    }

    let mut deps = Dependencies::default();
    for (kind, constant) in literal_sites.into_iter().chain(resolved_sites) {
        match (kind, constant) {
            (Callee::Token, Constant::Number(id)) => {
                if !deps.exe_token_dependees.contains(&id) {
                    deps.exe_token_dependees.push(id);
                }
            }
            (Callee::Contract, Constant::String(address)) => {
                if !deps.contract_dependees.contains(&address) {
                    deps.contract_dependees.push(address);
                }
            }
            _ => {}
        }
    }
    log::debug!(
        "traced {} contracts, {} tokens",
        deps.contract_dependees.len(),
        deps.exe_token_dependees.len()
    );
    deps
}

/// Every node reachable from `root`, in source order
fn collect_nodes(ast: &Ast, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        out.push(id);
        let mut children = children(&ast[id]);
        children.reverse();
        stack.extend(children);
    }
    out
}

fn children(node: &Node) -> Vec<NodeId> {
    match node {
        Node::Program { body } | Node::Block { body } => body.clone(),
        Node::FunctionDecl(func) => func
            .params
            .iter()
            .filter_map(|p| p.default)
            .chain(std::iter::once(func.body))
            .collect(),
        Node::VarDecl { declarations } => declarations.iter().filter_map(|d| d.init).collect(),
        Node::If { test, consequent, alternate } => {
            let mut ids = vec![*test, *consequent];
            ids.extend(*alternate);
            ids
        }
        Node::For { init, test, update, body } => {
            let mut ids: Vec<NodeId> = [*init, *test, *update].into_iter().flatten().collect();
            ids.push(*body);
            ids
        }
        Node::While { test, body } => vec![*test, *body],
        Node::Return { argument } => argument.iter().copied().collect(),
        Node::Expression { expression } => vec![*expression],
        Node::Binary { left, right, .. } | Node::Logical { left, right, .. } => vec![*left, *right],
        Node::Unary { argument, .. } | Node::Update { argument, .. } => vec![*argument],
        Node::Assign { target, value, .. } => vec![*target, *value],
        Node::Conditional { test, consequent, alternate } => vec![*test, *consequent, *alternate],
        Node::Sequence { expressions } | Node::Array { elements: expressions } => expressions.clone(),
        Node::Call { callee, arguments } => std::iter::once(*callee).chain(arguments.iter().copied()).collect(),
        Node::Member { object, property } => match property {
            MemberProperty::Named(_) => vec![*object],
            MemberProperty::Computed(key) => vec![*object, *key],
        },
        Node::Object { properties } => properties.iter().map(|p| p.value).collect(),
        Node::Break | Node::Continue | Node::Empty | Node::Identifier(_) | Node::Literal(_) => Vec::new(),
    }
}

#[derive(Debug)]
enum Binding {
    Single(Constant),
    /// Parameter, reassigned, or bound to something other than a literal
    Unresolvable,
}

/// Names in one function bound exactly once to a literal
fn single_bindings<'a>(ast: &'a Ast, func_id: NodeId, nodes: &[NodeId]) -> HashMap<&'a str, Binding> {
    let mut bindings: HashMap<&'a str, Binding> = HashMap::new();
    if let Some(func) = ast[func_id].as_function() {
        for param in &func.params {
            bindings.insert(param.name.as_str(), Binding::Unresolvable);
        }
    }

    let mut bind = |name: &'a str, constant: Option<Constant>| {
        let entry = match (bindings.contains_key(name), constant) {
            (false, Some(constant)) => Binding::Single(constant),
            _ => Binding::Unresolvable,
        };
        bindings.insert(name, entry);
    };

    for &id in nodes {
        match &ast[id] {
            Node::VarDecl { declarations } => {
                for decl in declarations {
                    let constant = match decl.init.map(|init| &ast[init]) {
                        Some(Node::Literal(literal)) => Constant::from_literal(literal),
                        _ => None,
                    };
                    bind(decl.name.as_str(), constant);
                }
            }
            Node::Assign { target, .. } | Node::Update { argument: target, .. } => {
                if let Node::Identifier(name) = &ast[*target] {
                    bind(name.as_str(), None);
                }
            }
            _ => {}
        }
    }
    bindings
}
