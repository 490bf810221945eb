//! Tree-walking evaluator

use super::collab::Collaborators;
use super::completion::Completion;
use super::context::RunContext;
use super::host::HostValue;
use super::meter::Meter;
use super::scope::FrameStack;
use super::value::{Heap, JsValue, host_size};
use super::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::ast::{
    AssignOp, Ast, BinaryOp, Function, Literal, LogicalOp, MemberProperty, Node, NodeId, Span, UnaryOp, UpdateOp,
};
use crate::config::InterpreterConfig;
use crate::decimal::Decimal;
use crate::error::{Result, SnippetError};
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

/// Builtin function type
pub type BuiltinFn = fn(&mut Interpreter<'_>, &[JsValue], Span) -> Result<JsValue>;

/// Assignable location, resolved once per assignment or update
#[derive(Debug, Clone)]
enum Place<'a> {
    Variable(&'a str),
    Member { object: JsValue, key: JsValue },
}

/// The interpreter. One instance serves exactly one call.
pub struct Interpreter<'a> {
    /// Program being run
    ast: &'a Ast,
    /// Top-level functions by name; a later declaration wins
    functions: HashMap<&'a str, NodeId>,
    /// Builtin functions
    builtins: HashMap<&'static str, BuiltinFn>,
    /// Injected external capabilities
    collaborators: &'a Collaborators,
    /// Arrays and objects created during this call
    heap: Heap,
    /// Call frames and pre-bound identifiers
    frames: FrameStack,
    /// Work budget
    meter: Meter,
    max_string_length: usize,
}

impl<'a> Interpreter<'a> {
    /// Create a new interpreter
    pub fn new(ast: &'a Ast, config: &InterpreterConfig, collaborators: &'a Collaborators) -> Self {
        let mut functions = HashMap::new();
        for (id, func) in ast.functions() {
            functions.insert(func.name.as_str(), id);
        }
        let mut interp = Interpreter {
            ast,
            functions,
            builtins: HashMap::new(),
            collaborators,
            heap: Heap::new(),
            frames: FrameStack::new(),
            meter: Meter::new(config.step_budget),
            max_string_length: config.max_string_length,
        };
        interp.register_builtins();
        interp
    }

    fn register_builtins(&mut self) {
        self.builtins.insert("executeToken", builtin_execute_token);
        self.builtins.insert("staticcallContract", builtin_staticcall_contract);
    }

    /// Budget units consumed so far
    pub fn budget_used(&self) -> u64 {
        self.meter.used()
    }

    /// Run the entry function selected by `context` and copy its result out of the heap
    pub fn run(&mut self, context: &RunContext) -> Result<HostValue> {
        for (name, value) in &context.identifiers {
            self.meter.charge(1 + host_size(value))?;
            let value = self.heap.import(value);
            self.frames.define_global(name.clone(), value);
        }

        let entry = self.entry_function(context.start_node)?;
        let mut args = Vec::with_capacity(context.args.len());
        for arg in &context.args {
            self.meter.charge(1 + host_size(arg))?;
            args.push(self.heap.import(arg));
        }

        log::debug!("running entry {entry} with {} args", args.len());
        let span = self.ast.span(entry);
        let result = self.call_function(entry, args, span)?;
        log::debug!("finished after {} budget units", self.meter.used());
        self.heap.export(&result, span)
    }

    fn entry_function(&self, start: NodeId) -> Result<NodeId> {
        if start == NodeId::ROOT {
            return match self.ast.functions().next() {
                Some((id, _)) => Ok(id),
                None => Err(SnippetError::reference("entry is not a function", self.ast.span(start))),
            };
        }
        match self.ast.get(start) {
            Some(Node::FunctionDecl(_)) => Ok(start),
            _ => Err(SnippetError::reference("entry is not a function", self.ast.span(start))),
        }
    }

    // ============================================
    // Calls
    // ============================================

    fn call_function(&mut self, func_id: NodeId, args: Vec<JsValue>, span: Span) -> Result<JsValue> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_function_inner(func_id, args, span)
        })
    }

    /// Inner function call implementation
    fn call_function_inner(&mut self, func_id: NodeId, args: Vec<JsValue>, span: Span) -> Result<JsValue> {
        self.meter.charge(1)?;
        let ast = self.ast;
        let Some(func) = ast[func_id].as_function() else {
            return Err(SnippetError::reference("entry is not a function", span));
        };
        self.frames.push_frame();
        log::trace!("call {}({} args) at depth {}", func.name, args.len(), self.frames.depth());
        let result = self.run_body(func, args);
        self.frames.pop_frame();
        result
    }

    /// Bind parameters in the fresh frame, then run the body and catch `Return`
    fn run_body(&mut self, func: &'a Function, args: Vec<JsValue>) -> Result<JsValue> {
        let mut args = args.into_iter();
        for param in &func.params {
            let value = match (args.next(), param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.eval(default)?,
                (None, None) => JsValue::Undefined,
            };
            self.frames.define(param.name.clone(), value);
        }

        match self.exec(func.body)? {
            Completion::Return(value) => Ok(value),
            _ => Ok(JsValue::Undefined),
        }
    }

    fn eval_call(&mut self, callee: NodeId, arguments: &'a [NodeId], span: Span) -> Result<JsValue> {
        let ast = self.ast;
        match &ast[callee] {
            Node::Identifier(name) => {
                let args = self.eval_list(arguments)?;
                if let Some(&func_id) = self.functions.get(name.as_str()) {
                    return self.call_function(func_id, args, span);
                }
                if let Some(builtin) = self.builtins.get(name.as_str()).copied() {
                    return builtin(self, &args, span);
                }
                Err(SnippetError::undefined_identifier(name, span))
            }
            Node::Member { object, property } => {
                let receiver = self.eval(*object)?;
                let method = match property {
                    MemberProperty::Named(name) => name.clone(),
                    MemberProperty::Computed(key) => {
                        let key = self.eval(*key)?;
                        self.heap.to_display_string(&key)
                    }
                };
                let args = self.eval_list(arguments)?;
                match (&receiver, method.as_str()) {
                    (JsValue::Array(array), "push") => {
                        self.meter.charge(args.len() as u64)?;
                        let elements = self.heap.array_mut(*array);
                        elements.extend(args);
                        Ok(JsValue::number(elements.len()))
                    }
                    _ => Err(SnippetError::undefined_identifier(&method, span)),
                }
            }
            _ => Err(SnippetError::undefined_identifier("<callee expression>", span)),
        }
    }

    fn eval_list(&mut self, nodes: &[NodeId]) -> Result<Vec<JsValue>> {
        nodes.iter().map(|&id| self.eval(id)).collect()
    }

    // ============================================
    // Statements
    // ============================================

    /// Execute a statement with automatic stack growth for deep recursion
    fn exec(&mut self, id: NodeId) -> Result<Completion> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.exec_inner(id))
    }

    fn exec_inner(&mut self, id: NodeId) -> Result<Completion> {
        self.meter.charge(1)?;
        let ast = self.ast;
        match &ast[id] {
            Node::VarDecl { declarations } => {
                for decl in declarations {
                    match decl.init {
                        Some(init) => {
                            let value = self.eval(init)?;
                            self.frames.define(decl.name.clone(), value);
                        }
                        // `var x;` keeps an existing binding
                        None if self.frames.is_local(&decl.name) => {}
                        None => self.frames.define(decl.name.clone(), JsValue::Undefined),
                    }
                }
                Ok(Completion::Normal)
            }
            Node::Block { body } | Node::Program { body } => self.exec_block(body),
            Node::If { test, consequent, alternate } => {
                if self.eval(*test)?.is_truthy() {
                    self.exec(*consequent)
                } else if let Some(alternate) = alternate {
                    self.exec(*alternate)
                } else {
                    Ok(Completion::Normal)
                }
            }
            Node::For { init, test, update, body } => {
                if let Some(init) = init {
                    self.exec_or_eval(*init)?;
                }
                self.run_loop(*test, *update, *body)
            }
            Node::While { test, body } => self.run_loop(Some(*test), None, *body),
            Node::Break => Ok(Completion::Break),
            Node::Continue => Ok(Completion::Continue),
            Node::Return { argument } => {
                let value = match argument {
                    Some(arg) => self.eval(*arg)?,
                    None => JsValue::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Node::Empty | Node::FunctionDecl(_) => Ok(Completion::Normal),
            Node::Expression { expression } => {
                self.eval(*expression)?;
                Ok(Completion::Normal)
            }
            _ => {
                self.eval(id)?;
                Ok(Completion::Normal)
            }
        }
    }

    fn exec_block(&mut self, body: &[NodeId]) -> Result<Completion> {
        for &stmt in body {
            let completion = self.exec(stmt)?;
            if completion.is_abrupt() {
                return Ok(completion);
            }
        }
        Ok(Completion::Normal)
    }

    /// `for` initializers are either a `var` statement or an expression
    fn exec_or_eval(&mut self, id: NodeId) -> Result<()> {
        if matches!(self.ast[id], Node::VarDecl { .. }) {
            self.exec(id)?;
        } else {
            self.eval(id)?;
        }
        Ok(())
    }

    fn run_loop(&mut self, test: Option<NodeId>, update: Option<NodeId>, body: NodeId) -> Result<Completion> {
        loop {
            if let Some(test) = test {
                if !self.eval(test)?.is_truthy() {
                    break;
                }
            }
            match self.exec(body)? {
                Completion::Break => break,
                Completion::Return(value) => return Ok(Completion::Return(value)),
                Completion::Normal | Completion::Continue => {}
            }
            if let Some(update) = update {
                self.eval(update)?;
            }
        }
        Ok(Completion::Normal)
    }

    // ============================================
    // Expressions
    // ============================================

    /// Evaluate an expression with automatic stack growth for deep recursion
    fn eval(&mut self, id: NodeId) -> Result<JsValue> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: NodeId) -> Result<JsValue> {
        self.meter.charge(1)?;
        let ast = self.ast;
        let span = ast.span(id);
        match &ast[id] {
            Node::Literal(literal) => Ok(match literal {
                Literal::Number(n) => JsValue::Number(n.clone()),
                Literal::String(s) => JsValue::string(s),
                Literal::Boolean(b) => JsValue::Boolean(*b),
                Literal::Null => JsValue::Null,
                Literal::Undefined => JsValue::Undefined,
            }),
            Node::Identifier(name) => self
                .frames
                .get(name)
                .cloned()
                .ok_or_else(|| SnippetError::undefined_identifier(name, span)),
            Node::Array { elements } => {
                let values = self.eval_list(elements)?;
                self.meter.charge(1 + values.len() as u64)?;
                Ok(JsValue::Array(self.heap.alloc_array(values)))
            }
            Node::Object { properties } => {
                let mut entries = Vec::with_capacity(properties.len());
                for prop in properties {
                    let value = self.eval(prop.value)?;
                    entries.push((Rc::from(prop.key.as_str()), value));
                }
                self.meter.charge(1 + entries.len() as u64)?;
                Ok(JsValue::Object(self.heap.alloc_object(entries)))
            }
            Node::Unary { op: UnaryOp::Typeof, argument } => {
                // `typeof` of an unbound name is "undefined", not an error
                if let Node::Identifier(name) = &ast[*argument] {
                    if self.frames.get(name).is_none() {
                        return Ok(JsValue::string("undefined"));
                    }
                }
                let value = self.eval(*argument)?;
                Ok(JsValue::string(value.type_name()))
            }
            Node::Unary { op, argument } => {
                let value = self.eval(*argument)?;
                Ok(unary(*op, &value))
            }
            Node::Update { op, prefix, argument } => {
                let (_, old, new) = self.apply_update(*op, *argument, span)?;
                Ok(if *prefix { new } else { JsValue::from_number(old) })
            }
            Node::Binary { op, left, right } => {
                let left = self.eval(*left)?;
                let right = self.eval(*right)?;
                self.binary(*op, &left, &right)
            }
            Node::Logical { op, left, right } => {
                let left = self.eval(*left)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                };
                if short_circuit { Ok(left) } else { self.eval(*right) }
            }
            Node::Assign { op, target, value } => self.eval_assign(*op, *target, *value, span),
            Node::Conditional { test, consequent, alternate } => {
                if self.eval(*test)?.is_truthy() {
                    self.eval(*consequent)
                } else {
                    self.eval(*alternate)
                }
            }
            Node::Sequence { expressions } => {
                let mut last = JsValue::Undefined;
                for &expr in expressions {
                    last = self.eval(expr)?;
                }
                Ok(last)
            }
            Node::Call { callee, arguments } => self.eval_call(*callee, arguments, span),
            Node::Member { object, property } => {
                let object = self.eval(*object)?;
                let key = self.property_key(property)?;
                self.get_member(&object, &key, span)
            }
            _ => Err(SnippetError::parse("expected an expression", span)),
        }
    }

    fn property_key(&mut self, property: &'a MemberProperty) -> Result<JsValue> {
        match property {
            MemberProperty::Named(name) => Ok(JsValue::string(name)),
            MemberProperty::Computed(expr) => self.eval(*expr),
        }
    }

    // ============================================
    // Assignment and update
    // ============================================

    fn resolve_place(&mut self, target: NodeId) -> Result<Place<'a>> {
        let ast = self.ast;
        match &ast[target] {
            Node::Identifier(name) => Ok(Place::Variable(name)),
            Node::Member { object, property } => {
                let object = self.eval(*object)?;
                let key = self.property_key(property)?;
                Ok(Place::Member { object, key })
            }
            _ => Err(SnippetError::parse("invalid assignment target", ast.span(target))),
        }
    }

    fn read_place(&mut self, place: &Place<'a>, span: Span) -> Result<JsValue> {
        match place {
            Place::Variable(name) => self
                .frames
                .get(name)
                .cloned()
                .ok_or_else(|| SnippetError::undefined_identifier(name, span)),
            Place::Member { object, key } => self.get_member(object, key, span),
        }
    }

    fn write_place(&mut self, place: &Place<'a>, value: JsValue, span: Span) -> Result<()> {
        match place {
            Place::Variable(name) => {
                if self.frames.set(name, value) {
                    Ok(())
                } else if self.frames.is_global(name) {
                    Err(SnippetError::reference(
                        format!("cannot assign to read-only identifier: {name}"),
                        span,
                    ))
                } else {
                    Err(SnippetError::undefined_identifier(name, span))
                }
            }
            Place::Member { object, key } => self.set_member(object, key, value, span),
        }
    }

    fn eval_assign(&mut self, op: AssignOp, target: NodeId, value: NodeId, span: Span) -> Result<JsValue> {
        let place = self.resolve_place(target)?;
        let new_value = match op.binary_op() {
            None => self.eval(value)?,
            Some(bin_op) => {
                let old = self.read_place(&place, span)?;
                let rhs = self.eval(value)?;
                self.binary(bin_op, &old, &rhs)?
            }
        };
        self.write_place(&place, new_value.clone(), span)?;
        Ok(new_value)
    }

    /// Apply `++`/`--` and return the place, the old numeric value and the stored value.
    /// A nested prefix update (`++++x`) first applies the inner one to the same place.
    fn apply_update(&mut self, op: UpdateOp, argument: NodeId, span: Span) -> Result<(Place<'a>, Option<Decimal>, JsValue)> {
        let ast = self.ast;
        let place = match &ast[argument] {
            Node::Update { op: inner_op, argument: inner, .. } => {
                self.meter.charge(1)?;
                self.apply_update(*inner_op, *inner, ast.span(argument))?.0
            }
            _ => self.resolve_place(argument)?,
        };
        let old = match self.read_place(&place, span)? {
            JsValue::Array(_) | JsValue::Object(_) => None,
            other => other.to_number(),
        };
        if let Some(n) = &old {
            self.meter.charge(n.limbs())?;
        }
        let one = Decimal::one();
        let new = JsValue::from_number(old.as_ref().map(|n| match op {
            UpdateOp::Increment => n.add(&one),
            UpdateOp::Decrement => n.sub(&one),
        }));
        self.write_place(&place, new.clone(), span)?;
        Ok((place, old, new))
    }

    // ============================================
    // Member access
    // ============================================

    fn get_member(&mut self, object: &JsValue, key: &JsValue, span: Span) -> Result<JsValue> {
        match object {
            JsValue::Array(array) => {
                let len = self.heap.array(*array).len();
                if matches!(key, JsValue::String(s) if &**s == "length") {
                    return Ok(JsValue::number(len));
                }
                let index = self.array_index(key, len, span)?;
                Ok(self.heap.array(*array)[index].clone())
            }
            JsValue::Object(obj) => {
                let key = self.heap.to_display_string(key);
                Ok(self.heap.property(*obj, &key).cloned().unwrap_or(JsValue::Undefined))
            }
            JsValue::String(s) if matches!(key, JsValue::String(k) if &**k == "length") => Ok(JsValue::number(s.len())),
            _ => Ok(JsValue::Undefined),
        }
    }

    fn set_member(&mut self, object: &JsValue, key: &JsValue, value: JsValue, span: Span) -> Result<()> {
        match object {
            JsValue::Array(array) => {
                let len = self.heap.array(*array).len();
                let index = self.array_index(key, len, span)?;
                self.heap.array_mut(*array)[index] = value;
            }
            JsValue::Object(obj) => {
                let key = self.heap.to_display_string(key);
                if self.heap.property(*obj, &key).is_none() {
                    self.meter.charge(1)?;
                }
                self.heap.set_property(*obj, &key, value);
            }
            // Writes to primitives are dropped
            _ => {}
        }
        Ok(())
    }

    /// Array index in `[0, len)`; anything else is a RangeError
    fn array_index(&self, key: &JsValue, len: usize, span: Span) -> Result<usize> {
        let number = match key {
            JsValue::Number(n) => Some(n.clone()),
            JsValue::Boolean(_) => key.to_number(),
            JsValue::String(s) if !s.trim().is_empty() => Decimal::parse(s),
            _ => None,
        };
        let Some(number) = number else {
            return Err(SnippetError::out_of_range(&self.heap.to_display_string(key), len, span));
        };
        match number.trunc().to_i64() {
            Some(index) if index >= 0 && (index as u64) < len as u64 => Ok(index as usize),
            _ => Err(SnippetError::out_of_range(&number.to_string(), len, span)),
        }
    }

    // ============================================
    // Operators
    // ============================================

    fn binary(&mut self, op: BinaryOp, left: &JsValue, right: &JsValue) -> Result<JsValue> {
        let value = match op {
            BinaryOp::Add => return self.add(left, right),
            BinaryOp::Sub => self.numeric(op, left, right, |a, b| Some(a.sub(b)))?,
            BinaryOp::Mul => self.numeric(op, left, right, |a, b| Some(a.mul(b)))?,
            BinaryOp::Div => self.numeric(op, left, right, |a, b| a.div(b))?,
            BinaryOp::Rem => self.numeric(op, left, right, |a, b| a.rem(b))?,
            BinaryOp::Exp => match (left.to_number(), right.to_number()) {
                (Some(base), Some(exponent)) => {
                    let meter = &mut self.meter;
                    JsValue::from_number(base.pow(&exponent, |units| meter.charge(units))?)
                }
                _ => JsValue::NaN,
            },
            BinaryOp::BitAnd => JsValue::number(to_int32(left) & to_int32(right)),
            BinaryOp::BitOr => JsValue::number(to_int32(left) | to_int32(right)),
            BinaryOp::BitXor => JsValue::number(to_int32(left) ^ to_int32(right)),
            BinaryOp::Shl => JsValue::number(to_int32(left).wrapping_shl(shift_count(right, 31))),
            BinaryOp::Shr => JsValue::number(to_int32(left).wrapping_shr(shift_count(right, 31))),
            BinaryOp::UShr => {
                let bits = left.to_number().map_or(0, |n| n.to_u64_wrapping());
                JsValue::number(bits >> shift_count(right, 63))
            }
            BinaryOp::StrictEq => JsValue::Boolean(strict_equals(left, right)),
            BinaryOp::StrictNe => JsValue::Boolean(!strict_equals(left, right)),
            BinaryOp::Eq => JsValue::Boolean(self.loose_equals(left, right)),
            BinaryOp::Ne => JsValue::Boolean(!self.loose_equals(left, right)),
            BinaryOp::Lt => JsValue::Boolean(compare(left, right).is_some_and(Ordering::is_lt)),
            BinaryOp::Gt => JsValue::Boolean(compare(left, right).is_some_and(Ordering::is_gt)),
            BinaryOp::Le => JsValue::Boolean(compare(left, right).is_some_and(Ordering::is_le)),
            BinaryOp::Ge => JsValue::Boolean(compare(left, right).is_some_and(Ordering::is_ge)),
        };
        Ok(value)
    }

    /// `+`: objects give NaN, strings and arrays concatenate, everything else adds
    fn add(&mut self, left: &JsValue, right: &JsValue) -> Result<JsValue> {
        let is_textual = |v: &JsValue| matches!(v, JsValue::String(_) | JsValue::Array(_));
        if matches!(left, JsValue::Object(_)) || matches!(right, JsValue::Object(_)) {
            return Ok(JsValue::NaN);
        }
        if is_textual(left) || is_textual(right) {
            let mut text = self.heap.to_display_string(left);
            text.push_str(&self.heap.to_display_string(right));
            if text.len() > self.max_string_length {
                return Err(SnippetError::exhausted(format!(
                    "string length {} exceeds limit {}",
                    text.len(),
                    self.max_string_length
                )));
            }
            self.meter.charge(1 + text.len() as u64 / 64)?;
            return Ok(JsValue::String(Rc::from(text)));
        }
        self.numeric(BinaryOp::Add, left, right, |a, b| Some(a.add(b)))
    }

    /// Coerce both sides, charge for the word work, then apply `f`
    fn numeric(
        &mut self,
        op: BinaryOp,
        left: &JsValue,
        right: &JsValue,
        f: impl FnOnce(&Decimal, &Decimal) -> Option<Decimal>,
    ) -> Result<JsValue> {
        let (Some(a), Some(b)) = (left.to_number(), right.to_number()) else {
            return Ok(JsValue::NaN);
        };
        self.meter.charge(arithmetic_cost(op, &a, &b))?;
        Ok(JsValue::from_number(f(&a, &b)))
    }

    fn loose_equals(&self, left: &JsValue, right: &JsValue) -> bool {
        use JsValue as V;
        match (left, right) {
            (V::Null | V::Undefined, V::Null | V::Undefined) => true,
            (V::Null | V::Undefined, _) | (_, V::Null | V::Undefined) => false,
            (V::NaN, _) | (_, V::NaN) => false,
            (V::Array(_) | V::Object(_), V::Array(_) | V::Object(_)) => strict_equals(left, right),
            (V::Array(_) | V::Object(_), _) => {
                let text = JsValue::string(&self.heap.to_display_string(left));
                self.loose_equals(&text, right)
            }
            (_, V::Array(_) | V::Object(_)) => self.loose_equals(right, left),
            (V::String(_), V::String(_)) | (V::Number(_), V::Number(_)) | (V::Boolean(_), V::Boolean(_)) => {
                strict_equals(left, right)
            }
            _ => match (left.to_number(), right.to_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

fn unary(op: UnaryOp, value: &JsValue) -> JsValue {
    match op {
        UnaryOp::Plus => JsValue::from_number(value.to_number()),
        UnaryOp::Minus => JsValue::from_number(value.to_number().map(|n| n.neg())),
        UnaryOp::Not => JsValue::Boolean(!value.is_truthy()),
        UnaryOp::BitNot => JsValue::number(!to_int32(value)),
        UnaryOp::Typeof => JsValue::string(value.type_name()),
        UnaryOp::Void => JsValue::Undefined,
    }
}

/// Coerce both sides to numbers; NaN on either side, or a `None` result, is NaN
/// Multiplicative steps are quadratic in operand words, the rest linear
fn arithmetic_cost(op: BinaryOp, a: &Decimal, b: &Decimal) -> u64 {
    match op {
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => a.limbs().saturating_mul(b.limbs()),
        _ => a.limbs().max(b.limbs()),
    }
}

fn to_int32(value: &JsValue) -> i32 {
    value.to_number().map_or(0, |n| n.to_i32_wrapping())
}

fn shift_count(value: &JsValue, mask: u32) -> u32 {
    (to_int32(value) as u32) & mask
}

fn strict_equals(left: &JsValue, right: &JsValue) -> bool {
    match (left, right) {
        (JsValue::Number(a), JsValue::Number(b)) => a == b,
        (JsValue::String(a), JsValue::String(b)) => a == b,
        (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
        (JsValue::Null, JsValue::Null) | (JsValue::Undefined, JsValue::Undefined) => true,
        (JsValue::Array(a), JsValue::Array(b)) => a == b,
        (JsValue::Object(a), JsValue::Object(b)) => a == b,
        _ => false,
    }
}

/// Relational ordering; `None` when either side is NaN after coercion
fn compare(left: &JsValue, right: &JsValue) -> Option<Ordering> {
    if let (JsValue::String(a), JsValue::String(b)) = (left, right) {
        return Some(a.as_bytes().cmp(b.as_bytes()));
    }
    Some(left.to_number()?.compare(&right.to_number()?))
}

fn builtin_execute_token(interp: &mut Interpreter<'_>, args: &[JsValue], span: Span) -> Result<JsValue> {
    let id = args
        .first()
        .and_then(JsValue::to_number)
        .ok_or_else(|| SnippetError::collaborator("executeToken: token id must be a number"))?;
    let rest = args
        .iter()
        .skip(1)
        .map(|v| interp.heap.export(v, span))
        .collect::<Result<Vec<_>>>()?;
    let result = interp.collaborators.execute_token(&id, &rest)?;
    interp.meter.charge(1 + host_size(&result))?;
    Ok(interp.heap.import(&result))
}

fn builtin_staticcall_contract(interp: &mut Interpreter<'_>, args: &[JsValue], span: Span) -> Result<JsValue> {
    let text = |i: usize| args.get(i).map(|v| interp.heap.to_display_string(v)).unwrap_or_default();
    let address = text(0);
    let signature = text(1);
    let return_type = match args.get(2) {
        Some(v) => interp.heap.export(v, span)?,
        None => HostValue::Undefined,
    };
    let rest = args
        .iter()
        .skip(3)
        .map(|v| interp.heap.export(v, span))
        .collect::<Result<Vec<_>>>()?;
    let result = interp
        .collaborators
        .static_call(&address, &signature, &return_type, &rest)?;
    interp.meter.charge(1 + host_size(&result))?;
    Ok(interp.heap.import(&result))
}
