//! Runtime values and the per-call heap

use super::host::HostValue;
use super::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::ast::Span;
use crate::decimal::Decimal;
use crate::error::{Result, SnippetError};
use std::collections::HashSet;
use std::rc::Rc;

/// Handle to an array on the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayRef(usize);

/// Handle to an object on the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRef(usize);

/// Runtime value
///
/// Arrays and objects are handles: cloning a value aliases the same storage.
#[derive(Debug, Clone)]
pub enum JsValue {
    Number(Decimal),
    NaN,
    String(Rc<str>),
    Boolean(bool),
    Null,
    Undefined,
    Array(ArrayRef),
    Object(ObjectRef),
}

impl JsValue {
    pub fn string(s: &str) -> Self {
        JsValue::String(Rc::from(s))
    }

    pub fn number(n: impl Into<Decimal>) -> Self {
        JsValue::Number(n.into())
    }

    /// Check if value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            JsValue::Number(n) => !n.is_zero(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Boolean(b) => *b,
            JsValue::NaN | JsValue::Null | JsValue::Undefined => false,
            JsValue::Array(_) | JsValue::Object(_) => true,
        }
    }

    /// Result of `typeof`
    pub fn type_name(&self) -> &'static str {
        match self {
            JsValue::Number(_) | JsValue::NaN => "number",
            JsValue::String(_) => "string",
            JsValue::Boolean(_) => "boolean",
            JsValue::Undefined => "undefined",
            JsValue::Null | JsValue::Array(_) | JsValue::Object(_) => "object",
        }
    }

    /// Number coercion; `None` is NaN
    pub fn to_number(&self) -> Option<Decimal> {
        match self {
            JsValue::Number(n) => Some(n.clone()),
            JsValue::String(s) => Decimal::parse(s),
            JsValue::Boolean(b) => Some(Decimal::from(i64::from(*b))),
            JsValue::Null => Some(Decimal::zero()),
            JsValue::NaN | JsValue::Undefined | JsValue::Array(_) | JsValue::Object(_) => None,
        }
    }

    pub fn from_number(n: Option<Decimal>) -> Self {
        match n {
            Some(n) => JsValue::Number(n),
            None => JsValue::NaN,
        }
    }
}

/// Append-only storage for the arrays and objects created during one call
#[derive(Debug, Default)]
pub struct Heap {
    arrays: Vec<Vec<JsValue>>,
    objects: Vec<Vec<(Rc<str>, JsValue)>>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_array(&mut self, elements: Vec<JsValue>) -> ArrayRef {
        self.arrays.push(elements);
        ArrayRef(self.arrays.len() - 1)
    }

    /// Allocate an object. A repeated key keeps its first position and its last value.
    pub fn alloc_object(&mut self, entries: Vec<(Rc<str>, JsValue)>) -> ObjectRef {
        let mut props: Vec<(Rc<str>, JsValue)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match props.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => props.push((key, value)),
            }
        }
        self.objects.push(props);
        ObjectRef(self.objects.len() - 1)
    }

    pub fn array(&self, array: ArrayRef) -> &[JsValue] {
        &self.arrays[array.0]
    }

    pub fn array_mut(&mut self, array: ArrayRef) -> &mut Vec<JsValue> {
        &mut self.arrays[array.0]
    }

    pub fn property(&self, object: ObjectRef, key: &str) -> Option<&JsValue> {
        self.objects[object.0]
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v)
    }

    /// Overwrite a property or append it
    pub fn set_property(&mut self, object: ObjectRef, key: &str, value: JsValue) {
        let props = &mut self.objects[object.0];
        match props.iter_mut().find(|(k, _)| &**k == key) {
            Some(slot) => slot.1 = value,
            None => props.push((Rc::from(key), value)),
        }
    }

    /// String form used by `+` and for property keys.
    /// Arrays join their elements with `,`; a cycle contributes an empty string.
    pub fn to_display_string(&self, value: &JsValue) -> String {
        let mut out = String::new();
        let mut active = HashSet::new();
        self.write_display(value, &mut out, &mut active);
        out
    }

    fn write_display(&self, value: &JsValue, out: &mut String, active: &mut HashSet<ArrayRef>) {
        match value {
            JsValue::Number(n) => out.push_str(&n.to_string()),
            JsValue::NaN => out.push_str("NaN"),
            JsValue::String(s) => out.push_str(s),
            JsValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            JsValue::Null => out.push_str("null"),
            JsValue::Undefined => out.push_str("undefined"),
            JsValue::Object(_) => out.push_str("[object Object]"),
            JsValue::Array(array) => {
                if !active.insert(*array) {
                    return;
                }
                for (i, element) in self.array(*array).iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    // `[null]` and `[undefined]` join as empty strings
                    if !matches!(element, JsValue::Null | JsValue::Undefined) {
                        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                            self.write_display(element, out, active)
                        });
                    }
                }
                active.remove(array);
            }
        }
    }

    /// Copy a runtime value out of the heap. A cyclic value is a RangeError at `span`.
    pub fn export(&self, value: &JsValue, span: Span) -> Result<HostValue> {
        let mut active = HashSet::new();
        self.export_inner(value, &mut active, span)
    }

    fn export_inner(&self, value: &JsValue, active: &mut HashSet<(bool, usize)>, span: Span) -> Result<HostValue> {
        let host = match value {
            JsValue::Number(n) => HostValue::Number(n.clone()),
            JsValue::NaN => HostValue::NaN,
            JsValue::String(s) => HostValue::String(s.to_string()),
            JsValue::Boolean(b) => HostValue::Boolean(*b),
            JsValue::Null => HostValue::Null,
            JsValue::Undefined => HostValue::Undefined,
            JsValue::Array(array) => {
                let marker = (true, array.0);
                if !active.insert(marker) {
                    return Err(SnippetError::range("cannot export a cyclic array", span));
                }
                let items = self
                    .array(*array)
                    .iter()
                    .map(|v| self.export_nested(v, active, span))
                    .collect::<Result<Vec<_>>>()?;
                active.remove(&marker);
                HostValue::Array(items)
            }
            JsValue::Object(object) => {
                let marker = (false, object.0);
                if !active.insert(marker) {
                    return Err(SnippetError::range("cannot export a cyclic object", span));
                }
                let mut props = Vec::with_capacity(self.objects[object.0].len());
                for (key, v) in &self.objects[object.0] {
                    props.push((key.to_string(), self.export_nested(v, active, span)?));
                }
                active.remove(&marker);
                HostValue::Object(props)
            }
        };
        Ok(host)
    }

    fn export_nested(&self, value: &JsValue, active: &mut HashSet<(bool, usize)>, span: Span) -> Result<HostValue> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.export_inner(value, active, span))
    }

    /// Copy a host value into the heap
    pub fn import(&mut self, value: &HostValue) -> JsValue {
        match value {
            HostValue::Number(n) => JsValue::Number(n.clone()),
            HostValue::NaN => JsValue::NaN,
            HostValue::String(s) => JsValue::string(s),
            HostValue::Boolean(b) => JsValue::Boolean(*b),
            HostValue::Null => JsValue::Null,
            HostValue::Undefined => JsValue::Undefined,
            HostValue::Array(items) => {
                let elements = items.iter().map(|v| self.import_nested(v)).collect();
                JsValue::Array(self.alloc_array(elements))
            }
            HostValue::Object(props) => {
                let entries = props
                    .iter()
                    .map(|(k, v)| (Rc::from(k.as_str()), self.import_nested(v)))
                    .collect();
                JsValue::Object(self.alloc_object(entries))
            }
        }
    }

    fn import_nested(&mut self, value: &HostValue) -> JsValue {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.import(value))
    }
}

/// Number of heap slots a host value occupies once imported
pub fn host_size(value: &HostValue) -> u64 {
    let mut size = 0;
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            HostValue::Array(items) => {
                size += 1;
                pending.extend(items);
            }
            HostValue::Object(props) => {
                size += 1;
                pending.extend(props.iter().map(|(_, v)| v));
            }
            _ => {}
        }
    }
    size
}
