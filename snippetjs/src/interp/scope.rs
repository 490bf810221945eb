//! Function frames
//!
//! Variables are function-scoped: blocks do not open a scope, so each call
//! owns exactly one frame. Pre-bound identifiers sit in a separate global
//! map that every frame can read.

use super::JsValue;
use std::collections::HashMap;

/// Stack of call frames plus the global bindings
#[derive(Debug, Default)]
pub struct FrameStack {
    /// One map per active call, innermost last
    frames: Vec<HashMap<String, JsValue>>,
    /// Identifiers supplied by the run context
    globals: HashMap<String, JsValue>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a global binding
    pub fn define_global(&mut self, name: String, value: JsValue) {
        self.globals.insert(name, value);
    }

    /// Push a frame for a new call
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Current call depth
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Define a variable in the current frame, replacing any earlier binding
    pub fn define(&mut self, name: String, value: JsValue) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, value);
        }
    }

    /// Look up a variable in the current frame, then in the globals
    pub fn get(&self, name: &str) -> Option<&JsValue> {
        self.frames
            .last()
            .and_then(|frame| frame.get(name))
            .or_else(|| self.globals.get(name))
    }

    /// Update a variable of the current frame. Returns false if it is not declared there.
    pub fn set(&mut self, name: &str, value: JsValue) -> bool {
        match self.frames.last_mut().and_then(|frame| frame.get_mut(name)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Whether the current frame declares `name`
    pub fn is_local(&self, name: &str) -> bool {
        self.frames.last().is_some_and(|frame| frame.contains_key(name))
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }
}
