//! Statement completion signals

use super::JsValue;

/// How a statement finished. Loops consume `Break`/`Continue`, calls consume `Return`.
#[derive(Debug, Clone)]
pub enum Completion {
    Normal,
    Return(JsValue),
    Break,
    Continue,
}

impl Completion {
    pub fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal)
    }
}
