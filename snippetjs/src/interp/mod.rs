//! Interpreter module
//!
//! Runs one function of a built program against a `RunContext`.
//!
//! - `value`: runtime values and the per-call heap
//! - `host`: owned values crossing the call boundary
//! - `scope`: function frames and pre-bound identifiers
//! - `meter`: the work budget
//! - `collab`: token executor and contract caller capabilities

/// Stack growth parameters for deep recursion
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

mod collab;
mod completion;
mod context;
mod eval;
mod host;
mod meter;
mod scope;
mod value;

pub use collab::{Collaborators, ContractCaller, TokenExecutor};
pub use completion::Completion;
pub use context::RunContext;
pub use eval::{BuiltinFn, Interpreter};
pub use host::HostValue;
pub use meter::Meter;
pub use scope::FrameStack;
pub use value::{ArrayRef, Heap, JsValue, ObjectRef, host_size};
