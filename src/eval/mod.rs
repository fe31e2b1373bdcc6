//! Evaluation-side types shared by the engine and processors.
//!
//! - [`value::Value`]: values held in variable scopes and node properties
//! - [`context::ExecutionContext`]: the scope a processor runs with

pub mod context;
pub mod value;

pub use context::ExecutionContext;
pub use value::Value;
