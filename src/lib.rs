//! # arbor: node processing for document-tree templates
//!
//! arbor hosts and sequences the processors of a template renderer. Given a
//! parsed markup tree it works out, per node, which processors apply, runs
//! them in order, and carries their structural and variable-scope effects
//! through the tree. Parsed trees can be cached and cloned so one parse
//! serves many renders.
//!
//! ## Pipeline
//!
//! ```text
//! Parser → Tree → (clone) → precompute → process → output writer
//! ```
//!
//! - Document model ([`dom`]): arena tree, node variants, clone engine, visitor
//! - Processors ([`processor`]): the processor and resolver seams, plus a
//!   matcher-based registry
//! - Evaluation ([`eval`]): values and the execution context
//! - Engine ([`engine`]): rule configuration, processing loop, template cache
//!
//! Parsing, expression evaluation and output writing are left to the
//! embedding renderer.

pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod eval;
pub mod processor;

// Re-exports
pub use dom::*;
pub use engine::*;
pub use error::*;
pub use eval::*;
pub use processor::{
    MatchContext, Processor, ProcessorAndContext, ProcessorId, ProcessorResolver,
    ProcessorResult,
};
