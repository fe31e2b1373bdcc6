//! Node processing engine.
//!
//! # Components
//!
//! ## Configuration
//! [`configuration::Configuration`] is the process-wide rule configuration:
//! engine settings plus the resolver deciding which processors apply to a node.
//!
//! ## Processing loop
//! [`processing`] extends [`Tree`](crate::dom::tree::Tree) with skippability
//! propagation, lazy processor resolution and the per-node processor loop.
//!
//! ## Template engine
//! [`template::TemplateEngine`] caches parsed trees and renders clones of them.
//!
//! # Processing pipeline
//!
//! 1. A tree is built by a parser (or cloned from a cached tree)
//! 2. `precompute_node` resolves and caches processors, marking subtrees
//!    without any processor as skippable
//! 3. `process_node` runs each applicable processor once, re-resolving when a
//!    processor asks for it, then descends into the children with the
//!    resulting execution context

pub mod configuration;
pub mod processing;
pub mod template;

pub use configuration::Configuration;
pub use processing::NodeOutcome;
pub use template::TemplateEngine;
