//! Processor seams of the engine.
//!
//! A [`Processor`] is a rule that transforms a matching node and/or contributes
//! variables to the execution scope. Which processors apply to a node is decided
//! by a [`ProcessorResolver`] consulted through the rule
//! [`Configuration`](crate::engine::configuration::Configuration); the
//! [`registry`] module provides a matcher-based resolver.

pub mod registry;

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::dom::node::NodeId;
use crate::dom::tree::Tree;
use crate::error::EngineResult;
use crate::eval::context::ExecutionContext;
use crate::eval::value::Value;

/// A transformation rule applied to matching nodes.
///
/// Processors may mutate the tree (attributes, children, the node's own
/// position) and may ask the engine to re-resolve the node's processors by
/// setting one of the recompute flags on the node.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    fn process(
        &self,
        context: &ExecutionContext,
        match_context: &MatchContext,
        tree: &mut Tree,
        node: NodeId,
    ) -> EngineResult<ProcessorResult>;
}

/// Decides which processors apply to a node in its current shape.
///
/// Implementations must be deterministic for a fixed node shape and return a
/// stable ordering: the order is the execution precedence.
#[mockall::automock]
pub trait ProcessorResolver: Send + Sync {
    fn resolve(&self, tree: &Tree, node: NodeId) -> EngineResult<Vec<ProcessorAndContext>>;
}

/// What made a processor match a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    pub dialect_prefix: Option<String>,
    pub attribute_name: Option<String>,
}

impl MatchContext {
    pub fn new(dialect_prefix: Option<&str>, attribute_name: Option<&str>) -> Self {
        Self {
            dialect_prefix: dialect_prefix.map(str::to_string),
            attribute_name: attribute_name.map(str::to_string),
        }
    }
}

/// Identity of a processor instance, independent of the value it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessorId(usize);

#[derive(Clone)]
pub struct ProcessorAndContext {
    processor: Arc<dyn Processor>,
    context: MatchContext,
}

impl ProcessorAndContext {
    pub fn new(processor: Arc<dyn Processor>, context: MatchContext) -> Self {
        Self { processor, context }
    }

    pub fn processor(&self) -> &Arc<dyn Processor> {
        &self.processor
    }

    pub fn context(&self) -> &MatchContext {
        &self.context
    }

    pub fn id(&self) -> ProcessorId {
        ProcessorId(Arc::as_ptr(&self.processor) as *const () as usize)
    }
}

impl fmt::Debug for ProcessorAndContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorAndContext")
            .field("processor", &self.processor.name())
            .field("context", &self.context)
            .finish()
    }
}

/// Outcome of a processor execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorResult {
    local_variables: Option<HashMap<String, Value>>,
    process_only_elements: Option<bool>,
}

impl ProcessorResult {
    /// No changes to the execution context.
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn with_local_variables(variables: HashMap<String, Value>) -> Self {
        Self {
            local_variables: Some(variables),
            process_only_elements: None,
        }
    }

    pub fn with_local_variable(name: &str, value: Value) -> Self {
        let mut variables = HashMap::new();
        variables.insert(name.to_string(), value);
        Self::with_local_variables(variables)
    }

    pub fn set_process_only_elements(mut self, value: bool) -> Self {
        self.process_only_elements = Some(value);
        self
    }

    pub fn has_local_variables(&self) -> bool {
        self.local_variables.as_ref().is_some_and(|v| !v.is_empty())
    }

    pub fn local_variables(&self) -> Option<&HashMap<String, Value>> {
        self.local_variables.as_ref()
    }

    pub fn compute_new_context(&self, context: &ExecutionContext) -> ExecutionContext {
        let mut new_context = match &self.local_variables {
            Some(vars) if !vars.is_empty() => context.with_added_variables(vars),
            _ => context.clone(),
        };
        if let Some(value) = self.process_only_elements {
            new_context = new_context.with_process_only_elements(value);
        }
        new_context
    }
}
