use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::dom::node::NodeId;
use crate::dom::tree::Tree;
use crate::error::EngineResult;
use crate::eval::context::ExecutionContext;
use crate::processor::{ProcessorAndContext, ProcessorId};

use super::configuration::Configuration;

/// Terminal state of [`Tree::process_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum NodeOutcome {
    /// Not visited: excluded by "elements only" mode or nothing to do in the subtree.
    Skipped,
    /// Processors ran and the variant hook completed.
    Done,
    /// The node is not attached to the tree, or a processor removed it;
    /// processing stopped there.
    Detached,
}

impl Tree {
    /// Sets the skippable flag of `id`.
    ///
    /// Turning a node non-skippable makes its ancestors non-skippable too.
    /// Turning a container skippable marks its whole subtree skippable.
    pub fn set_skippable(&mut self, id: NodeId, skippable: bool) -> EngineResult<()> {
        self.node_mut(id)?.skippable = skippable;
        if !skippable {
            if let Some(parent) = self.node(id)?.parent() {
                if self.node(parent)?.is_skippable() {
                    self.set_skippable(parent, false)?;
                }
            }
        }
        self.additional_skippable_computing(id, skippable)
    }

    fn additional_skippable_computing(&mut self, id: NodeId, skippable: bool) -> EngineResult<()> {
        if skippable {
            let children = self.node(id)?.children().to_vec();
            for child in children {
                self.set_skippable(child, true)?;
            }
        }
        Ok(())
    }

    /// Resolves and caches the processors applying to `id`, then makes sure
    /// every node below it is precomputed as well.
    ///
    /// Resolution only happens once per node state; detached nodes are never
    /// resolved.
    pub fn precompute_node(
        &mut self,
        id: NodeId,
        configuration: &Configuration,
    ) -> EngineResult<()> {
        if !self.node(id)?.is_precomputed() && !self.is_detached(id)? {
            let processors = configuration.compute_processors_for_node(self, id)?;
            let has_processors = !processors.is_empty();
            let node = self.node_mut(id)?;
            node.processors = Some(processors.into());
            if has_processors {
                self.set_skippable(id, false)?;
            } else {
                // only this node: children precomputed below may still revert it
                node.skippable = true;
            }
            self.node_mut(id)?.precomputed = true;
        }
        self.additional_precompute(id, configuration)
    }

    fn additional_precompute(
        &mut self,
        id: NodeId,
        configuration: &Configuration,
    ) -> EngineResult<()> {
        let children = self.node(id)?.children().to_vec();
        for child in children {
            self.precompute_node(child, configuration)?;
            // an already-precomputed child does not propagate again on its own
            if !self.node(child)?.is_skippable() && self.node(id)?.is_skippable() {
                self.set_skippable(id, false)?;
            }
        }
        Ok(())
    }

    /// Forces re-resolution of `id` and consumes the one-shot recompute request.
    fn recompute_node(&mut self, id: NodeId, configuration: &Configuration) -> EngineResult<()> {
        trace!("recomputing processors for {}", id);
        self.node_mut(id)?.precomputed = false;
        self.precompute_node(id, configuration)?;
        self.node_mut(id)?.set_recompute_immediately(false);
        Ok(())
    }

    /// Processes the whole tree from its root.
    #[instrument(level = "debug", skip(self, context))]
    pub fn process(&mut self, context: &ExecutionContext) -> EngineResult<NodeOutcome> {
        let root = self.root();
        self.process_node(root, context, context.process_only_elements())
    }

    /// Runs every applicable processor of `id` once, then the variant hook
    /// (containers process their children).
    ///
    /// Processors may change the tree, the node's attributes and the set of
    /// applicable processors while the loop runs. A processor instance never
    /// runs twice on the same node within one call.
    pub fn process_node(
        &mut self,
        id: NodeId,
        context: &ExecutionContext,
        process_only_elements: bool,
    ) -> EngineResult<NodeOutcome> {
        let configuration = context.configuration().clone();
        let node = self.node(id)?;

        if process_only_elements && !node.kind().is_processable_as_element() {
            return Ok(NodeOutcome::Skipped);
        }
        if self.is_detached(id)? {
            trace!("{} is not attached, nothing to process", id);
            return Ok(NodeOutcome::Detached);
        }
        if node.recompute_requested() {
            self.recompute_node(id, &configuration)?;
        }
        if !self.node(id)?.is_precomputed() {
            self.precompute_node(id, &configuration)?;
        }
        if self.node(id)?.is_skippable() {
            trace!("skipping {}", id);
            return Ok(NodeOutcome::Skipped);
        }

        let node = self.node(id)?;
        let mut execution_context = match node.local_variables() {
            Some(vars) if !vars.is_empty() => context.with_added_variables(vars),
            _ => context.clone(),
        };
        if execution_context.has_variables() {
            self.node_mut(id)?
                .replace_local_variables(execution_context.current_scope().clone());
        }

        if self.node(id)?.has_processors() {
            let mut already_executed: HashSet<ProcessorId> = HashSet::new();
            loop {
                if self.is_detached(id)? {
                    debug!("{} detached by a processor", id);
                    return Ok(NodeOutcome::Detached);
                }
                let Some(next) = self.next_processor(id, &already_executed)? else {
                    break;
                };

                trace!("applying {} to {}", next.processor().name(), id);
                let result =
                    next.processor()
                        .process(&execution_context, next.context(), self, id)?;
                execution_context = result.compute_new_context(&execution_context);
                if result.has_local_variables() && execution_context.has_variables() {
                    self.node_mut(id)?
                        .replace_local_variables(execution_context.current_scope().clone());
                }
                already_executed.insert(next.id());

                if self.node(id)?.recompute_requested() {
                    self.recompute_node(id, &configuration)?;
                }
            }
        }

        self.additional_process(id, &execution_context)?;
        Ok(NodeOutcome::Done)
    }

    // first cached processor not yet run, looked up afresh each time since the
    // cached list may have been replaced by a recompute
    fn next_processor(
        &self,
        id: NodeId,
        already_executed: &HashSet<ProcessorId>,
    ) -> EngineResult<Option<ProcessorAndContext>> {
        Ok(self
            .node(id)?
            .processors()
            .and_then(|processors| {
                processors
                    .iter()
                    .find(|p| !already_executed.contains(&p.id()))
            })
            .cloned())
    }

    fn additional_process(&mut self, id: NodeId, context: &ExecutionContext) -> EngineResult<()> {
        if !self.node(id)?.kind().is_container() || self.is_detached(id)? {
            return Ok(());
        }
        let children = self.node(id)?.children().to_vec();
        for child in children {
            // removed by an earlier sibling's processor
            if self.node(child)?.parent() != Some(id) {
                continue;
            }
            self.process_node(child, context, context.process_only_elements())?;
        }
        Ok(())
    }
}
