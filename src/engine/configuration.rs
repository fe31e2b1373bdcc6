use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::dom::node::NodeId;
use crate::dom::tree::Tree;
use crate::error::EngineResult;
use crate::processor::registry::ProcessorRegistry;
use crate::processor::{ProcessorAndContext, ProcessorResolver};

/// Process-wide rule configuration: engine settings plus the authority that
/// decides which processors apply to a node.
pub struct Configuration {
    settings: EngineConfig,
    resolver: Arc<dyn ProcessorResolver>,
}

impl Configuration {
    pub fn new(settings: EngineConfig, resolver: Arc<dyn ProcessorResolver>) -> Self {
        Self { settings, resolver }
    }

    /// Default settings and a registry without any processor.
    pub fn empty() -> Self {
        let settings = EngineConfig::default();
        let registry = ProcessorRegistry::new(settings.prefix());
        Self::new(settings, Arc::new(registry))
    }

    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    pub fn resolver(&self) -> &Arc<dyn ProcessorResolver> {
        &self.resolver
    }

    #[instrument(level = "debug", skip(self, tree))]
    pub fn compute_processors_for_node(
        &self,
        tree: &Tree,
        node: NodeId,
    ) -> EngineResult<Vec<ProcessorAndContext>> {
        let processors = self.resolver.resolve(tree, node)?;
        debug!("{} processor(s) resolved", processors.len());
        Ok(processors)
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
