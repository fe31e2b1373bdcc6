use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, instrument, warn};

use crate::dom::tree::Tree;
use crate::error::{EngineResult, Error};
use crate::eval::context::ExecutionContext;
use crate::eval::value::Value;

use super::configuration::Configuration;

/// Tree-walk driver with a cache of parsed trees.
///
/// Cached trees are never processed themselves. Each render clones its
/// template and processes the clone, so a cached tree can serve any number of
/// concurrent renders.
pub struct TemplateEngine {
    configuration: Arc<Configuration>,
    templates: DashMap<String, Arc<Tree>>,
}

impl TemplateEngine {
    pub fn new(configuration: Arc<Configuration>) -> Self {
        Self {
            configuration,
            templates: DashMap::new(),
        }
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    /// Stores a parsed tree under `name`, replacing any previous one.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn register_template(&self, name: &str, mut tree: Tree) -> EngineResult<()> {
        if self
            .configuration
            .settings()
            .template_cache
            .precompute_on_insert
        {
            let root = tree.root();
            tree.precompute_node(root, &self.configuration)?;
        }
        if self
            .templates
            .insert(name.to_string(), Arc::new(tree))
            .is_some()
        {
            debug!("replaced cached template {}", name);
        }
        Ok(())
    }

    pub fn template(&self, name: &str) -> Option<Arc<Tree>> {
        self.templates.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn evict(&self, name: &str) -> Option<Arc<Tree>> {
        self.templates.remove(name).map(|(_, tree)| tree)
    }

    pub fn clear(&self) {
        self.templates.clear();
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Renders the cached template `name` with the given request variables and
    /// returns the processed copy.
    #[instrument(level = "debug", skip(self, variables))]
    pub fn process(&self, name: &str, variables: HashMap<String, Value>) -> EngineResult<Tree> {
        let cached = self.template(name).ok_or_else(|| {
            warn!("template {} is not cached", name);
            Error::TemplateNotFound(name.to_string())
        })?;
        let clone_processors = self.configuration.settings().template_cache.clone_processors;
        let mut tree = cached.clone_tree(clone_processors)?;

        let context = ExecutionContext::new(self.configuration.clone(), variables);
        let outcome = tree.process(&context)?;
        debug!("template {} processed: {}", name, outcome);
        Ok(tree)
    }
}
