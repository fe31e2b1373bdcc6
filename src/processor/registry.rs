use std::sync::Arc;

use tracing::trace;

use crate::dom::node::{apply_dialect_prefix, normalize_name, NodeId, NodeType};
use crate::dom::tree::Tree;
use crate::error::EngineResult;

use super::{MatchContext, Processor, ProcessorAndContext, ProcessorResolver};

/// Node shape a registered processor applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeMatcher {
    /// Elements with this (dialect-prefixed) name.
    ElementName(String),
    /// Elements carrying this (dialect-prefixed) attribute.
    Attribute(String),
    /// Elements with the given name that also carry the given attribute.
    ElementWithAttribute { element: String, attribute: String },
    /// Every node of a type, e.g. all text nodes.
    NodeType(NodeType),
}

struct Registration {
    matcher: NodeMatcher,
    processor: Arc<dyn Processor>,
    precedence: i32,
}

/// Resolver matching nodes against registered [`NodeMatcher`]s.
///
/// Matching processors are ordered by ascending precedence; equal
/// precedences keep registration order.
pub struct ProcessorRegistry {
    dialect_prefix: Option<String>,
    registrations: Vec<Registration>,
}

impl ProcessorRegistry {
    pub fn new(dialect_prefix: Option<&str>) -> Self {
        Self {
            dialect_prefix: dialect_prefix.map(str::to_string),
            registrations: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        matcher: NodeMatcher,
        processor: Arc<dyn Processor>,
        precedence: i32,
    ) -> &mut Self {
        self.registrations.push(Registration {
            matcher,
            processor,
            precedence,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn prefixed(&self, name: &str) -> String {
        normalize_name(&apply_dialect_prefix(name, self.dialect_prefix.as_deref()))
    }

    // match context for `node` when the matcher applies to it
    fn match_context(
        &self,
        matcher: &NodeMatcher,
        tree: &Tree,
        node: NodeId,
    ) -> EngineResult<Option<MatchContext>> {
        let kind = tree.node(node)?.kind();
        let prefix = self.dialect_prefix.as_deref();
        let matched = match matcher {
            NodeMatcher::NodeType(node_type) => {
                (kind.node_type() == *node_type).then(|| MatchContext::new(prefix, None))
            }
            NodeMatcher::ElementName(name) => {
                let name = self.prefixed(name);
                (kind.normalized_element_name() == Some(name.as_str()))
                    .then(|| MatchContext::new(prefix, None))
            }
            NodeMatcher::Attribute(attribute) => {
                let attribute = self.prefixed(attribute);
                kind.has_attribute(&attribute)
                    .then(|| MatchContext::new(prefix, Some(attribute.as_str())))
            }
            NodeMatcher::ElementWithAttribute { element, attribute } => {
                let element = self.prefixed(element);
                let attribute = self.prefixed(attribute);
                let name_matches = kind.normalized_element_name() == Some(element.as_str());
                (name_matches && kind.has_attribute(&attribute))
                    .then(|| MatchContext::new(prefix, Some(attribute.as_str())))
            }
        };
        Ok(matched)
    }
}

impl ProcessorResolver for ProcessorRegistry {
    fn resolve(&self, tree: &Tree, node: NodeId) -> EngineResult<Vec<ProcessorAndContext>> {
        let mut matched = Vec::new();
        for registration in &self.registrations {
            if let Some(context) = self.match_context(&registration.matcher, tree, node)? {
                matched.push((
                    registration.precedence,
                    ProcessorAndContext::new(registration.processor.clone(), context),
                ));
            }
        }
        // stable: equal precedences keep registration order
        matched.sort_by_key(|(precedence, _)| *precedence);
        trace!("{} matched {} registration(s)", node, matched.len());
        Ok(matched.into_iter().map(|(_, p)| p).collect())
    }
}
