use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, Error};
use crate::eval::value::Value;
use crate::processor::ProcessorAndContext;

/// Property set by XML-aware parsers on document nodes: encoding from the XML declaration.
pub const NODE_PROPERTY_XML_ENCODING: &str = "XML_ENCODING";
/// Property set by XML-aware parsers on document nodes: version from the XML declaration.
pub const NODE_PROPERTY_XML_VERSION: &str = "XML_VERSION";
/// Property set by XML-aware parsers on document nodes: standalone flag from the XML declaration.
pub const NODE_PROPERTY_XML_STANDALONE: &str = "XML_STANDALONE";

const DEFAULT_LOCAL_VARIABLES_CAPACITY: usize = 3;

/// Normalizes an element or attribute name for matching purposes.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Prefixes `name` with a dialect prefix (`prefix:name`).
///
/// An empty or whitespace-only prefix leaves the name untouched.
pub fn apply_dialect_prefix(name: &str, dialect_prefix: Option<&str>) -> String {
    match dialect_prefix {
        Some(prefix) if !prefix.trim().is_empty() => format!("{}:{}", prefix, name),
        _ => name.to_string(),
    }
}

/// Handle of a node inside its [`Tree`](crate::dom::tree::Tree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    CData,
    DocType,
    ProcessingInstruction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    normalized_name: String,
    value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            normalized_name: normalize_name(name),
            value: value.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Variant-specific part of a node.
///
/// Document and element are the container variants: they own the ordered list
/// of their children. Every other variant is a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document {
        children: Vec<NodeId>,
    },
    Element {
        name: String,
        normalized_name: String,
        attributes: Vec<Attribute>,
        children: Vec<NodeId>,
    },
    Text {
        content: String,
    },
    Comment {
        content: String,
    },
    CData {
        content: String,
    },
    DocType {
        root_element_name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    ProcessingInstruction {
        target: String,
        content: Option<String>,
    },
}

impl NodeKind {
    pub fn document() -> Self {
        NodeKind::Document {
            children: Vec::new(),
        }
    }

    pub fn element(name: &str) -> Self {
        NodeKind::Element {
            name: name.to_string(),
            normalized_name: normalize_name(name),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn element_with_attributes(name: &str, attributes: &[(&str, &str)]) -> Self {
        NodeKind::Element {
            name: name.to_string(),
            normalized_name: normalize_name(name),
            attributes: attributes
                .iter()
                .map(|(name, value)| Attribute::new(name, value))
                .collect(),
            children: Vec::new(),
        }
    }

    pub fn text(content: &str) -> Self {
        NodeKind::Text {
            content: content.to_string(),
        }
    }

    pub fn comment(content: &str) -> Self {
        NodeKind::Comment {
            content: content.to_string(),
        }
    }

    pub fn cdata(content: &str) -> Self {
        NodeKind::CData {
            content: content.to_string(),
        }
    }

    pub fn doc_type(
        root_element_name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Self {
        NodeKind::DocType {
            root_element_name: root_element_name.to_string(),
            public_id: public_id.map(str::to_string),
            system_id: system_id.map(str::to_string),
        }
    }

    pub fn processing_instruction(target: &str, content: Option<&str>) -> Self {
        NodeKind::ProcessingInstruction {
            target: target.to_string(),
            content: content.map(str::to_string),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document { .. } => NodeType::Document,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Comment { .. } => NodeType::Comment,
            NodeKind::CData { .. } => NodeType::CData,
            NodeKind::DocType { .. } => NodeType::DocType,
            NodeKind::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Document { .. } | NodeKind::Element { .. })
    }

    /// Whether the node takes part in "elements only" processing.
    pub fn is_processable_as_element(&self) -> bool {
        matches!(self, NodeKind::Document { .. } | NodeKind::Element { .. })
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Document { children } | NodeKind::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            NodeKind::Document { children } | NodeKind::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Copy of the variant-specific fields with an empty child list.
    pub(crate) fn cloned_shell(&self) -> Self {
        let mut shell = self.clone();
        if let Some(children) = shell.children_mut() {
            children.clear();
        }
        shell
    }

    pub fn element_name(&self) -> Option<&str> {
        match self {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn normalized_element_name(&self) -> Option<&str> {
        match self {
            NodeKind::Element {
                normalized_name, ..
            } => Some(normalized_name),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> Option<&mut Vec<Attribute>> {
        match self {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        let normalized = normalize_name(name);
        self.attributes()
            .iter()
            .find(|attribute| attribute.normalized_name == normalized)
            .map(Attribute::value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Character content of text-like leaves.
    pub fn content(&self) -> Option<&str> {
        match self {
            NodeKind::Text { content }
            | NodeKind::Comment { content }
            | NodeKind::CData { content } => Some(content),
            NodeKind::ProcessingInstruction { content, .. } => content.as_deref(),
            _ => None,
        }
    }
}

/// A node of the arena together with its cached processing state.
#[derive(Debug)]
pub struct NodeData {
    kind: NodeKind,
    document_name: Option<String>,
    line_number: Option<usize>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) skippable: bool,
    pub(crate) precomputed: bool,
    recompute_after_each_execution: bool,
    recompute_immediately: bool,
    local_variables: Option<HashMap<String, Value>>,
    pub(crate) processors: Option<Arc<Vec<ProcessorAndContext>>>,
    properties: Option<HashMap<String, Value>>,
}

impl NodeData {
    pub(crate) fn new(
        kind: NodeKind,
        document_name: Option<String>,
        line_number: Option<usize>,
    ) -> Self {
        Self {
            kind,
            document_name,
            line_number,
            parent: None,
            skippable: false,
            precomputed: false,
            recompute_after_each_execution: false,
            recompute_immediately: false,
            local_variables: None,
            processors: None,
            properties: None,
        }
    }

    /// Copy of this node for the clone engine: variant fields without children,
    /// deep copies of variables and properties, cached state per `clone_processors`.
    pub(crate) fn clone_detached(
        &self,
        new_parent: Option<NodeId>,
        clone_processors: bool,
    ) -> Self {
        let mut clone = Self::new(
            self.kind.cloned_shell(),
            self.document_name.clone(),
            self.line_number,
        );
        if clone_processors {
            clone.processors = self.processors.clone();
            clone.skippable = self.skippable;
            clone.precomputed = self.precomputed;
        }
        clone.parent = new_parent;
        clone.local_variables = self.local_variables.clone();
        clone.properties = self.properties.clone();
        clone
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn children(&self) -> &[NodeId] {
        self.kind.children()
    }

    pub fn is_skippable(&self) -> bool {
        self.skippable
    }

    pub fn is_precomputed(&self) -> bool {
        self.precomputed
    }

    pub fn recompute_after_each_execution(&self) -> bool {
        self.recompute_after_each_execution
    }

    /// Sticky request: re-resolve processors after every processor execution.
    pub fn set_recompute_after_each_execution(&mut self, value: bool) {
        self.recompute_after_each_execution = value;
    }

    pub fn recompute_immediately(&self) -> bool {
        self.recompute_immediately
    }

    /// One-shot request: re-resolve processors before the next one runs.
    pub fn set_recompute_immediately(&mut self, value: bool) {
        self.recompute_immediately = value;
    }

    pub(crate) fn recompute_requested(&self) -> bool {
        self.recompute_immediately || self.recompute_after_each_execution
    }

    pub fn processors(&self) -> Option<&Arc<Vec<ProcessorAndContext>>> {
        self.processors.as_ref()
    }

    pub fn has_processors(&self) -> bool {
        self.processors.as_ref().is_some_and(|p| !p.is_empty())
    }

    // local variables

    pub fn has_local_variables(&self) -> bool {
        self.local_variables.as_ref().is_some_and(|v| !v.is_empty())
    }

    pub fn local_variables(&self) -> Option<&HashMap<String, Value>> {
        self.local_variables.as_ref()
    }

    pub fn local_variable(&self, name: &str) -> Option<&Value> {
        self.local_variables.as_ref()?.get(name)
    }

    pub fn local_variable_names(&self) -> Vec<&str> {
        self.local_variables
            .as_ref()
            .map(|vars| vars.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn set_local_variable(&mut self, name: &str, value: Value) {
        self.local_variables
            .get_or_insert_with(|| HashMap::with_capacity(DEFAULT_LOCAL_VARIABLES_CAPACITY))
            .insert(name.to_string(), value);
    }

    pub fn set_all_local_variables(&mut self, variables: &HashMap<String, Value>) {
        let vars = self
            .local_variables
            .get_or_insert_with(|| HashMap::with_capacity(variables.len()));
        vars.extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub(crate) fn replace_local_variables(&mut self, variables: HashMap<String, Value>) {
        self.local_variables = Some(variables);
    }

    // properties

    pub fn set_property(&mut self, name: &str, value: Value) -> EngineResult<()> {
        validate_property_name(name)?;
        self.properties
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value);
        Ok(())
    }

    pub fn has_property(&self, name: &str) -> EngineResult<bool> {
        validate_property_name(name)?;
        Ok(self
            .properties
            .as_ref()
            .is_some_and(|props| props.contains_key(name)))
    }

    pub fn property(&self, name: &str) -> EngineResult<Option<&Value>> {
        validate_property_name(name)?;
        Ok(self.properties.as_ref().and_then(|props| props.get(name)))
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties
            .as_ref()
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

fn validate_property_name(name: &str) -> EngineResult<()> {
    if name.is_empty() {
        return Err(Error::precondition("Property name cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_normalize_and_prefix() {
        assert_eq!(normalize_name("TH:Text"), "th:text");
        assert_eq!(apply_dialect_prefix("text", Some("th")), "th:text");
        assert_eq!(apply_dialect_prefix("text", Some("  ")), "text");
        assert_eq!(apply_dialect_prefix("text", None), "text");
    }

    #[test]
    fn test_node_type_strings() {
        assert_eq!(NodeType::ProcessingInstruction.to_string(), "processing_instruction");
        assert_eq!(NodeType::from_str("c_data").unwrap(), NodeType::CData);
    }

    #[test]
    fn test_capabilities() {
        assert!(NodeKind::document().is_container());
        assert!(NodeKind::element("div").is_processable_as_element());
        assert!(!NodeKind::text("x").is_container());
        assert!(!NodeKind::comment("x").is_processable_as_element());
        assert!(NodeKind::text("x").children().is_empty());
    }

    #[test]
    fn test_attribute_lookup_is_normalized() {
        let kind = NodeKind::element_with_attributes("DIV", &[("TH:Each", "item : ${items}")]);
        assert_eq!(kind.normalized_element_name(), Some("div"));
        assert_eq!(kind.attribute("th:each"), Some("item : ${items}"));
        assert!(!kind.has_attribute("th:if"));
    }

    #[test]
    fn test_properties() {
        let mut node = NodeData::new(NodeKind::document(), None, None);
        assert!(!node.has_property(NODE_PROPERTY_XML_VERSION).unwrap());
        node.set_property(NODE_PROPERTY_XML_VERSION, Value::from("1.0"))
            .unwrap();
        assert_eq!(
            node.property(NODE_PROPERTY_XML_VERSION).unwrap(),
            Some(&Value::from("1.0"))
        );
        assert_eq!(node.property_names(), vec![NODE_PROPERTY_XML_VERSION]);
        assert!(matches!(
            node.set_property("", Value::Null),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn test_local_variables() {
        let mut node = NodeData::new(NodeKind::element("p"), None, Some(3));
        assert!(!node.has_local_variables());
        node.set_local_variable("a", Value::from(1_i64));
        let mut more = HashMap::new();
        more.insert("b".to_string(), Value::from(2_i64));
        node.set_all_local_variables(&more);
        assert!(node.has_local_variables());
        assert_eq!(node.local_variable("b"), Some(&Value::Integer(2)));
        let mut names = node.local_variable_names();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }
}
