use thiserror::Error;

use super::node::{Attribute, NodeData, NodeId, NodeKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Node {0} cannot hold children")]
    NotAContainer(NodeId),
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("Node {0} has no character content")]
    NoContent(NodeId),
    #[error("Node {child} is not a child of {parent}")]
    ChildNotFound { parent: NodeId, child: NodeId },
    #[error("Index {index} out of bounds for children of {parent}")]
    IndexOutOfBounds { parent: NodeId, index: usize },
    #[error("Inserting {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

pub type TreeResult<T> = Result<T, TreeError>;

/// Arena holding every node of one document tree.
///
/// Nodes are addressed by [`NodeId`]. Structure is owned by the container
/// variants' child lists; parent links are plain handles. Nodes removed from
/// the structure stay in the arena (detached) until the tree is dropped, so
/// handles held by a running processor never dangle.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
    document_name: Option<String>,
}

impl Tree {
    pub fn new(root: NodeKind, document_name: Option<&str>) -> Self {
        let document_name = document_name.map(str::to_string);
        let root_node = NodeData::new(root, document_name.clone(), None);
        Self {
            nodes: vec![root_node],
            root: NodeId(0),
            document_name,
        }
    }

    /// Tree rooted at an empty document node.
    pub fn document(document_name: Option<&str>) -> Self {
        Self::new(NodeKind::document(), document_name)
    }

    /// Empty arena, root assigned by the clone engine.
    pub(crate) fn empty(document_name: Option<String>) -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId(0),
            document_name,
        }
    }

    pub(crate) fn push_node(&mut self, node: NodeData) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> TreeResult<&NodeData> {
        self.nodes.get(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut NodeData> {
        self.nodes.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Creates a detached node carrying the tree's document name.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let document_name = self.document_name.clone();
        self.push_node(NodeData::new(kind, document_name, None))
    }

    pub fn create_node_at(&mut self, kind: NodeKind, line_number: usize) -> NodeId {
        let document_name = self.document_name.clone();
        self.push_node(NodeData::new(kind, document_name, Some(line_number)))
    }

    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> TreeResult<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let mut ancestors = Vec::new();
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.node(parent)?.parent;
        }
        Ok(ancestors)
    }

    /// A node is detached when it is not the root and its parent chain does
    /// not lead to the root.
    pub fn is_detached(&self, id: NodeId) -> TreeResult<bool> {
        let mut current = id;
        loop {
            if current == self.root {
                return Ok(false);
            }
            match self.node(current)?.parent {
                Some(parent) => current = parent,
                None => return Ok(true),
            }
        }
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let index = self.node(parent)?.children().len();
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` at `index` among `parent`'s children, moving it out of
    /// its previous parent if it had one.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<()> {
        if !self.node(parent)?.kind().is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        self.node(child)?;
        if parent == child || self.ancestors(parent)?.contains(&child) {
            return Err(TreeError::Cycle { parent, child });
        }
        let siblings = self.node(parent)?.children();
        if index > siblings.len() {
            return Err(TreeError::IndexOutOfBounds { parent, index });
        }
        // `index` counts `child` itself when it already sits under `parent`
        let index = match siblings.iter().position(|c| *c == child) {
            Some(position) if position < index => index - 1,
            _ => index,
        };
        self.unlink(child)?;

        self.container_children_mut(parent)?.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        existing: NodeId,
        new_child: NodeId,
    ) -> TreeResult<()> {
        let index = self.child_index(parent, existing)?;
        self.insert_child(parent, index, new_child)
    }

    pub fn insert_after(
        &mut self,
        parent: NodeId,
        existing: NodeId,
        new_child: NodeId,
    ) -> TreeResult<()> {
        let index = self.child_index(parent, existing)?;
        self.insert_child(parent, index + 1, new_child)
    }

    /// Removes `child` from `parent`, leaving it (and its subtree) detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let index = self.child_index(parent, child)?;
        self.container_children_mut(parent)?.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    pub fn clear_children(&mut self, parent: NodeId) -> TreeResult<()> {
        let removed = std::mem::take(self.container_children_mut(parent)?);
        for child in removed {
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Removes the node from its parent, if any.
    ///
    /// A parent link the parent's child list does not back (a clone that was
    /// never inserted) is simply cleared.
    pub fn detach(&mut self, id: NodeId) -> TreeResult<()> {
        self.unlink(id)?;
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    pub fn child_index(&self, parent: NodeId, child: NodeId) -> TreeResult<usize> {
        self.node(parent)?
            .children()
            .iter()
            .position(|c| *c == child)
            .ok_or(TreeError::ChildNotFound { parent, child })
    }

    // element attributes

    pub fn attribute(&self, id: NodeId, name: &str) -> TreeResult<Option<&str>> {
        Ok(self.node(id)?.kind().attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> TreeResult<bool> {
        Ok(self.node(id)?.kind().has_attribute(name))
    }

    /// Sets or replaces an attribute. The node's processor resolution is
    /// invalidated.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        let attributes = node
            .kind_mut()
            .attributes_mut()
            .ok_or(TreeError::NotAnElement(id))?;
        let attribute = Attribute::new(name, value);
        match attributes
            .iter()
            .position(|a| a.normalized_name() == attribute.normalized_name())
        {
            Some(index) => attributes[index] = attribute,
            None => attributes.push(attribute),
        }
        node.precomputed = false;
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> TreeResult<Option<String>> {
        let node = self.node_mut(id)?;
        let attributes = node
            .kind_mut()
            .attributes_mut()
            .ok_or(TreeError::NotAnElement(id))?;
        let normalized = super::node::normalize_name(name);
        let Some(index) = attributes
            .iter()
            .position(|a| a.normalized_name() == normalized)
        else {
            return Ok(None);
        };
        let removed = attributes.remove(index);
        node.precomputed = false;
        Ok(Some(removed.value().to_string()))
    }

    /// Replaces the character content of a text, comment, CDATA or
    /// processing-instruction node.
    pub fn set_content(&mut self, id: NodeId, new_content: &str) -> TreeResult<()> {
        match self.node_mut(id)?.kind_mut() {
            NodeKind::Text { content }
            | NodeKind::Comment { content }
            | NodeKind::CData { content } => {
                *content = new_content.to_string();
                Ok(())
            }
            NodeKind::ProcessingInstruction { content, .. } => {
                *content = Some(new_content.to_string());
                Ok(())
            }
            _ => Err(TreeError::NoContent(id)),
        }
    }

    fn container_children_mut(&mut self, parent: NodeId) -> TreeResult<&mut Vec<NodeId>> {
        self.node_mut(parent)?
            .kind_mut()
            .children_mut()
            .ok_or(TreeError::NotAContainer(parent))
    }

    // drop `child` from its current parent's list without touching its link
    fn unlink(&mut self, child: NodeId) -> TreeResult<()> {
        if let Some(old_parent) = self.node(child)?.parent {
            if let Some(children) = self.node_mut(old_parent)?.kind_mut().children_mut() {
                children.retain(|c| *c != child);
            }
        }
        Ok(())
    }
}
