//! Deep copies of nodes and trees.
//!
//! With `clone_processors` the copy shares the source's resolved processor
//! lists and carries its skip/precompute flags, so an unmodified cached tree
//! can be rendered again without resolving anything. Without it the copy
//! starts unprocessed. Local variables and properties are always copied.

use tracing::trace;

use super::node::NodeId;
use super::tree::{Tree, TreeResult};

impl Tree {
    /// Clones `id` and its subtree inside this tree.
    ///
    /// The clone's parent link is set to `new_parent`, but the clone is not
    /// inserted into that parent's children: callers position it with
    /// [`Tree::insert_child`] or [`Tree::add_child`].
    pub fn clone_node(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        clone_processors: bool,
    ) -> TreeResult<NodeId> {
        if let Some(parent) = new_parent {
            self.node(parent)?;
        }
        let clone = self.node(id)?.clone_detached(new_parent, clone_processors);
        let clone_id = self.push_node(clone);

        let children = self.node(id)?.children().to_vec();
        let mut cloned_children = Vec::with_capacity(children.len());
        for child in children {
            cloned_children.push(self.clone_node(child, Some(clone_id), clone_processors)?);
        }
        if let Some(list) = self.node_mut(clone_id)?.kind_mut().children_mut() {
            *list = cloned_children;
        }
        trace!("cloned {} as {}", id, clone_id);
        Ok(clone_id)
    }

    /// Independent copy of the whole tree, for one render request.
    pub fn clone_tree(&self, clone_processors: bool) -> TreeResult<Tree> {
        let mut target = Tree::empty(self.document_name().map(str::to_string));
        let root = clone_into(self, self.root(), &mut target, None, clone_processors)?;
        target.set_root(root);
        Ok(target)
    }
}

fn clone_into(
    source: &Tree,
    id: NodeId,
    target: &mut Tree,
    new_parent: Option<NodeId>,
    clone_processors: bool,
) -> TreeResult<NodeId> {
    let node = source.node(id)?;
    let clone_id = target.push_node(node.clone_detached(new_parent, clone_processors));

    let mut cloned_children = Vec::with_capacity(node.children().len());
    for child in node.children() {
        cloned_children.push(clone_into(
            source,
            *child,
            target,
            Some(clone_id),
            clone_processors,
        )?);
    }
    if let Some(list) = target.node_mut(clone_id)?.kind_mut().children_mut() {
        *list = cloned_children;
    }
    Ok(clone_id)
}
