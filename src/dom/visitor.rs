use super::node::{NodeData, NodeId, NodeKind};
use super::tree::{Tree, TreeResult};

/// Depth-first walker callbacks, one per node variant.
///
/// Every method has an empty default so visitors only implement what they need.
#[allow(unused_variables)]
pub trait TreeVisitor {
    fn visit_document_start(&mut self, id: NodeId, node: &NodeData) {}
    fn visit_document_end(&mut self, id: NodeId, node: &NodeData) {}
    fn visit_element_start(&mut self, id: NodeId, node: &NodeData) {}
    fn visit_element_end(&mut self, id: NodeId, node: &NodeData) {}
    fn visit_text(&mut self, id: NodeId, node: &NodeData) {}
    fn visit_comment(&mut self, id: NodeId, node: &NodeData) {}
    fn visit_cdata(&mut self, id: NodeId, node: &NodeData) {}
    fn visit_doc_type(&mut self, id: NodeId, node: &NodeData) {}
    fn visit_processing_instruction(&mut self, id: NodeId, node: &NodeData) {}
}

impl Tree {
    /// Walks the tree from the root.
    pub fn visit(&self, visitor: &mut dyn TreeVisitor) -> TreeResult<()> {
        self.visit_node(self.root(), visitor)
    }

    pub fn visit_node(&self, id: NodeId, visitor: &mut dyn TreeVisitor) -> TreeResult<()> {
        let node = self.node(id)?;
        match node.kind() {
            NodeKind::Document { children } => {
                visitor.visit_document_start(id, node);
                for child in children {
                    self.visit_node(*child, visitor)?;
                }
                visitor.visit_document_end(id, node);
            }
            NodeKind::Element { children, .. } => {
                visitor.visit_element_start(id, node);
                for child in children {
                    self.visit_node(*child, visitor)?;
                }
                visitor.visit_element_end(id, node);
            }
            NodeKind::Text { .. } => visitor.visit_text(id, node),
            NodeKind::Comment { .. } => visitor.visit_comment(id, node),
            NodeKind::CData { .. } => visitor.visit_cdata(id, node),
            NodeKind::DocType { .. } => visitor.visit_doc_type(id, node),
            NodeKind::ProcessingInstruction { .. } => {
                visitor.visit_processing_instruction(id, node)
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Outline {
        lines: Vec<String>,
    }

    impl TreeVisitor for Outline {
        fn visit_document_start(&mut self, _id: NodeId, _node: &NodeData) {
            self.lines.push("doc".to_string());
        }

        fn visit_element_start(&mut self, _id: NodeId, node: &NodeData) {
            self.lines
                .push(format!("<{}>", node.kind().element_name().unwrap_or_default()));
        }

        fn visit_element_end(&mut self, _id: NodeId, node: &NodeData) {
            self.lines
                .push(format!("</{}>", node.kind().element_name().unwrap_or_default()));
        }

        fn visit_text(&mut self, _id: NodeId, node: &NodeData) {
            self.lines
                .push(node.kind().content().unwrap_or_default().to_string());
        }

        fn visit_doc_type(&mut self, _id: NodeId, _node: &NodeData) {
            self.lines.push("doctype".to_string());
        }
    }

    #[test]
    fn test_visit_order() {
        let mut tree = Tree::document(None);
        let doctype = tree.create_node(NodeKind::doc_type("html", None, None));
        let html = tree.create_node(NodeKind::element("html"));
        let p = tree.create_node(NodeKind::element("p"));
        let text = tree.create_node(NodeKind::text("hi"));
        let comment = tree.create_node(NodeKind::comment("ignored"));
        tree.add_child(tree.root(), doctype).unwrap();
        tree.add_child(tree.root(), html).unwrap();
        tree.add_child(html, p).unwrap();
        tree.add_child(p, text).unwrap();
        tree.add_child(html, comment).unwrap();

        let mut outline = Outline::default();
        tree.visit(&mut outline).unwrap();
        assert_eq!(
            outline.lines,
            vec!["doc", "doctype", "<html>", "<p>", "hi", "</p>", "</html>"]
        );
    }
}
