//! Owned, mutable XML document model.
//!
//! Arena storage: every element lives in a `Vec` and is addressed by a
//! `NodeId` index, with parent links for upward navigation. One
//! `Document` owns all of its nodes for the lifetime of a repair pass;
//! detached subtrees stay in the arena but become unreachable from the
//! root.

mod parse;
mod write;

pub use parse::{parse_bytes, parse_str};
pub use write::to_xml_string;

/// Index of an element in the document arena.
pub type NodeId = usize;

/// A qualified element or attribute name, stored verbatim (`mets:file`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName(String);

impl QName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The full name as written, prefix included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace prefix, if any (`mets:file` → `mets`).
    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once(':').map(|(p, _)| p)
    }

    /// Local part without the prefix (`mets:file` → `file`).
    pub fn local(&self) -> &str {
        match self.0.split_once(':') {
            Some((_, local)) => local,
            None => &self.0,
        }
    }
}

/// One attribute, order-preserving within its element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// Ordered child content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(NodeId),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    name: QName,
    attributes: Vec<Attribute>,
    children: Vec<Content>,
    parent: Option<NodeId>,
}

/// An ordered tree of elements with attributes, text and comments.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    /// Create a document containing only a root element.
    pub fn new(root_name: QName) -> Self {
        Self {
            nodes: vec![NodeData {
                name: root_name,
                attributes: Vec::new(),
                children: Vec::new(),
                parent: None,
            }],
            root: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a new element under `parent`, returning its id.
    pub fn push_element(
        &mut self,
        parent: NodeId,
        name: QName,
        attributes: Vec<Attribute>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            name,
            attributes,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent].children.push(Content::Element(id));
        id
    }

    pub fn push_text(&mut self, parent: NodeId, text: String) {
        self.nodes[parent].children.push(Content::Text(text));
    }

    pub fn push_comment(&mut self, parent: NodeId, comment: String) {
        self.nodes[parent].children.push(Content::Comment(comment));
    }

    pub fn name(&self, id: NodeId) -> &QName {
        &self.nodes[id].name
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        &self.nodes[id].attributes
    }

    /// First attribute whose local name matches, prefix ignored.
    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.nodes[id]
            .attributes
            .iter()
            .find(|a| a.name.local() == local)
            .map(|a| a.value.as_str())
    }

    /// Rewrite an existing attribute in place, matched by local name.
    /// Returns false if the element has no such attribute.
    pub fn set_attribute(&mut self, id: NodeId, local: &str, value: &str) -> bool {
        match self.nodes[id]
            .attributes
            .iter_mut()
            .find(|a| a.name.local() == local)
        {
            Some(attr) => {
                attr.value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[Content] {
        &self.nodes[id].children
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id].children.iter().filter_map(|c| match c {
            Content::Element(child) => Some(*child),
            _ => None,
        })
    }

    /// Whether the node is still reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current].parent {
                Some(p) => {
                    // A detached node keeps its old parent link; verify the
                    // parent still lists it as a child.
                    if !self.nodes[p]
                        .children
                        .iter()
                        .any(|c| matches!(c, Content::Element(e) if *e == current))
                    {
                        return false;
                    }
                    current = p;
                }
                None => return false,
            }
        }
    }

    /// Remove a subtree from its parent. The nodes stay in the arena but
    /// are no longer reachable from the root. The root itself cannot be
    /// detached. Returns whether anything was removed.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id].parent else {
            return false;
        };
        let children = &mut self.nodes[parent].children;
        let before = children.len();
        children.retain(|c| !matches!(c, Content::Element(e) if *e == id));
        children.len() < before
    }

    /// Restartable iterator over attached elements in document
    /// (depth-first, pre-order) order, starting at the root.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            doc: self,
            stack: vec![self.root],
        }
    }
}

/// Depth-first pre-order traversal over element ids.
pub struct PreOrder<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children: Vec<NodeId> = self.doc.child_elements(id).collect();
        self.stack.extend(children.into_iter().rev());
        Some(id)
    }
}

// ─── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level_doc() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new(QName::new("mets:mets"));
        let root = doc.root();
        let a = doc.push_element(
            root,
            QName::new("mets:fileSec"),
            vec![Attribute {
                name: QName::new("ID"),
                value: "FS_1".to_string(),
            }],
        );
        let b = doc.push_element(a, QName::new("mets:file"), Vec::new());
        let c = doc.push_element(root, QName::new("mets:structMap"), Vec::new());
        (doc, a, b, c)
    }

    #[test]
    fn test_qname_prefix_and_local() {
        let name = QName::new("xlink:href");
        assert_eq!(name.prefix(), Some("xlink"));
        assert_eq!(name.local(), "href");

        let bare = QName::new("ORDER");
        assert_eq!(bare.prefix(), None);
        assert_eq!(bare.local(), "ORDER");
    }

    #[test]
    fn test_pre_order_is_document_order() {
        let (doc, a, b, c) = two_level_doc();
        let order: Vec<NodeId> = doc.pre_order().collect();
        assert_eq!(order, vec![doc.root(), a, b, c]);
    }

    #[test]
    fn test_pre_order_is_restartable() {
        let (doc, _, _, _) = two_level_doc();
        let first: Vec<NodeId> = doc.pre_order().collect();
        let second: Vec<NodeId> = doc.pre_order().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_attribute_lookup_ignores_prefix() {
        let (doc, a, _, _) = two_level_doc();
        assert_eq!(doc.attribute(a, "ID"), Some("FS_1"));
        assert_eq!(doc.attribute(a, "ORDER"), None);
    }

    #[test]
    fn test_set_attribute_rewrites_in_place() {
        let (mut doc, a, _, _) = two_level_doc();
        assert!(doc.set_attribute(a, "ID", "FS_2"));
        assert_eq!(doc.attribute(a, "ID"), Some("FS_2"));
        assert!(!doc.set_attribute(a, "missing", "x"));
    }

    #[test]
    fn test_detach_removes_subtree_as_unit() {
        let (mut doc, a, b, c) = two_level_doc();
        assert!(doc.detach(a));

        let order: Vec<NodeId> = doc.pre_order().collect();
        assert_eq!(order, vec![doc.root(), c]);
        assert!(!doc.is_attached(a));
        assert!(!doc.is_attached(b));
        assert!(doc.is_attached(c));
    }

    #[test]
    fn test_detach_root_is_refused() {
        let (mut doc, _, _, _) = two_level_doc();
        let root = doc.root();
        assert!(!doc.detach(root));
        assert!(doc.is_attached(root));
    }
}
