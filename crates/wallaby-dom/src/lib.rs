//! Node tree implementation for the wallaby rendering pipeline.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships, providing O(1) access and traversal without borrow checker
//! issues. The owning relation is the parent's `children` vector; the parent
//! back-reference is a plain index, so no ownership cycles exist.
//!
//! Unlike a general DOM there is no separate document node: the markup
//! parser guarantees a single `html` element root, so the root of the arena
//! is always an element.
//!
//! Every node carries a resolved-style map, empty until the cascade stage
//! runs and overwritten in place on every restyle.

use std::collections::HashMap;

/// Map of attribute names to values for an element.
///
/// Keys are stored lowercased by the parser, so lookups are effectively
/// case-insensitive for well-formed input.
pub type AttributesMap = HashMap<String, String>;

/// Map of resolved style property names to computed value strings.
pub type StyleMap = HashMap<String, String>;

/// A type-safe index into the node tree.
///
/// Provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// A single node in the markup tree: either text content or a tagged
/// element with attributes and children.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its variant-specific payload.
    pub node_type: NodeType,

    /// The parent node, or `None` for the root element.
    pub parent: Option<NodeId>,

    /// Child nodes in document order. This is the owning relation.
    pub children: Vec<NodeId>,

    /// Resolved style properties, populated by the cascade stage.
    ///
    /// Empty until the first style pass; each restyle rebuilds it wholesale.
    pub style: StyleMap,
}

/// The two node variants of the tree.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// Character content between tags.
    Text(String),
    /// A tagged element with attributes.
    Element(ElementData),
}

/// Element-specific data: a lowercased tag name and its attributes.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// The element's tag name, always lowercased by the parser.
    pub tag: String,
    /// The element's attribute list, keys lowercased by the parser.
    pub attributes: AttributesMap,
}

impl ElementData {
    /// Create element data from a tag name and attribute map.
    #[must_use]
    pub fn new(tag: impl Into<String>, attributes: AttributesMap) -> Self {
        Self {
            tag: tag.into(),
            attributes,
        }
    }

    /// Returns the value of an attribute, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Arena-based node tree with O(1) node access and traversal.
///
/// All nodes live in a contiguous vector and refer to each other by
/// [`NodeId`]. This gives:
/// - O(1) access to any node by id
/// - O(1) parent traversal
/// - no borrowing issues (indices instead of references)
#[derive(Debug, Clone, Default)]
pub struct DomTree {
    /// All nodes in the tree, indexed by NodeId.
    nodes: Vec<Node>,
    /// The root element, set once parsing finishes.
    root: Option<NodeId>,
}

impl DomTree {
    /// Create an empty tree. The markup parser allocates into it and seals
    /// it with [`DomTree::set_root`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the root element id.
    ///
    /// For any tree produced by the markup parser this is the `html`
    /// element. On a tree that was never sealed it falls back to index 0.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root.unwrap_or(NodeId(0))
    }

    /// Record `id` as the root element of the tree.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Get a node by its id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its id.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            style: StyleMap::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, updating both the
    /// owning children list and the child's parent back-reference.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            NodeType::Text(_) => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            NodeType::Element(_) => None,
        })
    }

    /// Get the lowercased tag name if this node is an element.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag.as_str())
    }

    /// Get a node's resolved style map.
    ///
    /// Empty until the cascade stage has run.
    #[must_use]
    pub fn style(&self, id: NodeId) -> Option<&StyleMap> {
        self.get(id).map(|n| &n.style)
    }

    /// Set an attribute on an element node.
    ///
    /// This is a mutation entry point for the scripting collaborator; the
    /// caller is responsible for triggering a restyle/relayout afterwards.
    /// Has no effect on text nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeType::Element(data) = &mut node.node_type
        {
            let _ = data
                .attributes
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    /// Remove an attribute from an element node.
    ///
    /// Like [`DomTree::set_attribute`], callers must re-run the style and
    /// layout stages afterwards.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeType::Element(data) = &mut node.node_type
        {
            let _ = data.attributes.remove(&name.to_ascii_lowercase());
        }
    }

    /// Detach all children of a node, leaving them allocated but orphaned.
    ///
    /// Mutation entry point for the scripting collaborator (for example,
    /// replacing an element's content). Arena slots are not reclaimed.
    pub fn detach_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Flatten the subtree rooted at `id` into a pre-order node list.
    ///
    /// This is the listing the query-by-selector entry point matches
    /// against, and the order paint consumers see nodes in.
    #[must_use]
    pub fn tree_to_list(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.flatten_into(id, &mut out);
        out
    }

    fn flatten_into(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in self.children(id) {
            self.flatten_into(child, out);
        }
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str) -> NodeType {
        NodeType::Element(ElementData::new(tag, AttributesMap::new()))
    }

    fn sample_tree() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let html = tree.alloc(element("html"));
        let body = tree.alloc(element("body"));
        let text = tree.alloc(NodeType::Text("hello".to_string()));
        tree.set_root(html);
        tree.append_child(html, body);
        tree.append_child(body, text);
        (tree, html, body, text)
    }

    #[test]
    fn append_child_links_both_directions() {
        let (tree, html, body, text) = sample_tree();
        assert_eq!(tree.parent(body), Some(html));
        assert_eq!(tree.parent(text), Some(body));
        assert_eq!(tree.children(html), &[body]);
        assert!(tree.parent(html).is_none());
    }

    #[test]
    fn variant_accessors() {
        let (tree, html, _, text) = sample_tree();
        assert_eq!(tree.tag(html), Some("html"));
        assert_eq!(tree.as_text(text), Some("hello"));
        assert!(tree.as_element(text).is_none());
        assert!(tree.as_text(html).is_none());
    }

    #[test]
    fn ancestors_walk_to_root() {
        let (tree, html, body, text) = sample_tree();
        let chain: Vec<NodeId> = tree.ancestors(text).collect();
        assert_eq!(chain, vec![body, html]);
        assert!(tree.is_descendant_of(text, html));
        assert!(!tree.is_descendant_of(html, text));
    }

    #[test]
    fn tree_to_list_is_preorder() {
        let (tree, html, body, text) = sample_tree();
        assert_eq!(tree.tree_to_list(html), vec![html, body, text]);
    }

    #[test]
    fn set_attribute_lowercases_key() {
        let (mut tree, _, body, _) = sample_tree();
        tree.set_attribute(body, "CLASS", "wide");
        assert_eq!(
            tree.as_element(body).unwrap().attribute("class"),
            Some("wide")
        );
        tree.remove_attribute(body, "Class");
        assert!(tree.as_element(body).unwrap().attribute("class").is_none());
    }

    #[test]
    fn detach_children_orphans_them() {
        let (mut tree, html, body, _) = sample_tree();
        tree.detach_children(html);
        assert!(tree.children(html).is_empty());
        assert!(tree.parent(body).is_none());
    }
}
