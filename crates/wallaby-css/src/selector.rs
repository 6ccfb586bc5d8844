//! Selector matching and cascade priority.

use wallaby_dom::{DomTree, NodeId};

use crate::parser::Rule;

/// A parsed selector.
///
/// Only tag selectors and descendant chains exist; everything else the
/// sheet parser cannot express fails at parse time and drops the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Matches elements with the given (lowercased) tag name.
    Tag(String),
    /// Matches a node the right-hand selector matches, provided some
    /// ancestor matches the left-hand selector.
    Descendant(Box<Selector>, Box<Selector>),
}

impl Selector {
    /// Tree-aware matching: does this selector select `id`?
    ///
    /// Text nodes never match (they have no tag). Descendant matching
    /// walks the ancestor chain, so `div p` matches a `p` at any depth
    /// under a `div`.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self {
            Selector::Tag(tag) => tree.tag(id) == Some(tag.as_str()),
            Selector::Descendant(ancestor, descendant) => {
                descendant.matches(tree, id)
                    && tree.ancestors(id).any(|a| ancestor.matches(tree, a))
            }
        }
    }

    /// Specificity weight: a chain of N simple selectors weighs N.
    #[must_use]
    pub fn priority(&self) -> u32 {
        match self {
            Selector::Tag(_) => 1,
            Selector::Descendant(ancestor, descendant) => {
                ancestor.priority() + descendant.priority()
            }
        }
    }
}

/// Sort key for the cascade: rule specificity.
///
/// Used with a stable sort so that equal-specificity rules keep their
/// source order, letting later rules win ties naturally.
#[must_use]
pub fn cascade_priority(rule: &Rule) -> u32 {
    rule.selector.priority()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallaby_dom::{AttributesMap, ElementData, NodeType};

    fn tag(name: &str) -> Selector {
        Selector::Tag(name.to_string())
    }

    fn descendant(ancestor: Selector, descendant: Selector) -> Selector {
        Selector::Descendant(Box::new(ancestor), Box::new(descendant))
    }

    /// html > body > div > p ("x")
    fn sample_tree() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let html = tree.alloc(NodeType::Element(ElementData::new(
            "html",
            AttributesMap::new(),
        )));
        let body = tree.alloc(NodeType::Element(ElementData::new(
            "body",
            AttributesMap::new(),
        )));
        let div = tree.alloc(NodeType::Element(ElementData::new(
            "div",
            AttributesMap::new(),
        )));
        let p = tree.alloc(NodeType::Element(ElementData::new(
            "p",
            AttributesMap::new(),
        )));
        let text = tree.alloc(NodeType::Text("x".to_string()));
        tree.set_root(html);
        tree.append_child(html, body);
        tree.append_child(body, div);
        tree.append_child(div, p);
        tree.append_child(p, text);
        (tree, p, text)
    }

    #[test]
    fn tag_selector_matches_by_tag() {
        let (tree, p, text) = sample_tree();
        assert!(tag("p").matches(&tree, p));
        assert!(!tag("div").matches(&tree, p));
        assert!(!tag("p").matches(&tree, text));
    }

    #[test]
    fn descendant_selector_walks_ancestors() {
        let (tree, p, _) = sample_tree();
        assert!(descendant(tag("div"), tag("p")).matches(&tree, p));
        // Non-immediate ancestors count too.
        assert!(descendant(tag("html"), tag("p")).matches(&tree, p));
        assert!(!descendant(tag("ul"), tag("p")).matches(&tree, p));
        // The descendant side must match the node itself.
        assert!(!descendant(tag("div"), tag("span")).matches(&tree, p));
    }

    #[test]
    fn chain_of_n_selectors_has_priority_n() {
        assert_eq!(tag("p").priority(), 1);
        assert_eq!(descendant(tag("div"), tag("p")).priority(), 2);
        assert_eq!(
            descendant(descendant(tag("body"), tag("div")), tag("p")).priority(),
            3
        );
    }
}
