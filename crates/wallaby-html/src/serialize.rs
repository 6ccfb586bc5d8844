//! Tree re-serialization and debug printing.

use std::fmt::Write as _;

use wallaby_dom::{DomTree, NodeId, NodeType};

use crate::parser::transform;

/// Tags the parser treats as childless; serialized without a closing tag.
const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Re-serialize a tree to markup.
///
/// Text content is re-escaped so that parsing the output reproduces the
/// same tag names, text content, and child order (structural idempotence).
/// Attribute keys are emitted in sorted order since the attribute map does
/// not preserve source order.
#[must_use]
pub fn serialize(tree: &DomTree) -> String {
    let mut out = String::new();
    serialize_node(tree, tree.root(), &mut out);
    out
}

fn serialize_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.node_type {
        NodeType::Text(text) => out.push_str(&transform(text)),
        NodeType::Element(data) => {
            out.push('<');
            out.push_str(&data.tag);
            let mut keys: Vec<&String> = data.attributes.keys().collect();
            keys.sort();
            for key in keys {
                let value = &data.attributes[key];
                if value.is_empty() {
                    let _ = write!(out, " {key}");
                } else {
                    let _ = write!(out, " {key}={value}");
                }
            }
            out.push('>');
            if SELF_CLOSING_TAGS.contains(&data.tag.as_str()) {
                return;
            }
            for &child in tree.children(id) {
                serialize_node(tree, child, out);
            }
            let _ = write!(out, "</{}>", data.tag);
        }
    }
}

/// Format the subtree rooted at `id` as an indented outline.
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId, indent: usize) -> String {
    let mut out = String::new();
    format_node(tree, id, indent, &mut out);
    out
}

fn format_node(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    let pad = " ".repeat(indent);
    match &node.node_type {
        NodeType::Text(text) => {
            let _ = writeln!(out, "{pad}{text:?}");
        }
        NodeType::Element(data) => {
            let _ = write!(out, "{pad}<{}", data.tag);
            let mut keys: Vec<&String> = data.attributes.keys().collect();
            keys.sort();
            for key in keys {
                let _ = write!(out, " {key}={:?}", data.attributes[key]);
            }
            let _ = writeln!(out, ">");
            for &child in tree.children(id) {
                format_node(tree, child, indent + 2, out);
            }
        }
    }
}

/// Pretty-print the subtree rooted at `id` to stdout.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    print!("{}", format_tree(tree, id, indent));
}
