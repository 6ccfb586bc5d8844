//! Style resolution: inheritance, matched rules, inline overrides.
//!
//! Resolution recurses parent-before-children because percentage font
//! sizes resolve against the parent's already-resolved pixel value.

use wallaby_common::warn_once;
use wallaby_dom::{DomTree, NodeId, NodeType, StyleMap};

use crate::parser::{Rule, SheetParser};

/// Properties that inherit, with their root defaults.
pub const INHERITED_PROPERTIES: &[(&str, &str)] = &[
    ("font-size", "16px"),
    ("font-style", "normal"),
    ("font-weight", "normal"),
    ("color", "black"),
];

/// Resolve styles for the whole tree, mutating each node's style map in
/// place.
///
/// `rules` must already be priority-sorted (stable sort by
/// [`crate::selector::cascade_priority`]); rules are applied in slice
/// order, so later rules overwrite earlier ones. Each call rebuilds every
/// node's map wholesale, which makes a restyle idempotent.
pub fn style(tree: &mut DomTree, rules: &[Rule]) {
    style_node(tree, tree.root(), rules);
}

fn style_node(tree: &mut DomTree, id: NodeId, rules: &[Rule]) {
    let mut resolved = StyleMap::new();

    // 1. Seed inherited properties from the parent's resolved map, or the
    //    defaults at the root. Parents are styled first, so the lookup
    //    always finds a value below the root.
    let parent = tree.parent(id);
    for &(prop, default) in INHERITED_PROPERTIES {
        let value = parent
            .and_then(|p| tree.style(p))
            .and_then(|s| s.get(prop))
            .map_or_else(|| default.to_string(), String::clone);
        let _ = resolved.insert(prop.to_string(), value);
    }

    // 2. Apply matching sheet rules in ascending specificity order.
    for rule in rules {
        if !rule.selector.matches(tree, id) {
            continue;
        }
        for (prop, val) in &rule.declarations {
            if let Some(computed) = compute_value(tree, id, prop, val) {
                let _ = resolved.insert(prop.clone(), computed);
            }
        }
    }

    // 3. The node's own inline declarations win over any sheet rule,
    //    regardless of specificity.
    let inline = match tree.get(id).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) => data.attribute("style").map(str::to_string),
        _ => None,
    };
    if let Some(inline) = inline {
        for (prop, val) in SheetParser::new(&inline).parse_declarations() {
            if let Some(computed) = compute_value(tree, id, &prop, &val) {
                let _ = resolved.insert(prop, computed);
            }
        }
    }

    if let Some(node) = tree.get_mut(id) {
        node.style = resolved;
    }

    let children: Vec<NodeId> = tree.children(id).to_vec();
    for child in children {
        style_node(tree, child, rules);
    }
}

/// Unit resolution for a declared value.
///
/// `font-size` accepts `px` verbatim and resolves `%` against the parent's
/// already-resolved pixel size; any other unit is rejected, leaving the
/// prior (inherited or default) value untouched. Every other property
/// passes through as-is.
fn compute_value(tree: &DomTree, id: NodeId, prop: &str, val: &str) -> Option<String> {
    if prop != "font-size" {
        return Some(val.to_string());
    }
    if val.ends_with("px") {
        return Some(val.to_string());
    }
    if let Some(pct_text) = val.strip_suffix('%') {
        let pct: f32 = pct_text.parse().ok()?;
        let parent_px = tree
            .parent(id)
            .and_then(|p| tree.style(p))
            .and_then(|s| s.get("font-size"))
            .and_then(|v| v.strip_suffix("px"))
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(16.0);
        return Some(format!("{}px", parent_px * pct / 100.0));
    }
    warn_once("CSS", &format!("rejected unit in font-size: {val}"));
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::cascade_priority;
    use wallaby_dom::{AttributesMap, ElementData};

    fn sheet(text: &str) -> Vec<Rule> {
        let mut rules = SheetParser::new(text).parse_rules();
        rules.sort_by_key(cascade_priority);
        rules
    }

    fn element(tag: &str) -> NodeType {
        NodeType::Element(ElementData::new(tag, AttributesMap::new()))
    }

    fn get<'a>(tree: &'a DomTree, id: NodeId, prop: &str) -> &'a str {
        tree.style(id).unwrap().get(prop).unwrap()
    }

    #[test]
    fn defaults_seed_the_root() {
        let mut tree = DomTree::new();
        let html = tree.alloc(element("html"));
        tree.set_root(html);
        style(&mut tree, &[]);
        assert_eq!(get(&tree, html, "font-size"), "16px");
        assert_eq!(get(&tree, html, "color"), "black");
        assert_eq!(get(&tree, html, "font-weight"), "normal");
        assert_eq!(get(&tree, html, "font-style"), "normal");
    }

    #[test]
    fn inherited_properties_flow_down_to_text() {
        let mut tree = DomTree::new();
        let html = tree.alloc(element("html"));
        let p = tree.alloc(element("p"));
        let text = tree.alloc(NodeType::Text("x".to_string()));
        tree.set_root(html);
        tree.append_child(html, p);
        tree.append_child(p, text);

        style(&mut tree, &sheet("p { color: red; }"));
        assert_eq!(get(&tree, p, "color"), "red");
        // The text node inherits the paragraph's resolved color.
        assert_eq!(get(&tree, text, "color"), "red");
        // But rules never match text nodes directly.
        assert_eq!(get(&tree, html, "color"), "black");
    }

    #[test]
    fn percentage_font_size_resolves_against_parent() {
        let mut tree = DomTree::new();
        let html = tree.alloc(element("html"));
        let div = tree.alloc(element("div"));
        let p = tree.alloc(element("p"));
        tree.set_root(html);
        tree.append_child(html, div);
        tree.append_child(div, p);

        style(
            &mut tree,
            &sheet("div { font-size: 32px; } p { font-size: 50%; }"),
        );
        assert_eq!(get(&tree, div, "font-size"), "32px");
        assert_eq!(get(&tree, p, "font-size"), "16px");
    }

    #[test]
    fn unsupported_unit_keeps_prior_value() {
        let mut tree = DomTree::new();
        let html = tree.alloc(element("html"));
        let p = tree.alloc(element("p"));
        tree.set_root(html);
        tree.append_child(html, p);

        style(&mut tree, &sheet("p { font-size: 2em; }"));
        // 2em is rejected; the inherited 16px stays.
        assert_eq!(get(&tree, p, "font-size"), "16px");
    }

    #[test]
    fn inline_style_wins_over_any_sheet_rule() {
        let mut tree = DomTree::new();
        let html = tree.alloc(element("html"));
        let body = tree.alloc(element("body"));
        let mut attrs = AttributesMap::new();
        let _ = attrs.insert("style".to_string(), "color: green;".to_string());
        let p = tree.alloc(NodeType::Element(ElementData::new("p", attrs)));
        tree.set_root(html);
        tree.append_child(html, body);
        tree.append_child(body, p);

        style(
            &mut tree,
            &sheet("p { color: red; } html body p { color: blue; }"),
        );
        assert_eq!(get(&tree, p, "color"), "green");
    }

    #[test]
    fn restyle_is_idempotent() {
        let mut tree = DomTree::new();
        let html = tree.alloc(element("html"));
        let p = tree.alloc(element("p"));
        tree.set_root(html);
        tree.append_child(html, p);

        let rules = sheet("p { font-size: 50%; color: red; }");
        style(&mut tree, &rules);
        let first = tree.style(p).unwrap().clone();
        style(&mut tree, &rules);
        assert_eq!(tree.style(p).unwrap(), &first);
    }
}
