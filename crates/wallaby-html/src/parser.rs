//! Single-pass tolerant markup parser.
//!
//! The parser never fails: malformed input degrades to a best-effort tree.
//! Structural recovery is built around an explicit stack of unfinished
//! elements and an implicit-tag step that synthesizes `html`, `head`, and
//! `body` ancestors the source left out.

use wallaby_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

/// Tags that never take children and are appended without being pushed on
/// the open-element stack.
const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tags that belong in `head`; seeing one at the `html` level implies an
/// open `head`.
const HEAD_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "noscript", "link", "meta", "title", "style", "script",
];

/// Tags the implicit-insertion step never reacts to at the `html` level.
const IMPLICIT_TAGS: &[&str] = &["head", "body", "/html"];

/// Decode the two entities the pipeline recognizes in text content.
#[must_use]
pub fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<").replace("&gt;", ">")
}

/// Escape markup so the parser renders it as literal visible text.
///
/// This is the view-source pre-filter: it runs on the raw document string
/// before parsing, it is not a parser mode.
#[must_use]
pub fn transform(body: &str) -> String {
    body.replace('<', "&lt;").replace('>', "&gt;")
}

/// A single-pass parser building a [`DomTree`] from a markup string.
///
/// Never fails on malformed input; recovers by inserting implicit structure
/// and ignoring stray closing tags.
pub struct MarkupParser {
    body: String,
    tree: DomTree,
    /// Stack of open elements, outermost first.
    unfinished: Vec<NodeId>,
}

impl MarkupParser {
    /// Create a parser over a raw markup string.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            tree: DomTree::new(),
            unfinished: Vec::new(),
        }
    }

    /// Consume the input and build the node tree.
    ///
    /// The returned tree always has a single `html` element root, with
    /// implicit `head`/`body` ancestors inserted around content that
    /// appeared without them.
    #[must_use]
    pub fn parse(mut self) -> DomTree {
        let body = std::mem::take(&mut self.body);
        let mut text = String::new();
        let mut in_tag = false;
        // Text accumulated inside an explicit <head> region is dropped;
        // the flag tracks the region by raw tag text.
        let mut in_body = true;
        for ch in body.chars() {
            match ch {
                '<' => {
                    in_tag = true;
                    if !text.is_empty() && in_body {
                        self.add_text(&unescape_entities(&text));
                    }
                    text.clear();
                }
                '>' => {
                    in_tag = false;
                    if text == "head" {
                        in_body = false;
                    } else if text == "/head" {
                        in_body = true;
                    }
                    self.add_tag(&std::mem::take(&mut text));
                }
                _ => text.push(ch),
            }
        }
        if !in_tag && !text.is_empty() {
            self.add_text(&unescape_entities(&text));
        }
        self.finish()
    }

    /// Attach accumulated character data as a text node under the current
    /// open element. Whitespace-only runs are dropped.
    fn add_text(&mut self, text: &str) {
        if text.chars().all(char::is_whitespace) {
            return;
        }
        self.implicit_tags(None);
        let node = self.tree.alloc(NodeType::Text(text.to_string()));
        if let Some(&parent) = self.unfinished.last() {
            self.tree.append_child(parent, node);
        }
    }

    /// Process the text between `<` and `>` as a tag.
    fn add_tag(&mut self, tag_text: &str) {
        let Some((tag, attributes)) = get_attributes(tag_text) else {
            return;
        };
        // Comments, doctypes, and the like.
        if tag.starts_with('!') {
            return;
        }
        self.implicit_tags(Some(&tag));
        if let Some(tag) = tag.strip_prefix('/') {
            // A stray close with only the root open is ignored.
            if self.unfinished.len() <= 1 {
                return;
            }
            let node = self.unfinished.pop().unwrap_or(NodeId(0));
            if self.tree.tag(node) != Some(tag) {
                wallaby_common::warn_once(
                    "HTML",
                    &format!("mismatched closing tag </{tag}>, closing open element instead"),
                );
            }
            if let Some(&parent) = self.unfinished.last() {
                self.tree.append_child(parent, node);
            }
        } else if SELF_CLOSING_TAGS.contains(&tag.as_str()) {
            let node = self
                .tree
                .alloc(NodeType::Element(ElementData::new(tag, attributes)));
            if let Some(&parent) = self.unfinished.last() {
                self.tree.append_child(parent, node);
            }
        } else {
            let node = self
                .tree
                .alloc(NodeType::Element(ElementData::new(tag, attributes)));
            self.unfinished.push(node);
        }
    }

    /// Insert the implicit structure the source omitted.
    ///
    /// Runs before every tag (and before text): opens `html` when the stack
    /// is empty, opens `head` or `body` when content appears directly under
    /// `html`, and closes `head` when body content appears inside it.
    /// `tag` is `None` when the pending content is text.
    fn implicit_tags(&mut self, tag: Option<&str>) {
        loop {
            let open: Vec<&str> = self
                .unfinished
                .iter()
                .filter_map(|&id| self.tree.tag(id))
                .collect();
            if open.is_empty() && tag != Some("html") {
                self.add_tag("html");
            } else if open == ["html"] && !matches!(tag, Some(t) if IMPLICIT_TAGS.contains(&t)) {
                if matches!(tag, Some(t) if HEAD_TAGS.contains(&t)) {
                    self.add_tag("head");
                } else {
                    self.add_tag("body");
                }
            } else if open == ["html", "head"]
                && !matches!(tag, Some(t) if t == "/head" || HEAD_TAGS.contains(&t))
            {
                self.add_tag("/head");
            } else {
                break;
            }
        }
    }

    /// Close any still-open elements and seal the tree.
    fn finish(mut self) -> DomTree {
        if self.unfinished.is_empty() {
            self.add_tag("html");
        }
        while self.unfinished.len() > 1 {
            let node = self.unfinished.pop().unwrap_or(NodeId(0));
            if let Some(&parent) = self.unfinished.last() {
                self.tree.append_child(parent, node);
            }
        }
        let root = self.unfinished.pop().unwrap_or(NodeId(0));
        self.tree.set_root(root);
        self.tree
    }
}

/// Split tag text into a lowercased tag name and its attribute map.
///
/// Attributes split on the first `=`; values wrapped in a matching layer of
/// quotes have that layer stripped; bare attribute names map to the empty
/// string. Returns `None` for empty tag text (`<>`), which is dropped.
fn get_attributes(text: &str) -> Option<(String, AttributesMap)> {
    let mut parts = text.split_whitespace();
    let tag = parts.next()?.to_ascii_lowercase();
    let mut attributes = AttributesMap::new();
    for pair in parts {
        if let Some((key, value)) = pair.split_once('=') {
            let mut value = value.to_string();
            let bytes = value.as_bytes();
            if value.len() > 2
                && (bytes[0] == b'\'' || bytes[0] == b'"')
                && bytes[value.len() - 1] == bytes[0]
            {
                value = value[1..value.len() - 1].to_string();
            }
            let _ = attributes.insert(key.to_ascii_lowercase(), value);
        } else {
            let _ = attributes.insert(pair.to_ascii_lowercase(), String::new());
        }
    }
    Some((tag, attributes))
}
