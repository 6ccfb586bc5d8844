//! Layout engine: styled node tree to positioned box tree.
//!
//! The box tree is its own arena, parallel to the node tree; a node may be
//! realized as zero or more boxes. Layout runs in two conceptual passes:
//! widths flow top-down from the parent before children lay out, heights
//! flow bottom-up once children are done, and lines assign word positions
//! around a shared baseline. Vertical placement chains through each box's
//! previous sibling, so a parent never revisits laid-out children.

use wallaby_dom::{DomTree, NodeId, NodeType, StyleMap};

use crate::fonts::{FontCache, FontDescriptor};

/// Fixed horizontal margin the document reserves on both sides.
pub const H_STEP: f32 = 13.0;
/// Fixed vertical margin the document reserves above and below.
pub const V_STEP: f32 = 18.0;
/// Line height multiplier applied to the tallest ascent/descent on a line.
pub const LINE_SPACING: f32 = 1.25;
/// Fixed pixel width of input and button widgets.
pub const INPUT_WIDTH_PX: f32 = 200.0;

/// Tags that establish block-level boxes.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "html",
    "body",
    "article",
    "section",
    "nav",
    "aside",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hgroup",
    "header",
    "footer",
    "address",
    "p",
    "hr",
    "pre",
    "blockquote",
    "ol",
    "ul",
    "menu",
    "li",
    "dl",
    "dt",
    "dd",
    "figure",
    "figcaption",
    "main",
    "div",
    "table",
    "form",
    "fieldset",
    "legend",
    "details",
    "summary",
];

/// How a node participates in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Stacks vertically, one box per child.
    Block,
    /// Flows words and widgets into lines.
    Inline,
}

/// Decide a node's layout mode.
///
/// Text is always inline. An element with no children is block, so empty
/// containers still reserve block space. An element is block if any of its
/// element children has a block-level tag, else inline.
#[must_use]
pub fn layout_mode(dom: &DomTree, node: NodeId) -> LayoutMode {
    match dom.get(node).map(|n| &n.node_type) {
        Some(NodeType::Text(_)) => LayoutMode::Inline,
        Some(NodeType::Element(_)) => {
            let children = dom.children(node);
            if children.is_empty() {
                return LayoutMode::Block;
            }
            for &child in children {
                if let Some(tag) = dom.tag(child)
                    && BLOCK_ELEMENTS.contains(&tag)
                {
                    return LayoutMode::Block;
                }
            }
            LayoutMode::Inline
        }
        None => LayoutMode::Block,
    }
}

/// A type-safe index into the box arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxId(pub usize);

/// The box variants of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxKind {
    /// The root box reserving the document margins.
    Document,
    /// A vertically stacked container.
    Block,
    /// A container flowing content into lines.
    Inline,
    /// One horizontal line of words and widgets.
    Line,
    /// A single measured word.
    Word {
        /// The word's characters.
        text: String,
    },
    /// A fixed-width input or button.
    Widget,
}

/// A positioned, sized unit of the layout tree.
///
/// `x`/`width` are only valid once the parent assigned them; `height` is
/// only valid once all children are laid out; `y` of words is only valid
/// after their line's baseline pass.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// Which variant this box is.
    pub kind: BoxKind,
    /// The node this box realizes.
    pub node: NodeId,
    /// The containing box, if any.
    pub parent: Option<BoxId>,
    /// The previous sibling, chaining vertical (or horizontal) placement.
    pub previous: Option<BoxId>,
    /// Child boxes in paint order.
    pub children: Vec<BoxId>,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width, assigned top-down.
    pub width: f32,
    /// Height, computed bottom-up.
    pub height: f32,
    /// The font words and widgets were measured with.
    pub font: Option<FontDescriptor>,
}

/// Per-inline-box flow state during word collection.
struct InlineState {
    cursor_x: f32,
    previous_word: Option<BoxId>,
}

/// The box arena for one layout run.
///
/// Each run replaces the previous tree wholesale; there is no incremental
/// relayout.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    boxes: Vec<LayoutBox>,
    root: BoxId,
}

impl LayoutTree {
    /// Lay out a styled node tree into the given viewport width.
    ///
    /// The cascade must have run first; unstyled nodes measure with
    /// default fonts. The font cache is an explicit handle and may be
    /// reused across runs.
    #[must_use]
    pub fn layout(dom: &DomTree, viewport_width: f32, fonts: &mut FontCache<'_>) -> Self {
        let mut tree = Self {
            boxes: Vec::new(),
            root: BoxId(0),
        };
        let root = tree.push(BoxKind::Document, dom.root(), None, None);
        tree.root = root;
        tree.layout_document(dom, fonts, viewport_width);
        tree
    }

    /// The root (document) box.
    #[must_use]
    pub fn root(&self) -> BoxId {
        self.root
    }

    /// Get a box by id.
    ///
    /// # Panics
    /// Panics if `id` does not come from this tree.
    #[must_use]
    pub fn get(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }

    /// Iterate over every box in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (BoxId, &LayoutBox)> {
        self.boxes.iter().enumerate().map(|(i, b)| (BoxId(i), b))
    }

    /// Number of boxes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// True when the tree holds no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Allocate a box and attach it to its parent's child list.
    fn push(
        &mut self,
        kind: BoxKind,
        node: NodeId,
        parent: Option<BoxId>,
        previous: Option<BoxId>,
    ) -> BoxId {
        let id = BoxId(self.boxes.len());
        self.boxes.push(LayoutBox {
            kind,
            node,
            parent,
            previous,
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            font: None,
        });
        if let Some(parent) = parent {
            self.boxes[parent.0].children.push(id);
        }
        id
    }

    /// Inherit width and x from the parent; chain y through the previous
    /// sibling, or start at the parent's top for the first child.
    fn place_from_parent(&mut self, id: BoxId) {
        let Some(parent) = self.boxes[id.0].parent else {
            return;
        };
        self.boxes[id.0].width = self.boxes[parent.0].width;
        self.boxes[id.0].x = self.boxes[parent.0].x;
        self.boxes[id.0].y = match self.boxes[id.0].previous {
            Some(prev) => self.boxes[prev.0].y + self.boxes[prev.0].height,
            None => self.boxes[parent.0].y,
        };
    }

    /// Document level: reserve the fixed margins and delegate to one root
    /// block box.
    fn layout_document(&mut self, dom: &DomTree, fonts: &mut FontCache<'_>, width: f32) {
        let doc = self.root;
        self.boxes[doc.0].width = width - 2.0 * H_STEP;
        self.boxes[doc.0].x = H_STEP;
        self.boxes[doc.0].y = V_STEP;
        let child = self.push(BoxKind::Block, self.boxes[doc.0].node, Some(doc), None);
        self.layout_block(dom, fonts, child);
        self.boxes[doc.0].height = self.boxes[child.0].height + 2.0 * V_STEP;
    }

    /// Block level: one child box per node child, stacked vertically,
    /// height summed bottom-up.
    fn layout_block(&mut self, dom: &DomTree, fonts: &mut FontCache<'_>, id: BoxId) {
        let node = self.boxes[id.0].node;
        let mut previous: Option<BoxId> = None;
        for &child_node in dom.children(node) {
            let kind = match layout_mode(dom, child_node) {
                LayoutMode::Inline => BoxKind::Inline,
                LayoutMode::Block => BoxKind::Block,
            };
            previous = Some(self.push(kind, child_node, Some(id), previous));
        }
        self.place_from_parent(id);
        let children = self.boxes[id.0].children.clone();
        for &child in &children {
            if self.boxes[child.0].kind == BoxKind::Inline {
                self.layout_inline(dom, fonts, child);
            } else {
                self.layout_block(dom, fonts, child);
            }
        }
        self.boxes[id.0].height = children.iter().map(|c| self.boxes[c.0].height).sum();
    }

    /// Inline level: collect words and widgets into lines, then resolve
    /// each line's baseline.
    fn layout_inline(&mut self, dom: &DomTree, fonts: &mut FontCache<'_>, id: BoxId) {
        self.place_from_parent(id);
        let mut state = InlineState {
            cursor_x: self.boxes[id.0].x,
            previous_word: None,
        };
        self.new_line(id, &mut state);
        let node = self.boxes[id.0].node;
        self.collect_inline(dom, fonts, id, node, &mut state);
        let lines = self.boxes[id.0].children.clone();
        for &line in &lines {
            self.layout_line(fonts, line);
        }
        self.boxes[id.0].height = lines.iter().map(|l| self.boxes[l.0].height).sum();
    }

    /// Collection sub-phase: walk the node subtree appending words and
    /// widgets to the current line.
    fn collect_inline(
        &mut self,
        dom: &DomTree,
        fonts: &mut FontCache<'_>,
        inline: BoxId,
        node: NodeId,
        state: &mut InlineState,
    ) {
        match dom.get(node).map(|n| &n.node_type) {
            Some(NodeType::Text(text)) => {
                self.words(dom, fonts, inline, node, text, state);
            }
            Some(NodeType::Element(data)) => match data.tag.as_str() {
                "br" => self.new_line(inline, state),
                "input" | "button" => self.widget(dom, fonts, inline, node, state),
                _ => {
                    for &child in dom.children(node) {
                        self.collect_inline(dom, fonts, inline, child, state);
                    }
                }
            },
            None => {}
        }
    }

    /// Start a fresh line under the inline box.
    fn new_line(&mut self, inline: BoxId, state: &mut InlineState) {
        state.previous_word = None;
        state.cursor_x = self.boxes[inline.0].x;
        let last_line = self.boxes[inline.0].children.last().copied();
        let node = self.boxes[inline.0].node;
        let _ = self.push(BoxKind::Line, node, Some(inline), last_line);
    }

    fn current_line(&mut self, inline: BoxId, state: &mut InlineState) -> BoxId {
        if let Some(&line) = self.boxes[inline.0].children.last() {
            line
        } else {
            self.new_line(inline, state);
            self.boxes[inline.0].children.last().copied().unwrap_or(inline)
        }
    }

    /// Append each word of a text node, breaking the line when the next
    /// word would exceed the available width. A word wider than the whole
    /// line still lands on its own (fresh) line, so layout cannot loop.
    fn words(
        &mut self,
        dom: &DomTree,
        fonts: &mut FontCache<'_>,
        inline: BoxId,
        node: NodeId,
        text: &str,
        state: &mut InlineState,
    ) {
        let font = node_font(dom, node);
        let right_edge = self.boxes[inline.0].x + self.boxes[inline.0].width;
        for word in text.split_whitespace() {
            let width = fonts.measure(&font, word);
            if state.cursor_x + width > right_edge {
                self.new_line(inline, state);
            }
            let line = self.current_line(inline, state);
            let word_box = self.push(
                BoxKind::Word {
                    text: word.to_string(),
                },
                node,
                Some(line),
                state.previous_word,
            );
            self.boxes[word_box.0].font = Some(font);
            state.previous_word = Some(word_box);
            state.cursor_x += width + fonts.space_width(&font);
        }
    }

    /// Append a fixed-width input/button widget, breaking the line first
    /// when it would not fit.
    fn widget(
        &mut self,
        dom: &DomTree,
        fonts: &mut FontCache<'_>,
        inline: BoxId,
        node: NodeId,
        state: &mut InlineState,
    ) {
        let right_edge = self.boxes[inline.0].x + self.boxes[inline.0].width;
        if state.cursor_x + INPUT_WIDTH_PX > right_edge {
            self.new_line(inline, state);
        }
        let line = self.current_line(inline, state);
        let font = node_font(dom, node);
        let widget = self.push(BoxKind::Widget, node, Some(line), state.previous_word);
        self.boxes[widget.0].font = Some(font);
        state.previous_word = Some(widget);
        state.cursor_x += INPUT_WIDTH_PX + fonts.space_width(&font);
    }

    /// Line resolution: place children left-to-right, then align them on
    /// a shared baseline and derive the line height.
    fn layout_line(&mut self, fonts: &mut FontCache<'_>, line: BoxId) {
        self.place_from_parent(line);
        let children = self.boxes[line.0].children.clone();
        for &child in &children {
            self.layout_inline_item(fonts, child);
        }
        // An empty line (trailing <br>, inline box with no words) takes no
        // vertical space and must not panic the max-ascent scan.
        if children.is_empty() {
            self.boxes[line.0].height = 0.0;
            return;
        }
        let mut max_ascent = 0.0f32;
        let mut max_descent = 0.0f32;
        for &child in &children {
            let font = self.boxes[child.0].font.unwrap_or_default();
            max_ascent = max_ascent.max(fonts.ascent(&font));
            max_descent = max_descent.max(fonts.descent(&font));
        }
        let baseline = self.boxes[line.0].y + LINE_SPACING * max_ascent;
        for &child in &children {
            let font = self.boxes[child.0].font.unwrap_or_default();
            self.boxes[child.0].y = baseline - fonts.ascent(&font);
        }
        self.boxes[line.0].height = LINE_SPACING * (max_ascent + max_descent);
    }

    /// Size and x-position one word or widget on its line.
    fn layout_inline_item(&mut self, fonts: &mut FontCache<'_>, id: BoxId) {
        let font = self.boxes[id.0].font.unwrap_or_default();
        let width = match &self.boxes[id.0].kind {
            BoxKind::Word { text } => fonts.measure(&font, text),
            _ => INPUT_WIDTH_PX,
        };
        self.boxes[id.0].width = width;
        self.boxes[id.0].x = match self.boxes[id.0].previous {
            Some(prev) => {
                let prev_font = self.boxes[prev.0].font.unwrap_or_default();
                self.boxes[prev.0].x + self.boxes[prev.0].width + fonts.space_width(&prev_font)
            }
            None => {
                let parent = self.boxes[id.0].parent.unwrap_or(id);
                self.boxes[parent.0].x
            }
        };
        // y is assigned by the line's baseline pass.
        self.boxes[id.0].height = fonts.linespace(&font);
    }
}

/// The font a node's words measure with, from its resolved style.
fn node_font(dom: &DomTree, node: NodeId) -> FontDescriptor {
    dom.style(node)
        .map_or_else(FontDescriptor::default, FontDescriptor::from_style)
}
