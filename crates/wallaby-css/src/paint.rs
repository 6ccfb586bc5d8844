//! Paint commands: the output of the pipeline.
//!
//! Commands are appended in paint order (back to front) and each exposes a
//! vertical extent so consumers can cull against a scroll window without
//! understanding the payload.

use serde::Serialize;
use wallaby_dom::{DomTree, NodeId, NodeType};

use crate::fonts::FontDescriptor;
use crate::layout::{BoxKind, LayoutTree};

/// Background used for input and button widgets when no `background-color`
/// resolves; widgets always paint a visible background.
const WIDGET_BACKGROUND: &str = "lightblue";

/// An axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Rect {
    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge (`y + height`).
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// An abstract drawing instruction.
///
/// Colors stay raw computed-value strings; no rendering backend is implied.
#[derive(Debug, Clone, Serialize)]
pub enum PaintCommand {
    /// Draw a text run at a position.
    DrawText {
        /// The measured bounds of the run.
        rect: Rect,
        /// The characters to draw.
        text: String,
        /// The font the run was measured with.
        font: FontDescriptor,
        /// Resolved `color` value.
        color: String,
    },
    /// Fill a rectangle with a solid color.
    DrawRect {
        /// The rectangle to fill.
        rect: Rect,
        /// Resolved `background-color` value.
        color: String,
    },
}

impl PaintCommand {
    /// Top of the command's vertical extent.
    #[must_use]
    pub fn top(&self) -> f32 {
        match self {
            PaintCommand::DrawText { rect, .. } | PaintCommand::DrawRect { rect, .. } => rect.top(),
        }
    }

    /// Bottom of the command's vertical extent.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        match self {
            PaintCommand::DrawText { rect, .. } | PaintCommand::DrawRect { rect, .. } => {
                rect.bottom()
            }
        }
    }
}

/// An ordered list of paint commands for one layout run.
pub type DisplayList = Vec<PaintCommand>;

/// Flatten a laid-out box tree into paint commands.
///
/// The full list is always returned; visibility culling is the consumer's
/// job (see the renderer's `visible` helper).
#[must_use]
pub fn paint(layout: &LayoutTree, dom: &DomTree) -> DisplayList {
    let mut list = DisplayList::new();
    paint_box(layout, dom, layout.root(), &mut list);
    list
}

fn paint_box(
    layout: &LayoutTree,
    dom: &DomTree,
    id: crate::layout::BoxId,
    list: &mut DisplayList,
) {
    let b = layout.get(id);
    let rect = Rect {
        x: b.x,
        y: b.y,
        width: b.width,
        height: b.height,
    };
    match &b.kind {
        BoxKind::Document | BoxKind::Line => {}
        BoxKind::Block | BoxKind::Inline => {
            if let Some(color) = background_color(dom, b.node) {
                list.push(PaintCommand::DrawRect { rect, color });
            }
        }
        BoxKind::Word { text } => {
            list.push(PaintCommand::DrawText {
                rect,
                text: text.clone(),
                font: b.font.unwrap_or_default(),
                color: resolved_color(dom, b.node),
            });
            return;
        }
        BoxKind::Widget => {
            let color =
                background_color(dom, b.node).unwrap_or_else(|| WIDGET_BACKGROUND.to_string());
            list.push(PaintCommand::DrawRect { rect, color });
            list.push(PaintCommand::DrawText {
                rect,
                text: widget_text(dom, b.node),
                font: b.font.unwrap_or_default(),
                color: resolved_color(dom, b.node),
            });
            return;
        }
    }
    for &child in &b.children {
        paint_box(layout, dom, child, list);
    }
}

/// A non-transparent resolved `background-color`, if any.
fn background_color(dom: &DomTree, node: NodeId) -> Option<String> {
    dom.style(node)
        .and_then(|s| s.get("background-color"))
        .filter(|c| c.as_str() != "transparent")
        .cloned()
}

/// The resolved `color`, defaulting to black.
fn resolved_color(dom: &DomTree, node: NodeId) -> String {
    dom.style(node)
        .and_then(|s| s.get("color"))
        .cloned()
        .unwrap_or_else(|| "black".to_string())
}

/// The text payload of an input or button widget: the `value` attribute
/// for inputs, the first text child's content for buttons.
fn widget_text(dom: &DomTree, node: NodeId) -> String {
    match dom.get(node).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) if data.tag == "input" => data
            .attribute("value")
            .map_or_else(String::new, str::to_string),
        Some(NodeType::Element(data)) if data.tag == "button" => dom
            .children(node)
            .iter()
            .find_map(|&c| dom.as_text(c))
            .map_or_else(String::new, str::to_string),
        _ => String::new(),
    }
}
