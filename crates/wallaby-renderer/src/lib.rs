//! Pipeline orchestration for the wallaby renderer.
//!
//! # Scope
//!
//! This crate ties the stages together:
//! - **Document** - owns the node tree, the sorted rule list, the box tree,
//!   and the display list; exposes `restyle`, `relayout`, and `render` so a
//!   host can re-run stages after mutating the tree
//! - **Sheet collection** - a built-in default sheet, `<style>` element
//!   contents, and host-supplied sheets, merged in that order and sorted
//!   once by cascade priority
//! - **Viewport culling** - filters the display list to the commands that
//!   intersect a scrolled window
//! - **Fontdue metrics** - a real measurement backend for hosts that want
//!   accurate text widths
//!
//! # Not Yet Implemented
//!
//! - Fetching external sheets (`<link rel=stylesheet>`)
//! - Incremental restyle or relayout
//! - Rasterization; the display list is the final output

pub mod font_metrics;

use wallaby_common::clear_warnings;
use wallaby_css::{
    DisplayList, FontCache, LayoutTree, PaintCommand, Rule, Selector, SheetParser,
    cascade_priority, paint, style,
};
use wallaby_dom::{DomTree, NodeId};
use wallaby_html::{MarkupParser, transform};

pub use font_metrics::{FontError, FontdueFontMetrics};

/// Default presentation for documents that bring no sheet of their own.
pub const DEFAULT_STYLE_SHEET: &str = "
pre { background-color: gray; }
a { color: blue; }
i { font-style: italic; }
b { font-weight: bold; }
small { font-size: 90%; }
big { font-size: 110%; }
input { font-size: 16px; background-color: lightblue; }
button { font-size: 16px; background-color: orange; }
";

/// A loaded document: the node tree plus everything derived from it.
///
/// `load` parses markup and collects rules; `render` runs the cascade,
/// layout, and paint stages. A host that mutates the tree (scripting,
/// attribute edits) calls `restyle` and `relayout` to bring the derived
/// state back in line; both are idempotent.
pub struct Document {
    dom: DomTree,
    rules: Vec<Rule>,
    viewport_width: f32,
    layout: Option<LayoutTree>,
    display_list: DisplayList,
}

impl Document {
    /// Parse markup and collect the document's rules.
    ///
    /// Rules come from the default sheet, then from `<style>` elements in
    /// document order, then from `user_sheets`; the merged list is sorted
    /// by cascade priority once so every restyle sees the same order.
    #[must_use]
    pub fn load(markup: &str, user_sheets: &[&str], viewport_width: f32) -> Self {
        clear_warnings();
        let dom = MarkupParser::new(markup).parse();
        let mut rules = SheetParser::new(DEFAULT_STYLE_SHEET).parse_rules();
        for text in document_sheets(&dom) {
            rules.extend(SheetParser::new(&text).parse_rules());
        }
        for sheet in user_sheets {
            rules.extend(SheetParser::new(sheet).parse_rules());
        }
        rules.sort_by_key(cascade_priority);
        Self {
            dom,
            rules,
            viewport_width,
            layout: None,
            display_list: Vec::new(),
        }
    }

    /// Load markup as literal text, the way a view-source scheme would.
    #[must_use]
    pub fn load_view_source(markup: &str, viewport_width: f32) -> Self {
        Self::load(&transform(markup), &[], viewport_width)
    }

    /// Run the full pipeline: cascade, layout, paint.
    pub fn render(&mut self, fonts: &mut FontCache) {
        self.restyle();
        self.relayout(fonts);
    }

    /// Re-run the cascade over the current tree.
    pub fn restyle(&mut self) {
        style(&mut self.dom, &self.rules);
    }

    /// Rebuild the box tree and display list from the current styles.
    pub fn relayout(&mut self, fonts: &mut FontCache) {
        let layout = LayoutTree::layout(&self.dom, self.viewport_width, fonts);
        self.display_list = paint(&layout, &self.dom);
        self.layout = Some(layout);
    }

    /// The document's node tree.
    #[must_use]
    pub fn dom(&self) -> &DomTree {
        &self.dom
    }

    /// Mutable access for hosts that script against the tree. The caller
    /// owns re-running `restyle` and `relayout` afterwards.
    pub fn dom_mut(&mut self) -> &mut DomTree {
        &mut self.dom
    }

    /// The sorted rule list in effect.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The display list from the most recent `relayout`.
    #[must_use]
    pub fn display_list(&self) -> &DisplayList {
        &self.display_list
    }

    /// The box tree from the most recent `relayout`, if any.
    #[must_use]
    pub fn layout(&self) -> Option<&LayoutTree> {
        self.layout.as_ref()
    }

    /// Total laid-out height including the document margins.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.layout
            .as_ref()
            .map_or(0.0, |l| l.get(l.root()).height)
    }

    /// Change the layout width. Takes effect on the next `relayout`.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// All elements matching a selector, in document order.
    ///
    /// Unparseable selector text matches nothing.
    #[must_use]
    pub fn query(&self, selector_text: &str) -> Vec<NodeId> {
        let Some(selector) = parse_selector(selector_text) else {
            return Vec::new();
        };
        self.dom
            .tree_to_list(self.dom.root())
            .into_iter()
            .filter(|&id| selector.matches(&self.dom, id))
            .collect()
    }
}

/// Concatenated text content of each `<style>` element, in document order.
fn document_sheets(tree: &DomTree) -> Vec<String> {
    tree.tree_to_list(tree.root())
        .into_iter()
        .filter(|&id| tree.tag(id) == Some("style"))
        .map(|id| {
            tree.children(id)
                .iter()
                .filter_map(|&child| tree.as_text(child))
                .collect::<String>()
        })
        .collect()
}

fn parse_selector(text: &str) -> Option<Selector> {
    SheetParser::new(&format!("{text} {{ }}"))
        .parse_rules()
        .into_iter()
        .next()
        .map(|rule| rule.selector)
}

/// The commands that intersect the window `[scroll, scroll + height)`.
///
/// Commands entirely above or below the window are skipped; everything
/// that touches it is kept whole.
#[must_use]
pub fn visible(list: &DisplayList, scroll: f32, viewport_height: f32) -> Vec<&PaintCommand> {
    list.iter()
        .filter(|cmd| !(cmd.top() > scroll + viewport_height || cmd.bottom() < scroll))
        .collect()
}
