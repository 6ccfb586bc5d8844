//! Style sheet parsing, cascade, layout, and painting for the wallaby
//! rendering pipeline.
//!
//! # Scope
//!
//! This crate implements:
//! - **Sheet Parser** - cursor-driven rule and declaration parsing with
//!   local skip-and-resynchronize recovery; never errors to the caller
//! - **Selectors & Cascade** - tag and descendant selectors, specificity
//!   ordering with stable source-order tie-break, inheritance, percentage
//!   font-size resolution, inline-style overrides
//! - **Layout Engine** - block stacking, inline line flow with baseline
//!   alignment, fixed-width input/button widgets, document margins
//! - **Paint Commands** - an ordered display list of text and rectangle
//!   commands with vertical extents for viewport culling
//! - **Font Seam** - a measurement trait with a memoizing cache and a
//!   deterministic approximate backend for tests
//!
//! # Not Yet Implemented
//!
//! - Class, id, and attribute selectors
//! - Box model properties (margin, padding, border)
//! - Units beyond `px` and `%` (rejected, prior value kept)
//! - Incremental or partial relayout

/// Style resolution: inheritance, matched rules, inline overrides.
pub mod cascade;
/// Font descriptors, the measurement trait, and the metrics cache.
pub mod fonts;
/// Box tree construction and the two-pass layout algorithm.
pub mod layout;
/// Paint commands and box-tree flattening.
pub mod paint;
/// Cursor-driven sheet and declaration parsing.
pub mod parser;
/// Selector matching and cascade priority.
pub mod selector;

pub use cascade::{INHERITED_PROPERTIES, style};
pub use fonts::{
    ApproximateFontMetrics, DEFAULT_FONT_SIZE_PX, FontCache, FontDescriptor, FontMetrics,
    FontSlant, FontWeight,
};
pub use layout::{
    BLOCK_ELEMENTS, BoxId, BoxKind, H_STEP, INPUT_WIDTH_PX, LINE_SPACING, LayoutBox, LayoutMode,
    LayoutTree, V_STEP, layout_mode,
};
pub use paint::{DisplayList, PaintCommand, Rect, paint};
pub use parser::{ParseError, Rule, SheetParser};
pub use selector::{Selector, cascade_priority};
