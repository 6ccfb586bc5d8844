//! Tolerant markup parser for the wallaby rendering pipeline.
//!
//! # Scope
//!
//! This crate implements:
//! - **Markup Parser** - a single-pass, never-failing parser that builds a
//!   node tree from possibly malformed input
//!   - Implicit `html`/`head`/`body` insertion
//!   - Self-closing tag handling and stray-close tolerance
//!   - Attribute parsing with quote stripping
//!   - `&lt;`/`&gt;` entity decoding in text content
//! - **View-source transform** - escapes markup so a document renders as
//!   literal text
//! - **Serialization** - re-serializes a tree to markup, plus a pretty
//!   printer for debugging
//!
//! # Not Yet Implemented
//!
//! - Named character references beyond `&lt;`/`&gt;`
//! - Raw-text elements (`<script>`/`<style>` content containing `<`)
//! - Quoted attribute values containing whitespace

pub mod parser;
pub mod serialize;

pub use parser::{MarkupParser, transform, unescape_entities};
pub use serialize::{format_tree, print_tree, serialize};
