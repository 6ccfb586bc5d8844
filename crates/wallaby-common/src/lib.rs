//! Common utilities for the wallaby rendering pipeline.
//!
//! This crate provides shared infrastructure used by all pipeline stages:
//! - **Warning System** - colored terminal output for recovered-from input

pub mod warning;

pub use warning::{clear_warnings, warn_once};
