//! Font descriptors, the measurement seam, and the metrics cache.
//!
//! Layout never rasterizes: it only needs advance widths and vertical
//! metrics. The [`FontMetrics`] trait is the seam a real font backend
//! plugs into; [`ApproximateFontMetrics`] is the deterministic fallback
//! used in tests.

use std::collections::HashMap;

use serde::Serialize;
use wallaby_dom::StyleMap;

/// Default root font size in pixels.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// CSS pixel to font point conversion factor.
const PX_TO_PT: f32 = 0.75;

/// Font weight, as resolved from `font-weight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontWeight {
    /// Regular text.
    Normal,
    /// `font-weight: bold`.
    Bold,
}

/// Font slant, as resolved from `font-style`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontSlant {
    /// Upright text (`font-style: normal`).
    Roman,
    /// `font-style: italic`.
    Italic,
}

/// Everything layout needs to pick and measure a font.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontDescriptor {
    /// Size in points (resolved pixel size scaled by 0.75).
    pub size: f32,
    /// Resolved weight.
    pub weight: FontWeight,
    /// Resolved slant.
    pub slant: FontSlant,
}

impl FontDescriptor {
    /// Derive a descriptor from a node's resolved style map.
    ///
    /// `font-size` is expected to carry a `px` suffix (the cascade
    /// guarantees this for any value it accepted); an unreadable value
    /// falls back to the 16px default. A zero or negative resolved size is
    /// propagated as-is: its layout behavior is undefined, not clamped.
    #[must_use]
    pub fn from_style(style: &StyleMap) -> Self {
        let px = style
            .get("font-size")
            .and_then(|v| v.strip_suffix("px"))
            .and_then(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(DEFAULT_FONT_SIZE_PX);
        let weight = match style.get("font-weight").map(String::as_str) {
            Some("bold") => FontWeight::Bold,
            _ => FontWeight::Normal,
        };
        let slant = match style.get("font-style").map(String::as_str) {
            Some("italic") => FontSlant::Italic,
            _ => FontSlant::Roman,
        };
        Self {
            size: px * PX_TO_PT,
            weight,
            slant,
        }
    }

    fn key(&self) -> FontKey {
        (self.size.to_bits(), self.weight, self.slant)
    }
}

impl Default for FontDescriptor {
    /// The descriptor an empty style map resolves to (16px roman).
    fn default() -> Self {
        Self::from_style(&StyleMap::new())
    }
}

/// Cache key: size bit-pattern plus variant. f32 sizes come from a small
/// set of computed values, so bit-equality is the right granularity.
type FontKey = (u32, FontWeight, FontSlant);

/// Measurement interface a font backend implements.
///
/// All quantities are in the same pixel space layout positions use.
pub trait FontMetrics {
    /// Advance width of `text` at the descriptor's size and variant.
    fn text_width(&self, text: &str, font: &FontDescriptor) -> f32;

    /// Height above the baseline.
    fn ascent(&self, font: &FontDescriptor) -> f32;

    /// Depth below the baseline (positive).
    fn descent(&self, font: &FontDescriptor) -> f32;
}

/// Approximate font metrics using fixed ratios.
///
/// The average advance width of Latin glyphs in a proportional font is
/// roughly 0.6x the font size; ascent and descent split the em at 0.8/0.2.
/// Used as a fallback when no font is available, and in tests, where its
/// determinism makes layout assertions exact.
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(&self, text: &str, font: &FontDescriptor) -> f32 {
        0.6 * font.size * text.chars().count() as f32
    }

    fn ascent(&self, font: &FontDescriptor) -> f32 {
        0.8 * font.size
    }

    fn descent(&self, font: &FontDescriptor) -> f32 {
        0.2 * font.size
    }
}

/// Cached per-font vertical metrics and space width.
#[derive(Clone, Copy)]
struct CachedFont {
    ascent: f32,
    descent: f32,
    space_width: f32,
}

/// Memoizing wrapper around a [`FontMetrics`] backend.
///
/// Keyed by (size, weight, slant). The cache holds no tree references and
/// needs no invalidation, only growth, so one cache may serve every layout
/// run in the process. This is the explicit-handle form of the usual
/// global font table: callers own it and thread it through layout.
pub struct FontCache<'a> {
    metrics: &'a dyn FontMetrics,
    fonts: HashMap<FontKey, CachedFont>,
}

impl<'a> FontCache<'a> {
    /// Create an empty cache over a measurement backend.
    #[must_use]
    pub fn new(metrics: &'a dyn FontMetrics) -> Self {
        Self {
            metrics,
            fonts: HashMap::new(),
        }
    }

    fn cached(&mut self, font: &FontDescriptor) -> CachedFont {
        let key = font.key();
        if let Some(&hit) = self.fonts.get(&key) {
            return hit;
        }
        let entry = CachedFont {
            ascent: self.metrics.ascent(font),
            descent: self.metrics.descent(font),
            space_width: self.metrics.text_width(" ", font),
        };
        let _ = self.fonts.insert(key, entry);
        entry
    }

    /// Measure a word's advance width.
    #[must_use]
    pub fn measure(&mut self, font: &FontDescriptor, text: &str) -> f32 {
        self.metrics.text_width(text, font)
    }

    /// Cached width of a single space, used for inter-word gaps.
    #[must_use]
    pub fn space_width(&mut self, font: &FontDescriptor) -> f32 {
        self.cached(font).space_width
    }

    /// Cached ascent.
    #[must_use]
    pub fn ascent(&mut self, font: &FontDescriptor) -> f32 {
        self.cached(font).ascent
    }

    /// Cached descent.
    #[must_use]
    pub fn descent(&mut self, font: &FontDescriptor) -> f32 {
        self.cached(font).descent
    }

    /// Full line height of the font (ascent plus descent).
    #[must_use]
    pub fn linespace(&mut self, font: &FontDescriptor) -> f32 {
        let hit = self.cached(font);
        hit.ascent + hit.descent
    }

    /// Number of distinct fonts measured so far (growth-only).
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// True if nothing has been measured yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_with(pairs: &[(&str, &str)]) -> StyleMap {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn descriptor_from_style_converts_px_to_points() {
        let style = style_with(&[
            ("font-size", "16px"),
            ("font-weight", "bold"),
            ("font-style", "italic"),
        ]);
        let font = FontDescriptor::from_style(&style);
        assert_eq!(font.size, 12.0);
        assert_eq!(font.weight, FontWeight::Bold);
        assert_eq!(font.slant, FontSlant::Italic);
    }

    #[test]
    fn descriptor_defaults_when_style_is_unreadable() {
        let font = FontDescriptor::from_style(&style_with(&[("font-size", "weird")]));
        assert_eq!(font.size, DEFAULT_FONT_SIZE_PX * 0.75);
        assert_eq!(font.weight, FontWeight::Normal);
        assert_eq!(font.slant, FontSlant::Roman);
    }

    #[test]
    fn degenerate_size_is_not_clamped() {
        let font = FontDescriptor::from_style(&style_with(&[("font-size", "0px")]));
        assert_eq!(font.size, 0.0);
    }

    #[test]
    fn cache_grows_per_distinct_font() {
        let metrics = ApproximateFontMetrics;
        let mut cache = FontCache::new(&metrics);
        let a = FontDescriptor {
            size: 12.0,
            weight: FontWeight::Normal,
            slant: FontSlant::Roman,
        };
        let b = FontDescriptor {
            size: 24.0,
            weight: FontWeight::Normal,
            slant: FontSlant::Roman,
        };
        assert!(cache.is_empty());
        assert_eq!(cache.ascent(&a), 0.8 * 12.0);
        assert_eq!(cache.ascent(&a), 0.8 * 12.0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.linespace(&b), 24.0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.space_width(&a), 0.6 * 12.0);
    }
}
