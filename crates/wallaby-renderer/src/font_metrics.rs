//! Font metrics backed by fontdue for accurate text measurement during
//! layout.
//!
//! This implementation queries fontdue for exact per-character advance
//! widths. It uses `Font::metrics()` (not `Font::rasterize()`) to avoid
//! the cost of bitmap generation when only measurements are needed.

use fontdue::{Font, FontSettings};
use thiserror::Error;
use wallaby_css::{FontDescriptor, FontMetrics, FontSlant, FontWeight};

/// Failed to construct a font backend.
#[derive(Debug, Error)]
pub enum FontError {
    /// fontdue rejected the font data.
    #[error("failed to load font: {0}")]
    Load(String),
}

/// Font metrics implementation backed by fontdue's per-glyph metrics.
///
/// Holds one face per variant the pipeline distinguishes; variants without
/// a loaded face fall back to the regular one, so a single font file is
/// enough to get real measurements.
pub struct FontdueFontMetrics {
    regular: Font,
    bold: Option<Font>,
    italic: Option<Font>,
    bold_italic: Option<Font>,
}

impl FontdueFontMetrics {
    /// Create a metrics backend from raw font data for the regular face.
    ///
    /// # Errors
    /// Returns [`FontError::Load`] when fontdue cannot parse the data.
    pub fn from_bytes(regular: &[u8]) -> Result<Self, FontError> {
        Ok(Self {
            regular: load(regular)?,
            bold: None,
            italic: None,
            bold_italic: None,
        })
    }

    /// Add a bold face.
    ///
    /// # Errors
    /// Returns [`FontError::Load`] when fontdue cannot parse the data.
    pub fn with_bold(mut self, data: &[u8]) -> Result<Self, FontError> {
        self.bold = Some(load(data)?);
        Ok(self)
    }

    /// Add an italic face.
    ///
    /// # Errors
    /// Returns [`FontError::Load`] when fontdue cannot parse the data.
    pub fn with_italic(mut self, data: &[u8]) -> Result<Self, FontError> {
        self.italic = Some(load(data)?);
        Ok(self)
    }

    /// Add a bold-italic face.
    ///
    /// # Errors
    /// Returns [`FontError::Load`] when fontdue cannot parse the data.
    pub fn with_bold_italic(mut self, data: &[u8]) -> Result<Self, FontError> {
        self.bold_italic = Some(load(data)?);
        Ok(self)
    }

    /// Pick the face for a descriptor, falling back towards regular.
    fn face(&self, font: &FontDescriptor) -> &Font {
        match (font.weight, font.slant) {
            (FontWeight::Bold, FontSlant::Italic) => self
                .bold_italic
                .as_ref()
                .or(self.bold.as_ref())
                .unwrap_or(&self.regular),
            (FontWeight::Bold, FontSlant::Roman) => self.bold.as_ref().unwrap_or(&self.regular),
            (FontWeight::Normal, FontSlant::Italic) => {
                self.italic.as_ref().unwrap_or(&self.regular)
            }
            (FontWeight::Normal, FontSlant::Roman) => &self.regular,
        }
    }
}

fn load(data: &[u8]) -> Result<Font, FontError> {
    Font::from_bytes(data, FontSettings::default()).map_err(|e| FontError::Load(e.to_string()))
}

impl FontMetrics for FontdueFontMetrics {
    fn text_width(&self, text: &str, font: &FontDescriptor) -> f32 {
        // Sum per-character advance widths, matching how a renderer would
        // advance its cursor while drawing.
        let face = self.face(font);
        text.chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| face.metrics(ch, font.size).advance_width)
            .sum()
    }

    fn ascent(&self, font: &FontDescriptor) -> f32 {
        self.face(font)
            .horizontal_line_metrics(font.size)
            .map_or(0.8 * font.size, |m| m.ascent)
    }

    fn descent(&self, font: &FontDescriptor) -> f32 {
        // fontdue reports descent as a negative offset from the baseline.
        self.face(font)
            .horizontal_line_metrics(font.size)
            .map_or(0.2 * font.size, |m| -m.descent)
    }
}
