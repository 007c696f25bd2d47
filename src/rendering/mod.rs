//! Compositor: renders a theme snapshot plus live text into a pixel buffer.
//!
//! The output is always produced at a fixed 2x supersampling factor over the
//! theme's canvas size, so export sharpness does not depend on any on-screen
//! zoom or display density. Rendering is a pure function of the
//! `(theme, text)` snapshot: the same inputs produce byte-identical buffers.

pub mod background;
pub mod text;

use cosmic_text::{FontSystem, SwashCache};
use image::RgbaImage;

use crate::error::{Error, Result};
use crate::theme::Theme;

/// Fixed supersampling factor applied to every rendered card
pub const SUPERSAMPLE: u32 = 2;

/// A flattened raster of one composition, at the supersampled resolution.
///
/// Once produced the buffer is opaque to further edits; re-rendering from
/// the theme is the only way to change it.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pixels: RgbaImage,
}

impl RenderedCard {
    pub(crate) fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Width in physical pixels (canvas width times [`SUPERSAMPLE`])
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in physical pixels (canvas height times [`SUPERSAMPLE`])
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// Renders [`Theme`] snapshots into [`RenderedCard`] buffers.
///
/// The renderer owns the font database and glyph cache, which are reused
/// across renders; neither influences the output, so overlapping callers
/// observe no cross-talk beyond timing.
pub struct CardRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl CardRenderer {
    /// Create a renderer backed by the system font database.
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    /// Whether any font faces are available. Text layout on a machine with
    /// an empty font database silently produces no glyphs; callers (and the
    /// test suite) can check this up front.
    pub fn has_fonts(&self) -> bool {
        self.font_system.db().faces().next().is_some()
    }

    /// Compose the card described by `theme` around the given text.
    ///
    /// Layer order: background first (full bleed), then the optional blurred
    /// shadow copy of the glyphs, then the sharp glyphs. The text block is
    /// anchored at its own center on the theme's normalized position.
    ///
    /// A missing or undecodable background image fails with
    /// [`crate::Error::AssetLoad`] rather than rendering a blank canvas; the
    /// caller decides whether to retry with a different background.
    pub fn render(&mut self, theme: &Theme, quote: &str) -> Result<RenderedCard> {
        theme.validate()?;

        let width = theme
            .canvas_width_px
            .checked_mul(SUPERSAMPLE)
            .ok_or_else(|| Error::Render("canvas width overflows the target surface".into()))?;
        let height = theme
            .canvas_height_px
            .checked_mul(SUPERSAMPLE)
            .ok_or_else(|| Error::Render("canvas height overflows the target surface".into()))?;
        let mut canvas = RgbaImage::new(width, height);

        background::paint(&mut canvas, &theme.background)?;
        text::draw_block(
            &mut canvas,
            theme,
            quote,
            &mut self.font_system,
            &mut self.swash_cache,
        );

        Ok(RenderedCard::new(canvas))
    }
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new()
    }
}
