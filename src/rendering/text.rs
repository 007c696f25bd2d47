//! Text block layout and glyph compositing.
//!
//! Shaping, word wrap and rasterization go through cosmic-text; this module
//! adds the card-specific layout on top: letter spacing, alignment inside
//! the block, padding as an inset of the block's own edges, center anchoring
//! on the normalized position, and the optional blurred shadow layer drawn
//! beneath the sharp glyphs.

use cosmic_text::{
    Attrs, Buffer, CacheKey, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent, Wrap,
};
use image::{imageops, Rgba, RgbaImage};

use super::SUPERSAMPLE;
use crate::theme::{Alignment, Color, Theme};

/// Fraction of the canvas width the text content may occupy before wrapping
const MAX_WIDTH_FRACTION: f32 = 0.9;

/// A rasterizable glyph in canvas coordinates. `y` is the line baseline.
struct PlacedGlyph {
    cache_key: CacheKey,
    x: i32,
    y: i32,
}

/// Lay out and composite the quote onto the canvas.
///
/// All theme lengths are multiplied by the supersampling factor so the
/// layout is computed directly in output pixels. An empty quote draws
/// nothing. A machine without any usable font face produces no glyphs,
/// which also draws nothing.
pub(crate) fn draw_block(
    canvas: &mut RgbaImage,
    theme: &Theme,
    quote: &str,
    font_system: &mut FontSystem,
    swash_cache: &mut SwashCache,
) {
    if quote.trim().is_empty() {
        return;
    }

    let scale = SUPERSAMPLE as f32;
    let font_size = theme.font_size_pt * scale;
    let line_height = font_size * theme.effects.line_height_multiplier;
    let letter_spacing = theme.effects.letter_spacing_px * scale;
    let padding = theme.padding_px * scale;
    let wrap_width = (canvas.width() as f32 * MAX_WIDTH_FRACTION).max(font_size);

    let mut buffer = Buffer::new(font_system, Metrics::new(font_size, line_height));
    buffer.set_size(font_system, Some(wrap_width), None);
    buffer.set_wrap(font_system, Wrap::Word);
    buffer.set_text(
        font_system,
        quote,
        Attrs::new().family(Family::Name(theme.font_family.as_str())),
        Shaping::Advanced,
    );
    buffer.shape_until_scroll(font_system, false);

    // Measured line widths, widened by the tracking between glyphs
    let mut line_widths = Vec::new();
    for run in buffer.layout_runs() {
        let extra = letter_spacing * run.glyphs.len().saturating_sub(1) as f32;
        line_widths.push(run.line_w + extra);
    }
    if line_widths.is_empty() {
        return;
    }
    let content_w = line_widths.iter().fold(0.0f32, |acc, w| acc.max(*w));
    let content_h = line_widths.len() as f32 * line_height;

    // Block anchored at its own center on the normalized position; padding
    // insets the content from the block edges, not from the canvas.
    let block_w = content_w + 2.0 * padding;
    let block_h = content_h + 2.0 * padding;
    let anchor_x = theme.position.x() / 100.0 * canvas.width() as f32;
    let anchor_y = theme.position.y() / 100.0 * canvas.height() as f32;
    let content_x = anchor_x - block_w / 2.0 + padding;
    let content_y = anchor_y - block_h / 2.0 + padding;

    let align = match theme.alignment {
        Alignment::Left => 0.0,
        Alignment::Center => 0.5,
        Alignment::Right => 1.0,
    };

    let mut placed = Vec::new();
    for (line, run) in buffer.layout_runs().enumerate() {
        let line_x = content_x + align * (content_w - line_widths[line]);
        let baseline = content_y + run.line_y;
        for (i, glyph) in run.glyphs.iter().enumerate() {
            let physical = glyph.physical((line_x + i as f32 * letter_spacing, baseline), 1.0);
            placed.push(PlacedGlyph {
                cache_key: physical.cache_key,
                x: physical.x,
                y: physical.y,
            });
        }
    }

    if theme.effects.shadow_enabled {
        let sigma = theme.effects.shadow_blur_px * scale / 2.0;
        draw_shadow(
            canvas,
            &placed,
            theme.effects.shadow_color,
            sigma,
            font_system,
            swash_cache,
        );
    }

    for glyph in &placed {
        blit_glyph(canvas, glyph, theme.text_color, font_system, swash_cache);
    }
}

/// Rasterize the glyph layer into an offscreen buffer tinted with the shadow
/// color, gaussian-blur it, and composite it beneath the sharp pass.
fn draw_shadow(
    canvas: &mut RgbaImage,
    placed: &[PlacedGlyph],
    color: Color,
    sigma: f32,
    font_system: &mut FontSystem,
    swash_cache: &mut SwashCache,
) {
    // Tight bounds of the glyph layer in canvas coordinates
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for glyph in placed {
        if let Some(img) = swash_cache.get_image(font_system, glyph.cache_key) {
            let x0 = glyph.x + img.placement.left;
            let y0 = glyph.y - img.placement.top;
            min_x = min_x.min(x0);
            min_y = min_y.min(y0);
            max_x = max_x.max(x0 + img.placement.width as i32);
            max_y = max_y.max(y0 + img.placement.height as i32);
        }
    }
    if min_x >= max_x || min_y >= max_y {
        return;
    }

    // Room for the blur to spread
    let margin = (sigma * 3.0).ceil() as i32 + 1;
    let layer_w = (max_x - min_x + 2 * margin) as u32;
    let layer_h = (max_y - min_y + 2 * margin) as u32;
    let mut layer = RgbaImage::from_pixel(layer_w, layer_h, Rgba([color.r, color.g, color.b, 0]));

    for glyph in placed {
        if let Some(img) = swash_cache.get_image(font_system, glyph.cache_key) {
            let x0 = glyph.x + img.placement.left - min_x + margin;
            let y0 = glyph.y - img.placement.top - min_y + margin;
            stamp_coverage(&mut layer, img, x0, y0, color.a);
        }
    }

    let blurred = if sigma > 0.05 {
        imageops::blur(&layer, sigma)
    } else {
        layer
    };

    let dest_x = min_x - margin;
    let dest_y = min_y - margin;
    for (x, y, px) in blurred.enumerate_pixels() {
        let cx = dest_x + x as i32;
        let cy = dest_y + y as i32;
        if cx < 0 || cy < 0 || cx >= canvas.width() as i32 || cy >= canvas.height() as i32 {
            continue;
        }
        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        blend_pixel(dst, px.0[0], px.0[1], px.0[2], px.0[3]);
    }
}

/// Write a glyph's coverage into the alpha channel of the shadow layer,
/// scaled by the shadow color's own alpha.
fn stamp_coverage(layer: &mut RgbaImage, img: &cosmic_text::SwashImage, x0: i32, y0: i32, tint_a: u8) {
    let width = img.placement.width as i32;
    if width == 0 {
        return;
    }
    for (i, coverage) in coverage_iter(img).enumerate() {
        let x = x0 + (i as i32 % width);
        let y = y0 + (i as i32 / width);
        if x < 0 || y < 0 || x >= layer.width() as i32 || y >= layer.height() as i32 {
            continue;
        }
        let a = (coverage as u32 * tint_a as u32 / 255) as u8;
        if a == 0 {
            continue;
        }
        let px = layer.get_pixel_mut(x as u32, y as u32);
        let old = px.0[3] as u32;
        px.0[3] = (a as u32 + old * (255 - a as u32) / 255) as u8;
    }
}

/// Composite one sharp glyph over the canvas in the text color. Color
/// (emoji) glyphs keep their own colors.
fn blit_glyph(
    canvas: &mut RgbaImage,
    glyph: &PlacedGlyph,
    color: Color,
    font_system: &mut FontSystem,
    swash_cache: &mut SwashCache,
) {
    let Some(img) = swash_cache.get_image(font_system, glyph.cache_key) else {
        return;
    };
    let width = img.placement.width as i32;
    if width == 0 {
        return;
    }
    let x0 = glyph.x + img.placement.left;
    let y0 = glyph.y - img.placement.top;

    match img.content {
        SwashContent::Mask | SwashContent::SubpixelMask => {
            for (i, coverage) in coverage_iter(img).enumerate() {
                let x = x0 + (i as i32 % width);
                let y = y0 + (i as i32 / width);
                if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
                    continue;
                }
                let a = (coverage as u32 * color.a as u32 / 255) as u8;
                if a == 0 {
                    continue;
                }
                let dst = canvas.get_pixel_mut(x as u32, y as u32);
                blend_pixel(dst, color.r, color.g, color.b, a);
            }
        }
        SwashContent::Color => {
            for (i, rgba) in img.data.chunks_exact(4).enumerate() {
                let x = x0 + (i as i32 % width);
                let y = y0 + (i as i32 / width);
                if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
                    continue;
                }
                if rgba[3] == 0 {
                    continue;
                }
                let dst = canvas.get_pixel_mut(x as u32, y as u32);
                blend_pixel(dst, rgba[0], rgba[1], rgba[2], rgba[3]);
            }
        }
    }
}

/// Per-pixel coverage of a swash image: subpixel masks collapse to their
/// strongest channel, color glyphs contribute their alpha.
fn coverage_iter<'a>(img: &'a cosmic_text::SwashImage) -> Box<dyn Iterator<Item = u8> + 'a> {
    match img.content {
        SwashContent::Mask => Box::new(img.data.iter().copied()),
        SwashContent::SubpixelMask => Box::new(
            img.data
                .chunks_exact(4)
                .map(|px| px[0].max(px[1]).max(px[2])),
        ),
        SwashContent::Color => Box::new(img.data.chunks_exact(4).map(|px| px[3])),
    }
}

/// Integer source-over blend with straight alpha
fn blend_pixel(dst: &mut Rgba<u8>, r: u8, g: u8, b: u8, a: u8) {
    if a == 255 {
        *dst = Rgba([r, g, b, 255]);
        return;
    }
    let a32 = a as u32;
    let inv = 255 - a32;
    let blend = |src: u8, old: u8| ((src as u32 * a32 + old as u32 * inv + 127) / 255) as u8;
    let out_a = (a32 + dst.0[3] as u32 * inv / 255) as u8;
    *dst = Rgba([
        blend(r, dst.0[0]),
        blend(g, dst.0[1]),
        blend(b, dst.0[2]),
        out_a,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::CardRenderer;
    use crate::theme::{Background, Position, Theme};

    fn test_theme() -> Theme {
        Theme {
            background: Background::Solid {
                color: Color::BLACK,
            },
            text_color: Color::WHITE,
            canvas_width_px: 200,
            canvas_height_px: 100,
            font_size_pt: 16.0,
            padding_px: 8.0,
            ..Theme::default()
        }
    }

    fn lit_pixels(card: &crate::rendering::RenderedCard) -> Vec<(u32, u32)> {
        card.pixels()
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 16)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn empty_quote_draws_nothing() {
        let mut renderer = CardRenderer::new();
        let card = renderer.render(&test_theme(), "   ").unwrap();
        assert!(lit_pixels(&card).is_empty());
    }

    #[test]
    fn blend_pixel_is_linear_in_alpha() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend_pixel(&mut dst, 255, 255, 255, 128);
        assert!((dst.0[0] as i32 - 128).abs() <= 1);
        let mut opaque = Rgba([10, 20, 30, 255]);
        blend_pixel(&mut opaque, 1, 2, 3, 255);
        assert_eq!(opaque.0, [1, 2, 3, 255]);
    }

    #[test]
    fn glyphs_follow_the_anchor() {
        let mut renderer = CardRenderer::new();
        if !renderer.has_fonts() {
            eprintln!("no fonts installed; skipping glyph placement test");
            return;
        }

        let centered = renderer.render(&test_theme(), "hi").unwrap();
        let lit = lit_pixels(&centered);
        assert!(!lit.is_empty(), "expected glyph pixels on the canvas");
        let cx: f64 = lit.iter().map(|(x, _)| *x as f64).sum::<f64>() / lit.len() as f64;
        let cy: f64 = lit.iter().map(|(_, y)| *y as f64).sum::<f64>() / lit.len() as f64;
        // centroid lands near the center anchor at (50%, 50%)
        assert!((cx - 200.0).abs() < 30.0, "centroid x {} off center", cx);
        assert!((cy - 100.0).abs() < 30.0, "centroid y {} off center", cy);

        let mut shifted_theme = test_theme();
        shifted_theme.position = Position::new(20.0, 20.0);
        let shifted = renderer.render(&shifted_theme, "hi").unwrap();
        let lit2 = lit_pixels(&shifted);
        assert!(!lit2.is_empty());
        let cx2: f64 = lit2.iter().map(|(x, _)| *x as f64).sum::<f64>() / lit2.len() as f64;
        assert!(cx2 < cx, "anchor at 20% should move glyphs left");
    }

    #[test]
    fn letter_spacing_widens_a_line() {
        let mut renderer = CardRenderer::new();
        if !renderer.has_fonts() {
            eprintln!("no fonts installed; skipping letter spacing test");
            return;
        }

        let plain = renderer.render(&test_theme(), "spread").unwrap();
        let mut spaced_theme = test_theme();
        spaced_theme.effects.letter_spacing_px = 8.0;
        let spaced = renderer.render(&spaced_theme, "spread").unwrap();

        let width = |lit: &[(u32, u32)]| {
            let min = lit.iter().map(|(x, _)| *x).min().unwrap();
            let max = lit.iter().map(|(x, _)| *x).max().unwrap();
            max - min
        };
        let plain_lit = lit_pixels(&plain);
        let spaced_lit = lit_pixels(&spaced);
        assert!(!plain_lit.is_empty() && !spaced_lit.is_empty());
        assert!(
            width(&spaced_lit) > width(&plain_lit) + 40,
            "tracking should spread the line"
        );
    }

    #[test]
    fn shadow_adds_pixels_around_glyphs() {
        let mut renderer = CardRenderer::new();
        if !renderer.has_fonts() {
            eprintln!("no fonts installed; skipping shadow test");
            return;
        }

        let plain = renderer.render(&test_theme(), "shade").unwrap();
        let mut shadow_theme = test_theme();
        shadow_theme.effects.shadow_enabled = true;
        shadow_theme.effects.shadow_color = Color::WHITE;
        shadow_theme.effects.shadow_blur_px = 6.0;
        let shadowed = renderer.render(&shadow_theme, "shade").unwrap();

        let coverage = |card: &crate::rendering::RenderedCard| {
            card.pixels().pixels().filter(|p| p.0[0] > 4).count()
        };
        assert!(
            coverage(&shadowed) > coverage(&plain),
            "blurred shadow should touch more pixels than the sharp text alone"
        );
    }
}
