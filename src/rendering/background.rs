//! Background layer painting: solid fills, linear gradients and cover-fitted
//! images, always full-bleed to the canvas bounds.

use base64::Engine as Base64Engine;
use image::{imageops, DynamicImage, Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::theme::{Background, Color, ImageSource};

/// Paint the background variant onto the canvas.
pub fn paint(canvas: &mut RgbaImage, background: &Background) -> Result<()> {
    match background {
        Background::Solid { color } => fill_solid(canvas, *color),
        Background::Gradient {
            colors,
            angle_degrees,
        } => fill_linear_gradient(canvas, colors[0], colors[1], *angle_degrees),
        Background::Image { source } => {
            let decoded = load_source(source)?;
            draw_cover(canvas, &decoded);
        }
    }
    Ok(())
}

fn fill_solid(canvas: &mut RgbaImage, color: Color) {
    let px = Rgba([color.r, color.g, color.b, color.a]);
    for pixel in canvas.pixels_mut() {
        *pixel = px;
    }
}

/// Linear gradient with CSS angle semantics: 0 degrees points up, the angle
/// grows clockwise, and the gradient line runs through the canvas center
/// with the projection of the farthest corners as its endpoints.
fn fill_linear_gradient(canvas: &mut RgbaImage, from: Color, to: Color, angle_degrees: f32) {
    let (width, height) = (canvas.width() as f32, canvas.height() as f32);
    let rad = angle_degrees.to_radians();
    // direction of increasing gradient, in y-down screen coordinates
    let (dir_x, dir_y) = (rad.sin(), -rad.cos());
    let line_len = (width * dir_x).abs() + (height * dir_y).abs();
    let (cx, cy) = (width / 2.0, height / 2.0);

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let px = x as f32 + 0.5 - cx;
        let py = y as f32 + 0.5 - cy;
        let t = if line_len > 0.0 {
            ((px * dir_x + py * dir_y) / line_len + 0.5).clamp(0.0, 1.0)
        } else {
            0.5
        };
        *pixel = Rgba([
            lerp_channel(from.r, to.r, t),
            lerp_channel(from.g, to.g, t),
            lerp_channel(from.b, to.b, t),
            lerp_channel(from.a, to.a, t),
        ]);
    }
}

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

/// Scale the image so it covers the canvas, center-crop the overflow, and
/// write it full-bleed.
fn draw_cover(canvas: &mut RgbaImage, source: &RgbaImage) {
    let (cw, ch) = (canvas.width(), canvas.height());
    let (iw, ih) = (source.width(), source.height());
    if iw == 0 || ih == 0 {
        return;
    }

    let scale = (cw as f32 / iw as f32).max(ch as f32 / ih as f32);
    let scaled_w = (iw as f32 * scale).round().max(1.0) as u32;
    let scaled_h = (ih as f32 * scale).round().max(1.0) as u32;
    let scaled = imageops::resize(source, scaled_w, scaled_h, imageops::FilterType::CatmullRom);

    let off_x = (scaled_w.saturating_sub(cw)) / 2;
    let off_y = (scaled_h.saturating_sub(ch)) / 2;
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let sx = (x + off_x).min(scaled_w - 1);
        let sy = (y + off_y).min(scaled_h - 1);
        *pixel = *scaled.get_pixel(sx, sy);
    }
}

/// Resolve an image source to decoded pixels. Any failure, from a missing
/// file to a malformed payload, is an asset-load error; the compositor never
/// substitutes a blank background on its own.
fn load_source(source: &ImageSource) -> Result<RgbaImage> {
    let bytes = match source {
        ImageSource::Path(path) => std::fs::read(path)
            .map_err(|e| Error::AssetLoad(format!("{}: {}", path.display(), e)))?,
        ImageSource::DataUrl(url) => decode_data_url(url)?,
    };
    let decoded: DynamicImage = image::load_from_memory(&bytes)
        .map_err(|e| Error::AssetLoad(format!("undecodable image data: {}", e)))?;
    Ok(decoded.to_rgba8())
}

fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::AssetLoad("not a data URL".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::AssetLoad("data URL missing payload".into()))?;
    if !meta.ends_with(";base64") {
        return Err(Error::AssetLoad(format!(
            "unsupported data URL encoding '{}'",
            meta
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::AssetLoad(format!("invalid base64 payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::ImageEncoder;

    fn png_data_url(color: Color) -> String {
        let mut img = RgbaImage::new(4, 4);
        fill_solid(&mut img, color);
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), 4, 4, image::ExtendedColorType::Rgba8)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        )
    }

    #[test]
    fn solid_fill_covers_every_pixel() {
        let mut canvas = RgbaImage::new(8, 8);
        paint(
            &mut canvas,
            &Background::Solid {
                color: Color::rgb(10, 20, 30),
            },
        )
        .unwrap();
        assert!(canvas.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn gradient_90_degrees_runs_left_to_right() {
        let mut canvas = RgbaImage::new(64, 16);
        paint(
            &mut canvas,
            &Background::Gradient {
                colors: [Color::BLACK, Color::WHITE],
                angle_degrees: 90.0,
            },
        )
        .unwrap();
        let left = canvas.get_pixel(0, 8).0[0];
        let mid = canvas.get_pixel(32, 8).0[0];
        let right = canvas.get_pixel(63, 8).0[0];
        assert!(left < 8, "left edge should be near black, got {}", left);
        assert!(right > 247, "right edge should be near white, got {}", right);
        assert!(
            (120..=135).contains(&mid),
            "midpoint should be halfway, got {}",
            mid
        );
    }

    #[test]
    fn gradient_180_degrees_runs_top_to_bottom() {
        let mut canvas = RgbaImage::new(16, 64);
        paint(
            &mut canvas,
            &Background::Gradient {
                colors: [Color::BLACK, Color::WHITE],
                angle_degrees: 180.0,
            },
        )
        .unwrap();
        assert!(canvas.get_pixel(8, 0).0[0] < 8);
        assert!(canvas.get_pixel(8, 63).0[0] > 247);
    }

    #[test]
    fn image_background_from_data_url() {
        let mut canvas = RgbaImage::new(10, 10);
        let source: ImageSource = png_data_url(Color::rgb(200, 100, 50)).into();
        paint(&mut canvas, &Background::Image { source }).unwrap();
        assert_eq!(canvas.get_pixel(5, 5).0, [200, 100, 50, 255]);
    }

    #[test]
    fn missing_image_file_is_an_asset_error() {
        let mut canvas = RgbaImage::new(4, 4);
        let source: ImageSource = "no/such/background.png".to_string().into();
        let err = paint(&mut canvas, &Background::Image { source }).unwrap_err();
        assert!(matches!(err, Error::AssetLoad(_)));
    }

    #[test]
    fn malformed_data_url_is_an_asset_error() {
        let mut canvas = RgbaImage::new(4, 4);
        for url in [
            "data:image/png;base64,!!!not-base64!!!",
            "data:image/png,plain-payload",
            "data:image/png;base64",
        ] {
            let source: ImageSource = url.to_string().into();
            let err = paint(&mut canvas, &Background::Image { source }).unwrap_err();
            assert!(matches!(err, Error::AssetLoad(_)), "url {} should fail", url);
        }
    }
}
