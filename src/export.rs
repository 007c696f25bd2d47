//! Encoding and file delivery for rendered cards.
//!
//! Encoding and delivery are separate steps so callers can reuse the encoded
//! bytes (the clipboard path does). File delivery goes through a temporary
//! sibling that is renamed into place on success and removed on every
//! failure path, so a failed export never leaves a partial artifact behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rendering::RenderedCard;

/// Raster output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless; the quality setting is ignored
    Png,
    /// Lossy; quality 1-100 maps onto the encoder
    Jpeg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            other => Err(Error::Validation(format!("unknown format '{}'", other))),
        }
    }
}

/// Parameters for one file export.
///
/// The filename is used verbatim; sanitizing user input for filesystem
/// safety is the calling I/O layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub quality_percent: u8,
    pub filename: String,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality_percent: 92,
            filename: "quote-image".to_string(),
        }
    }
}

impl ExportRequest {
    /// The delivered name, `{filename}.{format}`
    pub fn output_name(&self) -> String {
        format!("{}.{}", self.filename, self.format.extension())
    }
}

/// Encode a rendered card into the requested format.
pub fn encode(card: &RenderedCard, format: ExportFormat, quality_percent: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => PngEncoder::new(&mut bytes)
            .write_image(
                card.pixels().as_raw(),
                card.width(),
                card.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| Error::Export(format!("png encoding failed: {}", e)))?,
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel; compositions are opaque by the time
            // they reach the exporter
            let rgb = DynamicImage::ImageRgba8(card.pixels().clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality_percent.clamp(1, 100))
                .write_image(
                    rgb.as_raw(),
                    card.width(),
                    card.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| Error::Export(format!("jpeg encoding failed: {}", e)))?;
        }
    }
    Ok(bytes)
}

/// Encode and deliver the card as `{filename}.{format}` inside `dir`.
/// Returns the path of the written file.
pub fn export_to_file(card: &RenderedCard, request: &ExportRequest, dir: &Path) -> Result<PathBuf> {
    let bytes = encode(card, request.format, request.quality_percent)?;

    let final_path = dir.join(request.output_name());
    let tmp_path = dir.join(format!("{}.tmp", request.output_name()));

    fs::write(&tmp_path, &bytes)
        .map_err(|e| Error::Export(format!("writing {}: {}", tmp_path.display(), e)))?;

    if let Err(e) = fs::rename(&tmp_path, &final_path) {
        // the temporary must not outlive a failed delivery
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::Export(format!(
            "delivering {}: {}",
            final_path.display(),
            e
        )));
    }

    log::debug!(
        "exported {}x{} {} to {}",
        card.width(),
        card.height(),
        request.format.extension(),
        final_path.display()
    );
    Ok(final_path)
}
