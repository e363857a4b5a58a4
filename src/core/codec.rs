//! Raster codec: turns encoded image bytes into [`RasterBuffer`]s and back.
//!
//! The transforms never look at file formats; everything passes through here.

use crate::core::error::BleedResult;
use crate::core::types::RasterBuffer;
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

/// Formats the codec writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
    Tiff,
    Bmp,
}

impl OutputFormat {
    /// Determine output format from a file path extension, falling back to PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => OutputFormat::Jpeg,
            "webp" => OutputFormat::WebP,
            "tiff" | "tif" => OutputFormat::Tiff,
            "bmp" => OutputFormat::Bmp,
            _ => OutputFormat::Png,
        }
    }

    /// Convert to image crate's ImageFormat.
    pub fn to_image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }

    /// Whether the format can store an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }
}

/// Decode an encoded image (any format the image crate recognises) into RGBA8.
pub fn decode(bytes: &[u8]) -> BleedResult<RasterBuffer> {
    let image = image::load_from_memory(bytes)?;
    Ok(RasterBuffer::from_rgba_image(image.to_rgba8()))
}

/// Encode a buffer into `format`.
///
/// Alpha is dropped for formats that cannot store it.
pub fn encode(buffer: &RasterBuffer, format: OutputFormat) -> BleedResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    if format.supports_alpha() {
        buffer
            .as_rgba_image()
            .write_to(&mut bytes, format.to_image_format())?;
    } else {
        let rgb = image::DynamicImage::ImageRgba8(buffer.as_rgba_image().clone()).to_rgb8();
        rgb.write_to(&mut bytes, format.to_image_format())?;
    }
    Ok(bytes.into_inner())
}

/// Read and decode an image file.
pub fn load(path: impl AsRef<Path>) -> BleedResult<RasterBuffer> {
    let path = path.as_ref();
    log::debug!("Loading {}", path.display());
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode and write an image file; the format follows the extension.
pub fn save(buffer: &RasterBuffer, path: impl AsRef<Path>) -> BleedResult<()> {
    let path = path.as_ref();
    let bytes = encode(buffer, OutputFormat::from_path(path))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    log::debug!("Saved {}x{} image to {}", buffer.width(), buffer.height(), path.display());
    Ok(())
}
