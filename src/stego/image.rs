//! Conversion between image files and [`PixelBuffer`]s.
//!
//! Any format the `image` crate can decode works as a cover. Output is always
//! lossless (PNG or BMP): a lossy encoder would destroy the embedded bits.

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::codec::{CodecError, PixelBuffer};

/// Errors that can occur while loading or rendering images.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image load error: {0}")]
    Load(String),

    #[error("Image save error: {0}")]
    Save(String),

    #[error("Invalid pixel buffer: {0}")]
    Buffer(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lossless output formats for stego images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Bmp,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            other => Err(format!("unsupported output format '{other}' (use png or bmp)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Decodes image bytes into an RGBA8 pixel buffer.
pub fn load_pixel_buffer(bytes: &[u8]) -> Result<PixelBuffer, ImageError> {
    let image = image::load_from_memory(bytes).map_err(|e| ImageError::Load(e.to_string()))?;
    from_dynamic(image)
}

/// Opens an image file as an RGBA8 pixel buffer.
pub fn open<P: AsRef<Path>>(path: P) -> Result<PixelBuffer, ImageError> {
    let image = image::open(path.as_ref()).map_err(|e| ImageError::Load(e.to_string()))?;
    from_dynamic(image)
}

fn from_dynamic(image: DynamicImage) -> Result<PixelBuffer, ImageError> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("Loaded {}x{} cover", width, height);
    Ok(PixelBuffer::new(width, height, rgba.into_raw())?)
}

/// Encodes a pixel buffer as image bytes.
pub fn render_pixel_buffer(buffer: &PixelBuffer, format: OutputFormat) -> Result<Vec<u8>, ImageError> {
    let rgba = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.as_bytes().to_vec())
        .ok_or_else(|| ImageError::Save("pixel buffer does not match its dimensions".to_string()))?;

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut bytes), format.image_format())
        .map_err(|e| ImageError::Save(e.to_string()))?;

    Ok(bytes)
}

/// Writes a pixel buffer to `path` in `format`.
pub fn save<P: AsRef<Path>>(buffer: &PixelBuffer, path: P, format: OutputFormat) -> Result<(), ImageError> {
    let bytes = render_pixel_buffer(buffer, format)?;
    std::fs::write(path.as_ref(), bytes)?;
    debug!("Wrote {} image to {}", format, path.as_ref().display());
    Ok(())
}
