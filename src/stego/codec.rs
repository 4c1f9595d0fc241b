//! LSB bit codec over an RGBA8 pixel buffer.
//!
//! One bit per pixel, always in the least significant bit of the red channel.
//!
//! Format:
//! - pixels `[0, 32)`: message bit length `L`, 32-bit big-endian, one bit per pixel
//! - pixels `[32, 32 + L)`: message bits, MSB first within each byte
//!
//! Green, blue, alpha and the upper seven red bits are never touched.

use log::{debug, trace};
use thiserror::Error;

/// Number of header pixels carrying the message bit length.
pub const HEADER_BITS: usize = 32;

/// Samples per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Index of the carrier channel within a pixel.
const RED: usize = 0;

/// Errors that can occur while embedding into or extracting from pixels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Message needs {needed} bits but the image only has room for {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Header declares {declared} message bits but only {available} pixels follow it")]
    TruncatedData { declared: usize, available: usize },

    #[error("Invalid pixel buffer: {0}")]
    InvalidPixelBuffer(String),

    #[error("Character {0:?} has no 8-bit code")]
    UnencodableCharacter(char),
}

/// RGBA8 pixels in row-major order, with dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA samples.
    ///
    /// `data` must hold exactly `width * height * 4` samples and at least one pixel.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CodecError> {
        if data.is_empty() || data.len() % CHANNELS != 0 {
            return Err(CodecError::InvalidPixelBuffer(format!(
                "length {} is not a positive multiple of {}",
                data.len(),
                CHANNELS
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS))
            .ok_or_else(|| CodecError::InvalidPixelBuffer("dimensions overflow".to_string()))?;

        if data.len() != expected {
            return Err(CodecError::InvalidPixelBuffer(format!(
                "{}x{} needs {} samples, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer filled with one RGBA colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, CodecError> {
        let pixels = (width as usize) * (height as usize);
        let data = rgba.repeat(pixels);
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Raw RGBA samples.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of message bits that fit after the length header.
    pub fn capacity_bits(&self) -> usize {
        self.pixel_count().saturating_sub(HEADER_BITS)
    }

    /// Number of whole 8-bit characters that fit.
    pub fn max_message_len(&self) -> usize {
        self.capacity_bits() / 8
    }

    fn bit(&self, pixel: usize) -> u8 {
        self.data[pixel * CHANNELS + RED] & 1
    }

    fn set_bit(&mut self, pixel: usize, bit: u8) {
        let sample = &mut self.data[pixel * CHANNELS + RED];
        *sample = (*sample & 0xFE) | (bit & 1);
    }
}

/// Embeds `message` into `buffer`, one bit per pixel.
///
/// Each character is written as its 8-bit code. Fails without touching the
/// buffer if the message does not fit.
pub fn embed<'a>(buffer: &'a mut PixelBuffer, message: &str) -> Result<&'a mut PixelBuffer, CodecError> {
    let bytes = message_bytes(message)?;
    embed_bytes(buffer, &bytes)?;
    Ok(buffer)
}

/// Embeds raw bytes with the same framing as [`embed`].
pub fn embed_bytes(buffer: &mut PixelBuffer, data: &[u8]) -> Result<(), CodecError> {
    let needed = data.len() * 8;
    let capacity = buffer.capacity_bits();

    if buffer.pixel_count() < HEADER_BITS || needed > capacity || needed > u32::MAX as usize {
        return Err(CodecError::CapacityExceeded { needed, capacity });
    }

    let header = (needed as u32).to_be_bytes();
    for i in 0..HEADER_BITS {
        buffer.set_bit(i, bit_at(&header, i));
    }

    for i in 0..needed {
        buffer.set_bit(HEADER_BITS + i, bit_at(data, i));
    }

    debug!(
        "Embedded {} bits into {} pixels ({} bits free)",
        needed,
        buffer.pixel_count(),
        capacity - needed
    );
    Ok(())
}

/// Extracts a message embedded by [`embed`].
///
/// Every recovered byte becomes the character with that code point, so the
/// result is exactly what was embedded for 8-bit input.
pub fn extract(buffer: &PixelBuffer) -> Result<String, CodecError> {
    let bytes = extract_bytes(buffer)?;
    Ok(bytes.into_iter().map(char::from).collect())
}

/// Extracts raw bytes embedded by [`embed_bytes`].
///
/// Trailing bits that do not fill a whole byte are dropped.
pub fn extract_bytes(buffer: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
    let pixels = buffer.pixel_count();
    if pixels < HEADER_BITS {
        return Err(CodecError::TruncatedData {
            declared: HEADER_BITS,
            available: pixels,
        });
    }

    let declared = (0..HEADER_BITS).fold(0u32, |acc, i| (acc << 1) | buffer.bit(i) as u32) as usize;
    trace!("Length header declares {} bits", declared);

    let available = pixels - HEADER_BITS;
    if declared > available {
        return Err(CodecError::TruncatedData {
            declared,
            available,
        });
    }

    let mut data = vec![0u8; declared / 8];
    for (byte_idx, byte) in data.iter_mut().enumerate() {
        let start = HEADER_BITS + byte_idx * 8;
        *byte = (0..8).fold(0u8, |acc, j| (acc << 1) | buffer.bit(start + j));
    }

    debug!("Extracted {} bytes from {} pixels", data.len(), pixels);
    Ok(data)
}

/// Bit `i` of `data`, counting MSB first.
fn bit_at(data: &[u8], i: usize) -> u8 {
    (data[i / 8] >> (7 - (i % 8))) & 1
}

/// 8-bit character codes of `message`.
///
/// A character above U+00FF has no 8-bit code and cannot be framed.
fn message_bytes(message: &str) -> Result<Vec<u8>, CodecError> {
    message
        .chars()
        .map(|c| u8::try_from(c).map_err(|_| CodecError::UnencodableCharacter(c)))
        .collect()
}
