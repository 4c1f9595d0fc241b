//! Steganography over raster images.
//!
//! - [`codec`]: LSB embedding and extraction on an RGBA8 pixel buffer
//! - [`image`](self::image): loading covers from files and rendering stego images

pub mod codec;
pub mod image;

pub use codec::{
    embed, embed_bytes, extract, extract_bytes, CodecError, PixelBuffer, CHANNELS, HEADER_BITS,
};
pub use self::image::{load_pixel_buffer, render_pixel_buffer, ImageError, OutputFormat};
