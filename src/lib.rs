//! # veilpix - password-protected secrets in image pixels
//!
//! veilpix hides a payload (text or any file) inside the pixels of a raster
//! image and recovers it later with the same password.
//!
//! ## Overview
//!
//! Hiding is two layers:
//! - The payload is sealed in an **envelope**: PBKDF2-HMAC-SHA256 (100,000
//!   iterations) derives an AES-256-GCM key from the password and a random
//!   salt; salt, nonce and ciphertext travel together as one base64 string
//! - The base64 string is written into the **least significant bit of the red
//!   channel**, one bit per pixel, behind a 32-bit length header
//!
//! Extraction reverses both layers and tells apart the ways it can fail:
//! an image that holds nothing, data that is not an envelope, and a wrong
//! password.
//!
//! ## Example Usage
//!
//! ```rust
//! use veilpix::{extract, hide, Payload, PixelBuffer, StegoError};
//!
//! // 64x64 opaque cover
//! let mut cover = PixelBuffer::filled(64, 64, [30, 144, 255, 255]).unwrap();
//!
//! hide(&mut cover, b"hello", "secret123").unwrap();
//!
//! let payload = extract(&cover, "secret123").unwrap();
//! assert_eq!(payload, Payload::Text("hello".to_string()));
//!
//! assert_eq!(extract(&cover, "wrong-pass"), Err(StegoError::Authentication));
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: key derivation and the authenticated envelope
//! - [`stego`]: LSB codec and image file adapter
//! - [`payload`]: text vs. data-URI classification
//! - [`pipeline`]: hide and extract
//! - [`config`]: CLI settings

pub mod config;
pub mod crypto;
pub mod payload;
pub mod pipeline;
pub mod stego;

// Re-export commonly used types at the crate root
pub use crypto::{Envelope, EnvelopeError};
pub use payload::{classify, to_data_uri, Payload};
pub use pipeline::{
    extract, extract_raw, hide, hide_with_rng, max_payload_len, required_bits, StegoError,
};
pub use stego::{CodecError, ImageError, OutputFormat, PixelBuffer};
