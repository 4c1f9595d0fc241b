//! Hide and extract pipelines.
//!
//! Hide: payload -> envelope (AES-256-GCM) -> base64 -> LSB embed.
//! Extract: LSB extract -> base64 -> envelope open -> classify.
//!
//! Every call is self-contained; nothing is cached between calls.

use log::{debug, info};
use rand::{CryptoRng, RngCore};
use thiserror::Error;

use crate::crypto::{self, EnvelopeError, HEADER_LEN, TAG_LEN};
use crate::payload::{classify, Payload};
use crate::stego::{self, CodecError, PixelBuffer};

/// Failures surfaced by [`hide`] and [`extract`].
///
/// Each variant is its own user-facing category: `Authentication` points at
/// the password, `MalformedEnvelope` at foreign data, `TruncatedData` at an
/// image that never carried a payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    #[error("Payload too large for this image: needs {needed} bits, capacity is {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("No hidden data found: header declares {declared} bits, image has {available}")]
    TruncatedData { declared: usize, available: usize },

    #[error("Hidden data is not a valid envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Authentication failed: wrong password or tampered image")]
    Authentication,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Invalid cover image: {0}")]
    InvalidCover(String),
}

impl StegoError {
    /// What the user should do about this failure.
    pub fn user_hint(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "Use a larger cover image or a smaller payload.",
            Self::TruncatedData { .. } => {
                "This image does not contain hidden data, or it was re-encoded with a lossy format."
            }
            Self::MalformedEnvelope(_) => {
                "The image holds data that was not produced by veilpix. Check that you picked the right image."
            }
            Self::Authentication => "Check your password.",
            Self::Encryption(_) => "Internal cryptographic failure.",
            Self::InvalidCover(_) => "The cover image could not be used as an RGBA pixel buffer.",
        }
    }

    /// Whether the failure points at the password rather than the image.
    pub fn is_password_problem(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}

impl From<EnvelopeError> for StegoError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::EncryptionFailed(msg) => Self::Encryption(msg),
            EnvelopeError::MalformedEnvelope(msg) => Self::MalformedEnvelope(msg),
            EnvelopeError::AuthenticationFailed => Self::Authentication,
        }
    }
}

impl From<CodecError> for StegoError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::CapacityExceeded { needed, capacity } => {
                Self::CapacityExceeded { needed, capacity }
            }
            CodecError::TruncatedData {
                declared,
                available,
            } => Self::TruncatedData {
                declared,
                available,
            },
            CodecError::InvalidPixelBuffer(msg) => Self::InvalidCover(msg),
            // Transport strings are base64, so this means the envelope layer misbehaved
            CodecError::UnencodableCharacter(c) => {
                Self::Encryption(format!("transport contains non 8-bit character {c:?}"))
            }
        }
    }
}

/// Message bits needed to hide a payload of `payload_len` bytes.
///
/// Envelope overhead (salt, nonce, tag) plus base64 expansion, excluding the
/// 32-bit length header. `None` when the count does not fit in `usize`.
pub fn required_bits(payload_len: usize) -> Option<usize> {
    let envelope_len = payload_len.checked_add(HEADER_LEN + TAG_LEN)?;
    let transport_len = envelope_len.div_ceil(3).checked_mul(4)?;
    transport_len.checked_mul(8)
}

/// Largest payload, in bytes, whose envelope fits in `capacity_bits`.
///
/// `None` when not even an empty payload fits.
pub fn max_payload_len(capacity_bits: usize) -> Option<usize> {
    let envelope_len = (capacity_bits / 32) * 3;
    envelope_len.checked_sub(HEADER_LEN + TAG_LEN)
}

/// Encrypts `payload` with `password` and hides it in `cover`.
///
/// On error `cover` is left unchanged.
pub fn hide(cover: &mut PixelBuffer, payload: &[u8], password: &str) -> Result<(), StegoError> {
    let transport = crypto::encrypt(payload, password)?;
    embed_transport(cover, &transport)
}

/// [`hide`] with an injected random source for salt and nonce.
pub fn hide_with_rng<R>(
    rng: &mut R,
    cover: &mut PixelBuffer,
    payload: &[u8],
    password: &str,
) -> Result<(), StegoError>
where
    R: RngCore + CryptoRng,
{
    let transport = crypto::encrypt_with_rng(rng, payload, password)?;
    embed_transport(cover, &transport)
}

fn embed_transport(cover: &mut PixelBuffer, transport: &str) -> Result<(), StegoError> {
    stego::embed(cover, transport)?;
    info!(
        "Hid {}-character envelope in {}x{} image ({} bits left)",
        transport.len(),
        cover.width(),
        cover.height(),
        cover.capacity_bits() - transport.len() * 8
    );
    Ok(())
}

/// Recovers and decrypts the payload hidden in `stego_image`, then classifies it.
pub fn extract(stego_image: &PixelBuffer, password: &str) -> Result<Payload, StegoError> {
    let raw = extract_raw(stego_image, password)?;
    Ok(classify(&raw))
}

/// Recovers and decrypts the exact payload bytes hidden in `stego_image`.
pub fn extract_raw(stego_image: &PixelBuffer, password: &str) -> Result<Vec<u8>, StegoError> {
    let transport = stego::extract(stego_image)?;
    debug!("Recovered {}-character transport string", transport.len());

    let payload = crypto::decrypt(&transport, password)?;
    info!("Extracted {} payload bytes", payload.len());
    Ok(payload)
}
