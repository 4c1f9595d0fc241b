//! Cryptographic operations for veilpix.
//!
//! This module provides:
//! - Key derivation from a password (PBKDF2-HMAC-SHA256)
//! - The authenticated envelope (AES-256-GCM) and its base64 transport form

pub mod envelope;
pub mod kdf;

pub use envelope::{
    decrypt, encrypt, encrypt_with_rng, Envelope, EnvelopeError, HEADER_LEN, NONCE_LEN, TAG_LEN,
};
pub use kdf::{derive_key, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
