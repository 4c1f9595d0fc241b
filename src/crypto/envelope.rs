//! Password-protected authenticated envelope.
//!
//! Wire layout (binary, then base64 for transport):
//!
//! ```text
//! offset 0..16   salt            (16 bytes)
//! offset 16..28  nonce           (12 bytes)
//! offset 28..end ciphertext||tag (AES-256-GCM, tag is the trailing 16 bytes)
//! ```
//!
//! Salt and nonce travel with the ciphertext, so decryption needs nothing but
//! the transport string and the password.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::debug;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

use super::kdf::{derive_key, SALT_LEN};

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Smallest decoded envelope that can be split into salt and nonce.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;

/// Errors that can occur while sealing or opening an envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Authentication failed: wrong password or corrupted data")]
    AuthenticationFailed,
}

/// A decoded envelope: salt, nonce and authenticated ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext followed by the 16-byte GCM tag.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serializes to `salt || nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Splits a binary envelope into its parts.
    ///
    /// Only the 28-byte header is required here; a body shorter than a tag is
    /// left for the AEAD to reject.
    pub fn from_bytes(data: &[u8]) -> Result<Self, EnvelopeError> {
        if data.len() < HEADER_LEN {
            return Err(EnvelopeError::MalformedEnvelope(format!(
                "{} bytes is shorter than the {}-byte salt and nonce header",
                data.len(),
                HEADER_LEN
            )));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&data[..SALT_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&data[SALT_LEN..HEADER_LEN]);

        Ok(Self {
            salt,
            nonce,
            ciphertext: data[HEADER_LEN..].to_vec(),
        })
    }

    /// Base64 transport string.
    pub fn to_transport(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    /// Parses a base64 transport string.
    pub fn from_transport(transport: &str) -> Result<Self, EnvelopeError> {
        let data = BASE64
            .decode(transport)
            .map_err(|e| EnvelopeError::MalformedEnvelope(format!("invalid base64: {e}")))?;
        Self::from_bytes(&data)
    }
}

/// Encrypts `payload` under `password` using the operating system RNG.
pub fn encrypt(payload: &[u8], password: &str) -> Result<String, EnvelopeError> {
    encrypt_with_rng(&mut OsRng, payload, password)
}

/// Encrypts `payload` under `password`, drawing salt and nonce from `rng`.
///
/// Returns the base64 transport string of a fresh envelope.
pub fn encrypt_with_rng<R>(rng: &mut R, payload: &[u8], password: &str) -> Result<String, EnvelopeError>
where
    R: RngCore + CryptoRng,
{
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| EnvelopeError::EncryptionFailed(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), payload)
        .map_err(|e| EnvelopeError::EncryptionFailed(e.to_string()))?;

    let envelope = Envelope {
        salt,
        nonce,
        ciphertext,
    };
    let transport = envelope.to_transport();
    debug!(
        "Sealed {} payload bytes into a {}-character transport string",
        payload.len(),
        transport.len()
    );

    Ok(transport)
}

/// Decrypts a transport string produced by [`encrypt`].
///
/// Structural problems are [`EnvelopeError::MalformedEnvelope`]; a tag that
/// does not verify is [`EnvelopeError::AuthenticationFailed`].
pub fn decrypt(transport: &str, password: &str) -> Result<Vec<u8>, EnvelopeError> {
    let envelope = Envelope::from_transport(transport)?;

    let key = derive_key(password, &envelope.salt);
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| EnvelopeError::EncryptionFailed(e.to_string()))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.ciphertext.as_slice())
        .map_err(|_| EnvelopeError::AuthenticationFailed)?;

    debug!("Opened envelope: {} plaintext bytes", plaintext.len());
    Ok(plaintext)
}
