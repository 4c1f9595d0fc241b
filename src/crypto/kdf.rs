//! Password-based key derivation.
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 over a per-envelope random salt.
//! Nothing is cached: every encrypt or decrypt call pays the full iteration
//! cost, and the derived key is wiped when it goes out of scope.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

/// PBKDF2 iteration count. Part of the wire contract, not a tunable.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Derives a 256-bit AES key from a password and salt.
///
/// Deterministic for identical inputs. The returned buffer is zeroized on drop.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut *key);
    key
}
