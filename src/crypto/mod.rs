//! Cryptographic primitives for the keystore MAC.
//!
//! Provides key derivation (PBKDF2 and the PKCS#12 KDF), HMAC computation,
//! constant-time comparison and salt generation. Derived keys are returned
//! as [`Zeroizing`] buffers so they are wiped when dropped.

use getrandom::fill;
use zeroize::Zeroizing;

use crate::error::{MacError, Result};

pub mod hmac;
pub mod kdf;

pub use self::hmac::{compute_hmac, constant_time_eq};
pub use kdf::{derive_pbkdf2, derive_pkcs12_mac_key};

/// Default salt length (20 bytes).
pub const SALT_LEN: usize = 20;

/// Generate a random salt of `len` bytes.
pub fn generate_salt(len: usize) -> Result<Vec<u8>> {
    let mut salt = vec![0u8; len];
    fill(&mut salt).map_err(|e| MacError::crypto("salt generation", e))?;
    Ok(salt)
}

/// UTF-8 bytes of the password, as PBKDF2 consumes them.
pub(crate) fn password_utf8(password: &str) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(password.as_bytes().to_vec())
}

/// BMPString form of the password with the two-byte terminator, as the
/// PKCS#12 KDF consumes it.
pub(crate) fn password_bmp(password: &str) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(
        password
            .encode_utf16()
            .flat_map(u16::to_be_bytes)
            .chain([0, 0])
            .collect(),
    )
}
