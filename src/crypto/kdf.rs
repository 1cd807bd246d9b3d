//! Password-based key derivation.
//!
//! - PBKDF2 (RFC 8018) for PBMAC1 MACs
//! - the PKCS#12 KDF (RFC 7292, appendix B.2) for legacy `HmacPBE` MACs

use ::hmac::Hmac;
use sha2::digest::core_api::BlockSizeUser;
use sha2::digest::{Digest, Output};
use zeroize::{Zeroize, Zeroizing};

use super::hmac::with_digest;
use super::{password_bmp, password_utf8};
use crate::algorithm::{DigestAlgorithm, HmacAlgorithm};
use crate::error::{MacError, Result};

/// PKCS#12 diversifier for MAC key material.
const PKCS12_MAC_ID: u8 = 3;

/// Derives `key_len` bytes with PBKDF2, using `prf` as pseudorandom function.
pub fn derive_pbkdf2(
    password: &str,
    salt: &[u8],
    iterations: u32,
    prf: HmacAlgorithm,
    key_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    if iterations == 0 {
        return Err(MacError::invalid("PBKDF2 iteration count must be >= 1"));
    }

    let password = password_utf8(password);
    let mut key = Zeroizing::new(vec![0u8; key_len]);
    with_digest!(prf.digest(), D => {
        pbkdf2::pbkdf2::<Hmac<D>>(&password, salt, iterations, &mut key)
            .map_err(|e| MacError::crypto("key derivation", e))?
    });
    Ok(key)
}

/// Derives the HMAC key of a legacy MAC: PKCS#12 KDF with ID 3, key length
/// equal to the digest output.
pub fn derive_pkcs12_mac_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
    digest: DigestAlgorithm,
) -> Result<Zeroizing<Vec<u8>>> {
    if iterations == 0 {
        return Err(MacError::invalid("PKCS#12 KDF iteration count must be >= 1"));
    }

    let password = password_bmp(password);
    let key_len = digest.output_len();
    Ok(with_digest!(digest, D => {
        pkcs12_kdf::<D>(&password, salt, PKCS12_MAC_ID, iterations, key_len)
    }))
}

/// RFC 7292, appendix B.2.
fn pkcs12_kdf<D>(
    password: &[u8],
    salt: &[u8],
    id: u8,
    iterations: u32,
    key_len: usize,
) -> Zeroizing<Vec<u8>>
where
    D: Digest + BlockSizeUser,
{
    let u = <D as Digest>::output_size();
    let v = <D as BlockSizeUser>::block_size();

    let diversifier = vec![id; v];
    let salt_block = fill_to_block(salt, v);
    let password_block = fill_to_block(password, v);
    let mut input = Zeroizing::new([salt_block.as_slice(), password_block.as_slice()].concat());

    let mut out = Zeroizing::new(Vec::with_capacity(key_len + u));
    let mut block = Output::<D>::default();
    loop {
        let mut hasher = <D as Digest>::new();
        hasher.update(&diversifier);
        hasher.update(input.as_slice());
        hasher.finalize_into(&mut block);
        for _ in 1..iterations {
            let mut hasher = <D as Digest>::new();
            hasher.update(&block);
            hasher.finalize_into(&mut block);
        }
        out.extend_from_slice(&block);

        if out.len() >= key_len {
            break;
        }

        // I_j = (I_j + B + 1) mod 2^(8v), B being the block repeated to v bytes
        for chunk in input.chunks_mut(v) {
            let mut carry = 1u16;
            for k in (0..v).rev() {
                let sum = u16::from(chunk[k]) + u16::from(block[k % u]) + carry;
                chunk[k] = sum as u8;
                carry = sum >> 8;
            }
        }
    }
    block.as_mut_slice().zeroize();

    out.truncate(key_len);
    out
}

/// Repeats `data` up to the next multiple of `v` bytes; empty stays empty.
fn fill_to_block(data: &[u8], v: usize) -> Zeroizing<Vec<u8>> {
    let len = v * data.len().div_ceil(v);
    Zeroizing::new(data.iter().copied().cycle().take(len).collect())
}
