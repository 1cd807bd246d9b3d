//! Computing and verifying the keystore MAC.
//!
//! A PBMAC1 MAC derives its key with PBKDF2 and authenticates with the
//! verification HMAC; a legacy `HmacPBE` MAC derives its key with the PKCS#12
//! KDF and authenticates with the HMAC of the same digest. Derived keys are
//! [`Zeroizing`] and dropped as soon as the HMAC is computed.

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::algorithm::{HmacAlgorithm, MacAlgorithm, PBMAC1_LABEL};
use crate::config::{MAX_ITERATION_COUNT, MacSettings};
use crate::crypto::{self, compute_hmac, constant_time_eq};
use crate::error::{MacError, Result};
use crate::format::mac_data::{MacData, PbeParams};

/// PBKDF2 key length for a PBMAC1 verification HMAC.
///
/// HmacSHA512 gets a 512-bit key, every other variant a 256-bit key.
pub fn pbmac1_key_length_bits(verify: HmacAlgorithm) -> u32 {
    if verify == HmacAlgorithm::Sha512 { 512 } else { 256 }
}

/// Derives the MAC key for `algorithm` and returns the HMAC of `payload`.
fn derive_and_mac(
    password: &str,
    payload: &[u8],
    algorithm: MacAlgorithm,
    salt: &[u8],
    iterations: u32,
) -> Result<Vec<u8>> {
    let key: Zeroizing<Vec<u8>> = match algorithm {
        MacAlgorithm::Pbmac1 { kdf, verify } => {
            let bits = pbmac1_key_length_bits(verify);
            crypto::derive_pbkdf2(password, salt, iterations, kdf, (bits / 8) as usize)?
        }
        MacAlgorithm::Legacy(digest) => {
            crypto::derive_pkcs12_mac_key(password, salt, iterations, digest)?
        }
    };

    compute_hmac(algorithm.verify_hmac(), &key, payload)
}

/// Computes the MAC of `payload` and returns the encoded `MacData`.
///
/// `algorithm` is either `PBEWith<kdf>And<verify>` (PBMAC1) or
/// `HmacPBE<digest>` (legacy). `new_keystore` only affects logging; both new
/// and existing keystores honor the requested algorithm.
///
/// # Errors
///
/// - [`MacError::UnsupportedAlgorithm`] if `algorithm` does not resolve
/// - [`MacError::InvalidArgument`] for a zero iteration count
/// - [`MacError::Crypto`] if key derivation or HMAC fails
pub fn compute_mac(
    password: &str,
    payload: &[u8],
    new_keystore: bool,
    algorithm: &str,
    iterations: u32,
    salt: &[u8],
) -> Result<Vec<u8>> {
    let algorithm: MacAlgorithm = algorithm.parse()?;
    compute_mac_with(password, payload, new_keystore, algorithm, iterations, salt)
}

/// Typed variant of [`compute_mac`].
pub fn compute_mac_with(
    password: &str,
    payload: &[u8],
    new_keystore: bool,
    algorithm: MacAlgorithm,
    iterations: u32,
    salt: &[u8],
) -> Result<Vec<u8>> {
    if iterations == 0 {
        return Err(MacError::invalid("MAC iteration count must be >= 1"));
    }
    debug!(%algorithm, iterations, new_keystore, "computing keystore MAC");

    let digest = derive_and_mac(password, payload, algorithm, salt, iterations)?;
    let params = PbeParams::new(salt, iterations);

    let record = match algorithm {
        MacAlgorithm::Pbmac1 { kdf, verify } => MacData::new(
            PBMAC1_LABEL,
            digest,
            params,
            Some(kdf.name()),
            Some(verify.name()),
            Some(pbmac1_key_length_bits(verify)),
        )?,
        MacAlgorithm::Legacy(digest_alg) => MacData::legacy(digest_alg, digest, params)?,
    };
    record.encode()
}

/// Computes a MAC for a new keystore with a fresh random salt.
pub fn compute_mac_with_settings(
    password: &str,
    payload: &[u8],
    settings: &MacSettings,
) -> Result<Vec<u8>> {
    settings.validate()?;
    let salt = crypto::generate_salt(settings.salt_len)?;
    compute_mac_with(
        password,
        payload,
        true,
        settings.algorithm,
        settings.iterations,
        &salt,
    )
}

/// Verifies `payload` against a decoded record, using the record's own
/// algorithm.
pub fn verify_mac(record: &MacData, password: &str, payload: &[u8]) -> Result<()> {
    verify_with_algorithm(record, password, payload, record.algorithm())
}

/// Verifies `payload` against a decoded record.
///
/// If `algorithm` uses the `PBEWith…` spelling, the record's own PBMAC1
/// HMACs are used. Otherwise `algorithm` names the legacy MAC.
///
/// # Errors
///
/// - [`MacError::IntegrityCheckFailed`] if the MAC does not match
/// - [`MacError::InvalidArgument`] if the iteration count exceeds
///   [`MAX_ITERATION_COUNT`]
/// - [`MacError::UnsupportedAlgorithm`] if `algorithm` does not resolve
/// - [`MacError::Crypto`] if key derivation or HMAC fails
pub fn verify_mac_with(
    record: &MacData,
    password: &str,
    payload: &[u8],
    algorithm: &str,
) -> Result<()> {
    let algorithm = if MacAlgorithm::is_composite(algorithm) {
        match (record.kdf_hmac(), record.verify_hmac()) {
            (Some(kdf), Some(verify)) => MacAlgorithm::Pbmac1 { kdf, verify },
            _ => algorithm.parse()?,
        }
    } else {
        algorithm.parse()?
    };
    verify_with_algorithm(record, password, payload, algorithm)
}

fn verify_with_algorithm(
    record: &MacData,
    password: &str,
    payload: &[u8],
    algorithm: MacAlgorithm,
) -> Result<()> {
    if record.iterations() > MAX_ITERATION_COUNT {
        return Err(MacError::invalid("MAC iteration count too large"));
    }
    debug!(%algorithm, iterations = record.iterations(), "verifying keystore MAC");

    let computed = derive_and_mac(
        password,
        payload,
        algorithm,
        record.salt(),
        record.iterations(),
    )?;

    if !constant_time_eq(&computed, record.digest()) {
        warn!("keystore MAC verification failed");
        return Err(MacError::IntegrityCheckFailed);
    }
    Ok(())
}
