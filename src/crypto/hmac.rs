//! HMAC over the supported hash family.

use ::hmac::{Hmac, Mac};
use subtle::ConstantTimeEq;

use crate::algorithm::HmacAlgorithm;
use crate::error::{MacError, Result};

/// Runs `$body` with `$D` bound to the hash type of a
/// [`DigestAlgorithm`](crate::algorithm::DigestAlgorithm).
macro_rules! with_digest {
    ($alg:expr, $D:ident => $body:expr) => {
        match $alg {
            $crate::algorithm::DigestAlgorithm::Sha1 => {
                type $D = sha1::Sha1;
                $body
            }
            $crate::algorithm::DigestAlgorithm::Sha224 => {
                type $D = sha2::Sha224;
                $body
            }
            $crate::algorithm::DigestAlgorithm::Sha256 => {
                type $D = sha2::Sha256;
                $body
            }
            $crate::algorithm::DigestAlgorithm::Sha384 => {
                type $D = sha2::Sha384;
                $body
            }
            $crate::algorithm::DigestAlgorithm::Sha512 => {
                type $D = sha2::Sha512;
                $body
            }
            $crate::algorithm::DigestAlgorithm::Sha512_224 => {
                type $D = sha2::Sha512_224;
                $body
            }
            $crate::algorithm::DigestAlgorithm::Sha512_256 => {
                type $D = sha2::Sha512_256;
                $body
            }
        }
    };
}
pub(crate) use with_digest;

/// Computes the HMAC of `data` under `key`.
pub fn compute_hmac(alg: HmacAlgorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    with_digest!(alg.digest(), D => {
        let mut mac = <Hmac<D> as Mac>::new_from_slice(key)
            .map_err(|e| MacError::crypto("HMAC computation", e))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    })
}

/// Timing-safe equality. Slices of different length compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
