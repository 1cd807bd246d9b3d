//! PBMAC1 parameters (RFC 8018, appendix A.5).
//!
//! ```text
//! PBMAC1-params ::= SEQUENCE {
//!     keyDerivationFunc AlgorithmIdentifier {{PBMAC1-KDFs}},
//!     messageAuthScheme AlgorithmIdentifier {{PBMAC1-MACs}} }
//! ```
//!
//! PBKDF2 is the only accepted key derivation function and the message
//! authentication scheme must be one of the HmacSHA variants.

use der::{Any, Decode};

use super::kdf_params::Pbkdf2Params;
use super::{algorithm_identifier, sequence_items, write_algorithm_identifier, write_sequence};
use crate::algorithm::HmacAlgorithm;
use crate::error::{MacError, Result};
use crate::oid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbmac1Params {
    kdf: Pbkdf2Params,
    verify: HmacAlgorithm,
}

impl Pbmac1Params {
    pub fn new(kdf: Pbkdf2Params, verify: HmacAlgorithm) -> Self {
        Self { kdf, verify }
    }

    pub fn kdf(&self) -> &Pbkdf2Params {
        &self.kdf
    }

    /// The message authentication scheme.
    pub fn verify(&self) -> HmacAlgorithm {
        self.verify
    }

    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        Self::decode(&Any::from_der(bytes)?)
    }

    pub(crate) fn decode(any: &Any) -> Result<Self> {
        let items = sequence_items(any)?;
        let [kdf_alg, mac_alg] = items.as_slice() else {
            return Err(MacError::format("Invalid length for PBMAC1-params"));
        };

        let (mac_oid, _) = algorithm_identifier(mac_alg)?;
        let verify = HmacAlgorithm::from_oid(&mac_oid).ok_or_else(|| {
            MacError::unsupported(format!(
                "expecting the object identifier for a HmacSHA message authentication \
                 scheme, found {mac_oid}"
            ))
        })?;

        let (kdf_oid, kdf_params) = algorithm_identifier(kdf_alg)?;
        if kdf_oid != oid::PBKDF2 {
            return Err(MacError::unsupported(format!(
                "expecting the object identifier for PBKDF2, found {kdf_oid}"
            )));
        }
        let kdf_params =
            kdf_params.ok_or_else(|| MacError::format("missing PBKDF2 parameters"))?;
        let kdf = Pbkdf2Params::decode(&kdf_params)?;

        Ok(Self { kdf, verify })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let kdf = write_algorithm_identifier(oid::PBKDF2, Some(self.kdf.encode()?))?;
        let mac = write_algorithm_identifier(self.verify.oid(), None)?;
        write_sequence(&[kdf, mac])
    }
}

/// Encodes PBMAC1-params from their flat parts; `key_length_bits` is written
/// in octets.
pub fn encode(
    salt: &[u8],
    iterations: u32,
    key_length_bits: Option<u32>,
    kdf: HmacAlgorithm,
    verify: HmacAlgorithm,
) -> Result<Vec<u8>> {
    let kdf = Pbkdf2Params::new(salt.to_vec(), iterations, key_length_bits.map(|b| b / 8), kdf);
    Pbmac1Params::new(kdf, verify).encode()
}
