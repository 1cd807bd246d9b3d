//! PBKDF2-params (RFC 8018, appendix A.2).
//!
//! ```text
//! PBKDF2-params ::= SEQUENCE {
//!     salt CHOICE { specified OCTET STRING, otherSource AlgorithmIdentifier },
//!     iterationCount INTEGER (1..MAX),
//!     keyLength INTEGER (1..MAX) OPTIONAL,
//!     prf AlgorithmIdentifier DEFAULT algid-hmacWithSHA1 }
//! ```

use der::{Any, Tag, Tagged};

use super::{
    algorithm_identifier, integer, octets, sequence_items, write_algorithm_identifier,
    write_integer, write_octets, write_sequence,
};
use crate::algorithm::HmacAlgorithm;
use crate::error::{MacError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbkdf2Params {
    salt: Vec<u8>,
    iterations: u32,
    /// Derived key length in octets.
    key_length: Option<u32>,
    prf: HmacAlgorithm,
}

impl Pbkdf2Params {
    pub fn new(
        salt: Vec<u8>,
        iterations: u32,
        key_length: Option<u32>,
        prf: HmacAlgorithm,
    ) -> Self {
        Self {
            salt,
            iterations,
            key_length,
            prf,
        }
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn key_length(&self) -> Option<u32> {
        self.key_length
    }

    pub fn prf(&self) -> HmacAlgorithm {
        self.prf
    }

    /// Decodes the PBKDF2-params SEQUENCE.
    pub(crate) fn decode(any: &Any) -> Result<Self> {
        let items = sequence_items(any)?;
        let mut items = items.iter().peekable();

        let salt = match items.next() {
            Some(salt) if salt.tag() == Tag::OctetString => octets(salt)?,
            Some(salt) if salt.tag() == Tag::Sequence => {
                return Err(MacError::unsupported(
                    "PBKDF2 salt from otherSource is not supported",
                ));
            }
            _ => return Err(MacError::format("missing PBKDF2 salt")),
        };

        let iterations = match items.next() {
            Some(count) => integer(count)?,
            None => return Err(MacError::format("missing PBKDF2 iteration count")),
        };
        if iterations == 0 {
            return Err(MacError::format("PBKDF2 iteration count must be positive"));
        }

        let key_length = match items.next_if(|item| item.tag() == Tag::Integer) {
            Some(len) => Some(integer(len)?),
            None => None,
        };

        let prf = match items.next() {
            Some(prf) => {
                let (oid, _) = algorithm_identifier(prf)?;
                HmacAlgorithm::from_oid(&oid)
                    .ok_or_else(|| MacError::unsupported(format!("unsupported PBKDF2 PRF: {oid}")))?
            }
            None => HmacAlgorithm::Sha1,
        };

        if items.next().is_some() {
            return Err(MacError::format("Invalid length for PBKDF2-params"));
        }

        Ok(Self {
            salt,
            iterations,
            key_length,
            prf,
        })
    }

    /// Encodes with the salt always in the `specified` form and the PRF
    /// always written out.
    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let mut parts = vec![write_octets(&self.salt)?, write_integer(self.iterations)?];
        if let Some(len) = self.key_length {
            parts.push(write_integer(len)?);
        }
        parts.push(write_algorithm_identifier(self.prf.oid(), None)?);
        write_sequence(&parts)
    }
}

#[cfg(test)]
mod tests {
    use der::Decode;

    use super::*;

    fn decode_bytes(bytes: &[u8]) -> Result<Pbkdf2Params> {
        Pbkdf2Params::decode(&Any::from_der(bytes).unwrap())
    }

    #[test]
    fn encode_then_decode_keeps_fields() {
        let params = Pbkdf2Params::new(vec![9u8; 16], 2048, Some(32), HmacAlgorithm::Sha384);
        let parsed = decode_bytes(&params.encode().unwrap()).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn key_length_is_optional() {
        let params = Pbkdf2Params::new(vec![1, 2, 3], 1, None, HmacAlgorithm::Sha256);
        let parsed = decode_bytes(&params.encode().unwrap()).unwrap();
        assert_eq!(parsed.key_length(), None);
        assert_eq!(parsed.prf(), HmacAlgorithm::Sha256);
    }

    #[test]
    fn missing_prf_defaults_to_hmac_sha1() {
        let bytes = write_sequence(&[write_octets(b"salt").unwrap(), write_integer(10).unwrap()])
            .unwrap();
        let parsed = decode_bytes(&bytes).unwrap();
        assert_eq!(parsed.prf(), HmacAlgorithm::Sha1);
        assert_eq!(parsed.iterations(), 10);
    }

    #[test]
    fn non_hmac_prf_is_unsupported() {
        let bytes = write_sequence(&[
            write_octets(b"salt").unwrap(),
            write_integer(10).unwrap(),
            write_algorithm_identifier(crate::oid::SHA256, None).unwrap(),
        ])
        .unwrap();
        assert!(matches!(
            decode_bytes(&bytes),
            Err(MacError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let bytes = write_sequence(&[write_octets(b"salt").unwrap(), write_integer(0).unwrap()])
            .unwrap();
        assert!(matches!(decode_bytes(&bytes), Err(MacError::Format(_))));
    }

    #[test]
    fn other_source_salt_is_unsupported() {
        let other_source = write_algorithm_identifier(crate::oid::SHA256, None).unwrap();
        let bytes = write_sequence(&[other_source, write_integer(10).unwrap()]).unwrap();
        assert!(matches!(
            decode_bytes(&bytes),
            Err(MacError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn trailing_element_is_rejected() {
        let bytes = write_sequence(&[
            write_octets(b"salt").unwrap(),
            write_integer(10).unwrap(),
            write_integer(32).unwrap(),
            write_algorithm_identifier(HmacAlgorithm::Sha256.oid(), None).unwrap(),
            write_octets(b"extra").unwrap(),
        ])
        .unwrap();
        assert!(matches!(decode_bytes(&bytes), Err(MacError::Format(_))));
    }
}
