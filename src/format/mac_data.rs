//! The PKCS#12 `MacData` record.
//!
//! Legacy shape (RFC 7292):
//! ```text
//! MacData ::= SEQUENCE {
//!     mac        DigestInfo,            -- { AlgorithmIdentifier(digest), OCTET STRING }
//!     macSalt    OCTET STRING,
//!     iterations INTEGER DEFAULT 1 }
//! ```
//!
//! PBMAC1 shape (RFC 9579): the `DigestInfo` algorithm is id-PBMAC1 carrying
//! the PBKDF2 salt and iteration count, while `macSalt` and `iterations` are
//! the fixed fillers `"NOT USED"` and `1`.

use std::sync::OnceLock;

use der::Any;
use tracing::debug;

use super::pbmac1::{self, Pbmac1Params};
use super::{
    algorithm_identifier, integer, octets, parse_sequence, sequence_items,
    write_algorithm_identifier, write_integer, write_octets, write_sequence,
};
use crate::algorithm::{DigestAlgorithm, HmacAlgorithm, MacAlgorithm, PBMAC1_LABEL};
use crate::error::{MacError, Result};
use crate::oid;

/// `macSalt` placeholder written by the PBMAC1 shape.
pub const PBMAC1_SALT_PLACEHOLDER: &[u8] = b"NOT USED";
/// `iterations` value written by the PBMAC1 shape.
pub const PBMAC1_ITERATIONS_PLACEHOLDER: u32 = 1;

/// Salt and iteration count handed to [`MacData::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbeParams {
    pub salt: Vec<u8>,
    pub iterations: u32,
}

impl PbeParams {
    pub fn new(salt: impl Into<Vec<u8>>, iterations: u32) -> Self {
        Self {
            salt: salt.into(),
            iterations,
        }
    }
}

/// Which wire shape a [`MacData`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacScheme {
    Legacy {
        digest: DigestAlgorithm,
    },
    Pbmac1 {
        kdf: HmacAlgorithm,
        verify: HmacAlgorithm,
        key_length_bits: Option<u32>,
    },
}

/// Integrity record of a keystore.
///
/// All fields are fixed at construction. The DER encoding is computed on
/// first use and then reused.
#[derive(Debug, Clone)]
pub struct MacData {
    digest: Vec<u8>,
    salt: Vec<u8>,
    iterations: u32,
    scheme: MacScheme,
    encoded: OnceLock<Vec<u8>>,
}

impl PartialEq for MacData {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
            && self.salt == other.salt
            && self.iterations == other.iterations
            && self.scheme == other.scheme
    }
}

impl Eq for MacData {}

impl MacData {
    /// Builds a record from a textual algorithm label.
    ///
    /// `algorithm` is either the reserved `PBMAC1` label, in which case
    /// `kdf_hmac` and `verify_hmac` are required, or a digest name such as
    /// `SHA-256` / `SHA256` selecting the legacy shape. For the legacy shape the
    /// HMAC names and key length are ignored.
    ///
    /// # Errors
    ///
    /// - [`MacError::InvalidArgument`] for an empty label or digest, a zero
    ///   iteration count, or missing PBMAC1 HMAC names
    /// - [`MacError::UnsupportedAlgorithm`] if a name does not resolve
    pub fn new(
        algorithm: &str,
        digest: impl Into<Vec<u8>>,
        params: PbeParams,
        kdf_hmac: Option<&str>,
        verify_hmac: Option<&str>,
        key_length_bits: Option<u32>,
    ) -> Result<Self> {
        if algorithm.is_empty() {
            return Err(MacError::invalid("algorithm is required"));
        }
        let digest = digest.into();

        let scheme = if algorithm.eq_ignore_ascii_case(PBMAC1_LABEL) {
            let kdf = kdf_hmac
                .ok_or_else(|| MacError::invalid("PBMAC1 requires a key derivation HMAC"))?
                .parse()?;
            let verify = verify_hmac
                .ok_or_else(|| MacError::invalid("PBMAC1 requires a verification HMAC"))?
                .parse()?;
            MacScheme::Pbmac1 {
                kdf,
                verify,
                key_length_bits,
            }
        } else {
            MacScheme::Legacy {
                digest: algorithm.parse()?,
            }
        };

        Self::with_scheme(scheme, digest, params)
    }

    /// Builds a legacy record.
    pub fn legacy(digest_alg: DigestAlgorithm, digest: Vec<u8>, params: PbeParams) -> Result<Self> {
        Self::with_scheme(MacScheme::Legacy { digest: digest_alg }, digest, params)
    }

    /// Builds a PBMAC1 record.
    pub fn pbmac1(
        kdf: HmacAlgorithm,
        verify: HmacAlgorithm,
        key_length_bits: Option<u32>,
        digest: Vec<u8>,
        params: PbeParams,
    ) -> Result<Self> {
        Self::with_scheme(
            MacScheme::Pbmac1 {
                kdf,
                verify,
                key_length_bits,
            },
            digest,
            params,
        )
    }

    fn with_scheme(scheme: MacScheme, digest: Vec<u8>, params: PbeParams) -> Result<Self> {
        if digest.is_empty() {
            return Err(MacError::invalid("digest must not be empty"));
        }
        if params.iterations == 0 {
            return Err(MacError::invalid(
                "unsupported parameter spec: iteration count must be positive",
            ));
        }
        if let MacScheme::Pbmac1 {
            key_length_bits: Some(bits),
            ..
        } = scheme
        {
            if bits == 0 || bits % 8 != 0 {
                return Err(MacError::invalid(format!(
                    "derived key length must be a positive multiple of 8 bits, got {bits}"
                )));
            }
        }

        Ok(Self {
            digest,
            salt: params.salt,
            iterations: params.iterations,
            scheme,
            encoded: OnceLock::new(),
        })
    }

    /// Decodes either wire shape.
    ///
    /// # Errors
    ///
    /// - [`MacError::Format`] for a wrong tag or element count
    /// - [`MacError::UnsupportedAlgorithm`] for an unknown algorithm
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let items = parse_sequence(bytes)?;
        if !(2..=3).contains(&items.len()) {
            return Err(MacError::format("Invalid length for MacData"));
        }

        let digest_info = sequence_items(&items[0])?;
        let [alg_id, digest] = digest_info.as_slice() else {
            return Err(MacError::format("Invalid length for DigestInfo"));
        };
        let (alg_oid, alg_params) = algorithm_identifier(alg_id)?;
        let digest = octets(digest)?;
        if digest.is_empty() {
            return Err(MacError::format("empty MAC digest"));
        }

        let record = if alg_oid == oid::PBMAC1 {
            let params = alg_params
                .ok_or_else(|| MacError::format("missing PBMAC1 parameters"))?;
            Self::from_pbmac1(digest, &params)?
        } else {
            let digest_alg = DigestAlgorithm::from_oid(&alg_oid).ok_or_else(|| {
                MacError::unsupported(format!("unsupported MAC digest algorithm: {alg_oid}"))
            })?;
            let salt = octets(&items[1])?;
            let iterations = match items.get(2) {
                Some(count) => integer(count)?,
                None => 1,
            };
            if iterations == 0 {
                return Err(MacError::format("MacData iteration count must be positive"));
            }
            Self::legacy(digest_alg, digest, PbeParams::new(salt, iterations))?
        };

        debug!(
            algorithm = %record.mac_algorithm(),
            iterations = record.iterations,
            "decoded MacData"
        );
        Ok(record)
    }

    fn from_pbmac1(digest: Vec<u8>, params: &Any) -> Result<Self> {
        let params = Pbmac1Params::decode(params)?;
        let kdf = params.kdf();
        let key_length_bits = match kdf.key_length() {
            Some(octets) => Some(
                octets
                    .checked_mul(8)
                    .filter(|bits| *bits > 0)
                    .ok_or_else(|| {
                        MacError::format(format!("invalid PBKDF2 key length {octets}"))
                    })?,
            ),
            None => None,
        };

        Self::pbmac1(
            kdf.prf(),
            params.verify(),
            key_length_bits,
            digest,
            PbeParams::new(kdf.salt(), kdf.iterations()),
        )
    }

    /// Returns the DER encoding, computing it on first call.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if let Some(encoded) = self.encoded.get() {
            return Ok(encoded.clone());
        }

        let encoded = match self.scheme {
            MacScheme::Pbmac1 {
                kdf,
                verify,
                key_length_bits,
            } => {
                let params =
                    pbmac1::encode(&self.salt, self.iterations, key_length_bits, kdf, verify)?;
                let alg_id = write_algorithm_identifier(oid::PBMAC1, Some(params))?;
                let digest_info = write_sequence(&[alg_id, write_octets(&self.digest)?])?;
                write_sequence(&[
                    digest_info,
                    write_octets(PBMAC1_SALT_PLACEHOLDER)?,
                    write_integer(PBMAC1_ITERATIONS_PLACEHOLDER)?,
                ])?
            }
            MacScheme::Legacy { digest } => {
                let alg_id = write_algorithm_identifier(digest.oid(), None)?;
                let digest_info = write_sequence(&[alg_id, write_octets(&self.digest)?])?;
                write_sequence(&[
                    digest_info,
                    write_octets(&self.salt)?,
                    write_integer(self.iterations)?,
                ])?
            }
        };

        Ok(self.encoded.get_or_init(|| encoded).clone())
    }

    /// The stored MAC value.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn scheme(&self) -> MacScheme {
        self.scheme
    }

    pub fn is_pbmac1(&self) -> bool {
        matches!(self.scheme, MacScheme::Pbmac1 { .. })
    }

    /// The algorithm this record was computed with.
    pub fn algorithm(&self) -> MacAlgorithm {
        match self.scheme {
            MacScheme::Legacy { digest } => MacAlgorithm::Legacy(digest),
            MacScheme::Pbmac1 { kdf, verify, .. } => MacAlgorithm::Pbmac1 { kdf, verify },
        }
    }

    /// Display name: `PBEWith<kdf>And<verify>` or `HmacPBE<digest>`.
    pub fn mac_algorithm(&self) -> String {
        self.algorithm().to_string()
    }

    /// Name of the legacy digest or the reserved `PBMAC1` label.
    pub fn digest_algorithm_name(&self) -> &'static str {
        match self.scheme {
            MacScheme::Legacy { digest } => digest.name(),
            MacScheme::Pbmac1 { .. } => PBMAC1_LABEL,
        }
    }

    pub fn kdf_hmac(&self) -> Option<HmacAlgorithm> {
        match self.scheme {
            MacScheme::Pbmac1 { kdf, .. } => Some(kdf),
            MacScheme::Legacy { .. } => None,
        }
    }

    pub fn verify_hmac(&self) -> Option<HmacAlgorithm> {
        match self.scheme {
            MacScheme::Pbmac1 { verify, .. } => Some(verify),
            MacScheme::Legacy { .. } => None,
        }
    }

    pub fn key_length_bits(&self) -> Option<u32> {
        match self.scheme {
            MacScheme::Pbmac1 {
                key_length_bits, ..
            } => key_length_bits,
            MacScheme::Legacy { .. } => None,
        }
    }
}
