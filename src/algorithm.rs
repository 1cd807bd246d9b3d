//! Algorithm names and their object identifiers.
//!
//! Textual spellings such as `PBEWithHmacSHA256AndHmacSHA256` or
//! `HmacPBESHA256` only exist at the API boundary. Internally everything is
//! carried as [`HmacAlgorithm`], [`DigestAlgorithm`] and [`MacAlgorithm`].

use std::fmt;
use std::str::FromStr;

use der::asn1::ObjectIdentifier;

use crate::error::{MacError, Result};
use crate::oid;

/// Reserved label of the PBMAC1 scheme.
pub const PBMAC1_LABEL: &str = "PBMAC1";

const COMPOSITE_PREFIX: &str = "PBEWith";
const COMPOSITE_SEPARATOR: &str = "And";
const LEGACY_PREFIX: &str = "HmacPBE";

/// Hash functions usable for legacy MACs and as HMAC building blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 7] = [
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha224,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Sha512_224,
        DigestAlgorithm::Sha512_256,
    ];

    /// Standard name, e.g. `SHA-256`.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha224 => "SHA-224",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
            DigestAlgorithm::Sha512_224 => "SHA-512/224",
            DigestAlgorithm::Sha512_256 => "SHA-512/256",
        }
    }

    pub fn oid(self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Sha1 => oid::SHA1,
            DigestAlgorithm::Sha224 => oid::SHA224,
            DigestAlgorithm::Sha256 => oid::SHA256,
            DigestAlgorithm::Sha384 => oid::SHA384,
            DigestAlgorithm::Sha512 => oid::SHA512,
            DigestAlgorithm::Sha512_224 => oid::SHA512_224,
            DigestAlgorithm::Sha512_256 => oid::SHA512_256,
        }
    }

    /// Output length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha224 | DigestAlgorithm::Sha512_224 => 28,
            DigestAlgorithm::Sha256 | DigestAlgorithm::Sha512_256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// The HMAC built on this hash.
    pub fn hmac(self) -> HmacAlgorithm {
        match self {
            DigestAlgorithm::Sha1 => HmacAlgorithm::Sha1,
            DigestAlgorithm::Sha224 => HmacAlgorithm::Sha224,
            DigestAlgorithm::Sha256 => HmacAlgorithm::Sha256,
            DigestAlgorithm::Sha384 => HmacAlgorithm::Sha384,
            DigestAlgorithm::Sha512 => HmacAlgorithm::Sha512,
            DigestAlgorithm::Sha512_224 => HmacAlgorithm::Sha512_224,
            DigestAlgorithm::Sha512_256 => HmacAlgorithm::Sha512_256,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.oid() == *oid)
    }

    /// Looks up a digest by name. Hyphens and case are ignored, and the
    /// historical alias `SHA` means SHA-1.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.replace('-', "");
        if wanted.eq_ignore_ascii_case("SHA") {
            return Some(DigestAlgorithm::Sha1);
        }
        Self::ALL
            .into_iter()
            .find(|d| d.name().replace('-', "").eq_ignore_ascii_case(&wanted))
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| MacError::unsupported(format!("unknown digest: {s}")))
    }
}

/// The HMAC family accepted as PBKDF2 PRF and as PBMAC1 verification scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HmacAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

impl HmacAlgorithm {
    pub const ALL: [HmacAlgorithm; 7] = [
        HmacAlgorithm::Sha1,
        HmacAlgorithm::Sha224,
        HmacAlgorithm::Sha256,
        HmacAlgorithm::Sha384,
        HmacAlgorithm::Sha512,
        HmacAlgorithm::Sha512_224,
        HmacAlgorithm::Sha512_256,
    ];

    /// Standard name, e.g. `HmacSHA256`.
    pub fn name(self) -> &'static str {
        match self {
            HmacAlgorithm::Sha1 => "HmacSHA1",
            HmacAlgorithm::Sha224 => "HmacSHA224",
            HmacAlgorithm::Sha256 => "HmacSHA256",
            HmacAlgorithm::Sha384 => "HmacSHA384",
            HmacAlgorithm::Sha512 => "HmacSHA512",
            HmacAlgorithm::Sha512_224 => "HmacSHA512/224",
            HmacAlgorithm::Sha512_256 => "HmacSHA512/256",
        }
    }

    pub fn oid(self) -> ObjectIdentifier {
        match self {
            HmacAlgorithm::Sha1 => oid::HMAC_SHA1,
            HmacAlgorithm::Sha224 => oid::HMAC_SHA224,
            HmacAlgorithm::Sha256 => oid::HMAC_SHA256,
            HmacAlgorithm::Sha384 => oid::HMAC_SHA384,
            HmacAlgorithm::Sha512 => oid::HMAC_SHA512,
            HmacAlgorithm::Sha512_224 => oid::HMAC_SHA512_224,
            HmacAlgorithm::Sha512_256 => oid::HMAC_SHA512_256,
        }
    }

    /// The underlying hash.
    pub fn digest(self) -> DigestAlgorithm {
        match self {
            HmacAlgorithm::Sha1 => DigestAlgorithm::Sha1,
            HmacAlgorithm::Sha224 => DigestAlgorithm::Sha224,
            HmacAlgorithm::Sha256 => DigestAlgorithm::Sha256,
            HmacAlgorithm::Sha384 => DigestAlgorithm::Sha384,
            HmacAlgorithm::Sha512 => DigestAlgorithm::Sha512,
            HmacAlgorithm::Sha512_224 => DigestAlgorithm::Sha512_224,
            HmacAlgorithm::Sha512_256 => DigestAlgorithm::Sha512_256,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.oid() == *oid)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|h| h.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HmacAlgorithm {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| MacError::unsupported(format!("unknown HMAC: {s}")))
    }
}

/// A MAC algorithm selection as spelled in keystore settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacAlgorithm {
    /// `PBEWith<kdf>And<verify>`: PBKDF2 with `kdf` as PRF, then `verify`.
    Pbmac1 {
        kdf: HmacAlgorithm,
        verify: HmacAlgorithm,
    },
    /// `HmacPBE<digest>`: PKCS#12 key derivation, then HMAC with `digest`.
    Legacy(DigestAlgorithm),
}

impl MacAlgorithm {
    /// Returns `true` if `spec` uses the `PBEWith…` composite spelling,
    /// whether or not its parts are known algorithms.
    pub fn is_composite(spec: &str) -> bool {
        spec.get(..COMPOSITE_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(COMPOSITE_PREFIX))
    }

    /// Splits `PBEWith<kdf>And<verify>` into its two HMAC names. A missing
    /// `And<verify>` part means the verification HMAC equals the KDF one.
    fn parse_composite(spec: &str) -> Result<(HmacAlgorithm, HmacAlgorithm)> {
        let rest = &spec[COMPOSITE_PREFIX.len()..];
        let lower = rest.to_ascii_lowercase();
        let (kdf, verify) = match lower.find(&COMPOSITE_SEPARATOR.to_ascii_lowercase()) {
            Some(at) => (&rest[..at], &rest[at + COMPOSITE_SEPARATOR.len()..]),
            None => (rest, rest),
        };
        Ok((kdf.parse()?, verify.parse()?))
    }

    pub fn kdf_hmac(&self) -> HmacAlgorithm {
        match self {
            MacAlgorithm::Pbmac1 { kdf, .. } => *kdf,
            MacAlgorithm::Legacy(digest) => digest.hmac(),
        }
    }

    pub fn verify_hmac(&self) -> HmacAlgorithm {
        match self {
            MacAlgorithm::Pbmac1 { verify, .. } => *verify,
            MacAlgorithm::Legacy(digest) => digest.hmac(),
        }
    }
}

impl fmt::Display for MacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacAlgorithm::Pbmac1 { kdf, verify } => {
                write!(f, "{COMPOSITE_PREFIX}{kdf}{COMPOSITE_SEPARATOR}{verify}")
            }
            MacAlgorithm::Legacy(digest) => {
                write!(f, "{LEGACY_PREFIX}{}", digest.name().replace('-', ""))
            }
        }
    }
}

impl FromStr for MacAlgorithm {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self> {
        if Self::is_composite(s) {
            let (kdf, verify) = Self::parse_composite(s)?;
            return Ok(MacAlgorithm::Pbmac1 { kdf, verify });
        }

        let digest = s
            .get(..LEGACY_PREFIX.len())
            .filter(|p| p.eq_ignore_ascii_case(LEGACY_PREFIX))
            .and_then(|_| DigestAlgorithm::from_name(&s[LEGACY_PREFIX.len()..]))
            .ok_or_else(|| MacError::unsupported(format!("unknown MAC algorithm: {s}")))?;
        Ok(MacAlgorithm::Legacy(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_name_parses_both_parts() {
        let alg: MacAlgorithm = "PBEWithHmacSHA256AndHmacSHA512".parse().unwrap();
        assert_eq!(
            alg,
            MacAlgorithm::Pbmac1 {
                kdf: HmacAlgorithm::Sha256,
                verify: HmacAlgorithm::Sha512
            }
        );
        assert_eq!(alg.to_string(), "PBEWithHmacSHA256AndHmacSHA512");
    }

    #[test]
    fn composite_without_verify_part_reuses_kdf() {
        let alg: MacAlgorithm = "PBEWithHmacSHA384".parse().unwrap();
        assert_eq!(alg.kdf_hmac(), HmacAlgorithm::Sha384);
        assert_eq!(alg.verify_hmac(), HmacAlgorithm::Sha384);
    }

    #[test]
    fn composite_with_truncated_sha512() {
        let alg: MacAlgorithm = "PBEWithHmacSHA512/224AndHmacSHA512/256".parse().unwrap();
        assert_eq!(alg.kdf_hmac(), HmacAlgorithm::Sha512_224);
        assert_eq!(alg.verify_hmac(), HmacAlgorithm::Sha512_256);
    }

    #[test]
    fn composite_is_case_insensitive() {
        let alg: MacAlgorithm = "pbewithhmacsha1andhmacsha256".parse().unwrap();
        assert_eq!(alg.kdf_hmac(), HmacAlgorithm::Sha1);
        assert_eq!(alg.verify_hmac(), HmacAlgorithm::Sha256);
    }

    #[test]
    fn unknown_composite_part_is_unsupported() {
        let err = "PBEWithHmacMD5AndHmacSHA256"
            .parse::<MacAlgorithm>()
            .unwrap_err();
        assert!(matches!(err, MacError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn legacy_names_round_trip() {
        for digest in DigestAlgorithm::ALL {
            let alg = MacAlgorithm::Legacy(digest);
            let parsed: MacAlgorithm = alg.to_string().parse().unwrap();
            assert_eq!(parsed, alg);
        }
        assert_eq!(
            MacAlgorithm::Legacy(DigestAlgorithm::Sha512_256).to_string(),
            "HmacPBESHA512/256"
        );
    }

    #[test]
    fn garbage_is_unsupported() {
        assert!(matches!(
            "HmacMD5".parse::<MacAlgorithm>(),
            Err(MacError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            "HmacPBEMD5".parse::<MacAlgorithm>(),
            Err(MacError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn digest_names_accept_hyphenless_spelling() {
        assert_eq!(DigestAlgorithm::from_name("SHA256"), Some(DigestAlgorithm::Sha256));
        assert_eq!(DigestAlgorithm::from_name("SHA-1"), Some(DigestAlgorithm::Sha1));
        assert_eq!(DigestAlgorithm::from_name("SHA"), Some(DigestAlgorithm::Sha1));
        assert_eq!(
            DigestAlgorithm::from_name("SHA512/224"),
            Some(DigestAlgorithm::Sha512_224)
        );
        assert_eq!(DigestAlgorithm::from_name("MD5"), None);
    }

    #[test]
    fn oids_resolve_back_to_variants() {
        for hmac in HmacAlgorithm::ALL {
            assert_eq!(HmacAlgorithm::from_oid(&hmac.oid()), Some(hmac));
            assert_eq!(hmac.digest().hmac(), hmac);
        }
        for digest in DigestAlgorithm::ALL {
            assert_eq!(DigestAlgorithm::from_oid(&digest.oid()), Some(digest));
        }
        assert_eq!(HmacAlgorithm::from_oid(&oid::PBKDF2), None);
    }
}
