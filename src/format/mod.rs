//! DER wire formats of the keystore MAC.
//!
//! The shared helpers in this module are thin wrappers over the `der` crate
//! that map every failure into [`MacError`]. The structures themselves live in
//! the submodules:
//!
//! - [`mac_data`] - the outer `MacData` record (legacy and PBMAC1 shapes)
//! - [`pbmac1`] - PBMAC1 parameters
//! - [`kdf_params`] - PBKDF2 parameters nested inside PBMAC1

use der::asn1::{Null, ObjectIdentifier, OctetString};
use der::{Any, Decode, Encode, Reader, SliceReader, Tag, Tagged};

use crate::error::{MacError, Result};

pub mod kdf_params;
pub mod mac_data;
pub mod pbmac1;

/// Decodes `bytes` as one SEQUENCE and returns its elements.
pub(crate) fn parse_sequence(bytes: &[u8]) -> Result<Vec<Any>> {
    let any = Any::from_der(bytes)?;
    sequence_items(&any)
}

/// Returns the elements of a SEQUENCE value.
pub(crate) fn sequence_items(any: &Any) -> Result<Vec<Any>> {
    expect_tag(any, Tag::Sequence)?;

    let mut reader = SliceReader::new(any.value())?;
    let mut items = Vec::new();
    while !reader.is_finished() {
        items.push(Any::decode(&mut reader)?);
    }
    Ok(items)
}

pub(crate) fn expect_tag(any: &Any, tag: Tag) -> Result<()> {
    if any.tag() != tag {
        return Err(MacError::format(format!(
            "expected {tag}, found {}",
            any.tag()
        )));
    }
    Ok(())
}

/// Content octets of an OCTET STRING.
pub(crate) fn octets(any: &Any) -> Result<Vec<u8>> {
    expect_tag(any, Tag::OctetString)?;
    Ok(any.value().to_vec())
}

/// A non-negative INTEGER that fits in 32 bits.
pub(crate) fn integer(any: &Any) -> Result<u32> {
    expect_tag(any, Tag::Integer)?;
    Ok(u32::from_der(&any.to_der()?)?)
}

/// Splits an AlgorithmIdentifier into its OID and optional parameters.
/// An explicit NULL parameter is reported as absent.
pub(crate) fn algorithm_identifier(any: &Any) -> Result<(ObjectIdentifier, Option<Any>)> {
    let mut items = sequence_items(any)?.into_iter();

    let oid = match items.next() {
        Some(first) => {
            expect_tag(&first, Tag::ObjectIdentifier)?;
            ObjectIdentifier::from_der(&first.to_der()?)?
        }
        None => return Err(MacError::format("empty AlgorithmIdentifier")),
    };
    let params = items.next().filter(|p| p.tag() != Tag::Null);

    if items.next().is_some() {
        return Err(MacError::format("Invalid length for AlgorithmIdentifier"));
    }
    Ok((oid, params))
}

pub(crate) fn write_sequence(parts: &[Vec<u8>]) -> Result<Vec<u8>> {
    Ok(Any::new(Tag::Sequence, parts.concat())?.to_der()?)
}

pub(crate) fn write_octets(bytes: &[u8]) -> Result<Vec<u8>> {
    Ok(OctetString::new(bytes.to_vec())?.to_der()?)
}

pub(crate) fn write_integer(value: u32) -> Result<Vec<u8>> {
    Ok(value.to_der()?)
}

/// Writes `SEQUENCE { oid, params }`, using NULL when `params` is `None`.
pub(crate) fn write_algorithm_identifier(
    oid: ObjectIdentifier,
    params: Option<Vec<u8>>,
) -> Result<Vec<u8>> {
    let params = match params {
        Some(params) => params,
        None => Null.to_der()?,
    };
    write_sequence(&[oid.to_der()?, params])
}
