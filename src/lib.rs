//! Integrity MAC for password-protected keystores.
//!
//! A PKCS#12 keystore ends with a `MacData` record authenticating its whole
//! content. Two shapes exist:
//!
//! - legacy (`HmacPBE<digest>`): PKCS#12 key derivation and an HMAC with the
//!   same digest; salt and iteration count sit next to the digest
//! - PBMAC1 (`PBEWith<kdf>And<verify>`): PBKDF2 key derivation and an
//!   independent verification HMAC, all carried in the algorithm parameters
//!
//! ```no_run
//! use keystore_mac::{MacData, compute_mac, verify_mac};
//!
//! let payload = b"authenticated safe";
//! let encoded = compute_mac(
//!     "changeit",
//!     payload,
//!     true,
//!     "PBEWithHmacSHA256AndHmacSHA256",
//!     10_000,
//!     &[0u8; 16],
//! )?;
//!
//! let record = MacData::from_der(&encoded)?;
//! verify_mac(&record, "changeit", payload)?;
//! # Ok::<(), keystore_mac::MacError>(())
//! ```

pub mod algorithm;
pub mod config;
pub mod crypto;
mod error;
pub mod format;
pub mod mac;
pub mod oid;

pub use crate::algorithm::{DigestAlgorithm, HmacAlgorithm, MacAlgorithm, PBMAC1_LABEL};
pub use crate::config::MacSettings;
pub use crate::error::{MacError, Result};
pub use crate::format::mac_data::{MacData, MacScheme, PbeParams};
pub use crate::format::pbmac1::Pbmac1Params;
pub use crate::mac::{
    compute_mac, compute_mac_with, compute_mac_with_settings, verify_mac, verify_mac_with,
};
