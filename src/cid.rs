//! Content identifier (CID) shape checks.
//!
//! Only the textual shape is checked: a CIDv0 is `Qm` followed by 44 base58btc
//! characters, a CIDv1 is the multibase prefix `b` followed by 58 base32
//! characters. Nothing is decoded.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const V0_PREFIX: &str = "Qm";
const V0_BODY_LEN: usize = 44;
const V1_PREFIX: &str = "b";
const V1_BODY_LEN: usize = 58;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CidVersion {
    V0,
    V1,
}

impl fmt::Display for CidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CidVersion::V0 => write!(f, "CIDv0"),
            CidVersion::V1 => write!(f, "CIDv1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid IPFS hash: {0:?}")]
pub struct InvalidCid(pub String);

/// A string known to have the shape of a CIDv0 or base32 CIDv1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cid {
    value: String,
    version: CidVersion,
}

impl Cid {
    pub fn parse(value: &str) -> Result<Self, InvalidCid> {
        match cid_version(value) {
            Some(version) => Ok(Self {
                value: value.to_string(),
                version,
            }),
            None => Err(InvalidCid(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn version(&self) -> CidVersion {
        self.version
    }
}

impl FromStr for Cid {
    type Err = InvalidCid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cid::parse(s)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for Cid {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Returns true when `value` is a CIDv0 or base32 CIDv1 string.
pub fn is_valid_cid(value: &str) -> bool {
    cid_version(value).is_some()
}

fn cid_version(value: &str) -> Option<CidVersion> {
    if let Some(body) = value.strip_prefix(V0_PREFIX) {
        if body.len() == V0_BODY_LEN && body.bytes().all(is_base58) {
            return Some(CidVersion::V0);
        }
    }
    if let Some(body) = value.strip_prefix(V1_PREFIX) {
        if body.len() == V1_BODY_LEN && body.bytes().all(is_base32) {
            return Some(CidVersion::V1);
        }
    }
    None
}

/// Bitcoin base58 alphabet: alphanumerics minus `0`, `O`, `I` and `l`.
fn is_base58(b: u8) -> bool {
    matches!(b, b'1'..=b'9' | b'A'..=b'H' | b'J'..=b'N' | b'P'..=b'Z' | b'a'..=b'k' | b'm'..=b'z')
}

/// RFC 4648 base32 digits, accepted in either case.
fn is_base32(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'2'..=b'7')
}
