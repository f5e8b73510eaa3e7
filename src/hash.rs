use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CrackError;

/// A parsed MD5 digest.
///
/// Input hashes arrive as 32-character hex strings and are normalised to
/// lowercase on ingest. Internally the digest is the 16 raw bytes, so the
/// enumeration hot loop compares bytes instead of formatting hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Md5Digest([u8; 16]);

impl Md5Digest {
    /// Hash a candidate password.
    pub fn of(candidate: &str) -> Self {
        let digest = Md5::digest(candidate.as_bytes());
        Self(digest.into())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl FromStr for Md5Digest {
    type Err = CrackError;

    /// Parse a 32-character hex string, accepting either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        if normalised.len() != 32 {
            return Err(CrackError::InvalidHash(s.to_string()));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(&normalised, &mut bytes)
            .map_err(|_| CrackError::InvalidHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for Md5Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Md5Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
