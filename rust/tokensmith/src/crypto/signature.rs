use crate::error::{JwtError, Result};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

// See: https://www.rfc-editor.org/rfc/rfc7518
#[derive(Debug, Display, EnumString, Clone, Copy, Eq, PartialEq, Hash)]
pub enum JwtSignatureAlgorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    ES256,
    ES384,
    ES512,
    #[strum(serialize = "none")]
    Unsigned,
}

impl JwtSignatureAlgorithm {
    /// Parse an `alg` header value; `none` is accepted in any letter case
    pub fn parse(name: &str) -> Result<Self> {
        if name.eq_ignore_ascii_case("none") {
            return Ok(JwtSignatureAlgorithm::Unsigned);
        }
        JwtSignatureAlgorithm::from_str(name)
            .map_err(|_| JwtError::UnsupportedAlgorithm(name.to_owned()))
    }

    /// The hash function the algorithm signs over, if it signs at all
    pub fn hash(&self) -> Option<HashFunction> {
        match self {
            JwtSignatureAlgorithm::HS256
            | JwtSignatureAlgorithm::RS256
            | JwtSignatureAlgorithm::ES256 => Some(HashFunction::Sha256),
            JwtSignatureAlgorithm::HS384 | JwtSignatureAlgorithm::ES384 => {
                Some(HashFunction::Sha384)
            }
            JwtSignatureAlgorithm::HS512 | JwtSignatureAlgorithm::ES512 => {
                Some(HashFunction::Sha512)
            }
            JwtSignatureAlgorithm::Unsigned => None,
        }
    }

    pub fn is_hmac(&self) -> bool {
        matches!(
            self,
            JwtSignatureAlgorithm::HS256
                | JwtSignatureAlgorithm::HS384
                | JwtSignatureAlgorithm::HS512
        )
    }
}

#[derive(Debug, Display, Clone, Copy, Eq, PartialEq, Hash)]
pub enum HashFunction {
    #[strum(serialize = "SHA-256")]
    Sha256,
    #[strum(serialize = "SHA-384")]
    Sha384,
    #[strum(serialize = "SHA-512")]
    Sha512,
}

impl HashFunction {
    /// Digest length in bytes
    pub fn size(&self) -> usize {
        match self {
            HashFunction::Sha256 => 32,
            HashFunction::Sha384 => 48,
            HashFunction::Sha512 => 64,
        }
    }
}
