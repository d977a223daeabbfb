use crate::{
    crypto::JwtSignatureAlgorithm,
    error::{JwtError, Result},
    serde::{base64url_decode, Base64Encode},
};
use serde::{Deserialize, Serialize};

/// The fixed value of the `typ` header field
pub const TOKEN_TYPE: &str = "JWT";

/// The header segment of a token: which algorithm produced the signature and,
/// optionally, which key did.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct JwtHeader {
    pub alg: String,
    #[serde(default)]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JwtHeader {
    pub fn new(algorithm: JwtSignatureAlgorithm, key_id: Option<&str>) -> Self {
        JwtHeader {
            alg: algorithm.to_string(),
            typ: TOKEN_TYPE.into(),
            kid: key_id.map(String::from),
        }
    }

    /// The base64url encoding of the header JSON, as it appears in a token
    pub fn encode(&self) -> Result<String> {
        self.jwt_base64_encode()
    }

    /// Parse a header from its base64url-encoded token segment
    pub fn decode(segment: &[u8]) -> Result<Self> {
        let json = base64url_decode(segment)?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Reject headers whose `typ` is set to anything other than `JWT`
    pub fn check_type(&self) -> Result<()> {
        if !self.typ.is_empty() && self.typ != TOKEN_TYPE {
            return Err(JwtError::BadTokenType(self.typ.clone()));
        }
        Ok(())
    }

    pub fn algorithm(&self) -> Result<JwtSignatureAlgorithm> {
        JwtSignatureAlgorithm::parse(&self.alg)
    }

    pub fn key_id(&self) -> &str {
        self.kid.as_deref().unwrap_or_default()
    }
}
