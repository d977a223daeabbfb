use crate::{
    crypto::{JwtSignatureAlgorithm, Key, KeyMaterial, KeyProvider},
    error::{JwtError, Result},
    header::JwtHeader,
    serde::{base64url_decode, base64url_encode},
};
use serde::Serialize;

/// The three encoded segments of a token, borrowed from the token string
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenParts<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
    signed_data: &'a str,
}

impl<'a> TokenParts<'a> {
    /// The exact `header.payload` bytes that the signature covers
    pub fn signed_data(&self) -> &'a [u8] {
        self.signed_data.as_bytes()
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    pub fn decode_header(&self) -> Result<JwtHeader> {
        JwtHeader::decode(self.header.as_bytes())
    }

    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        base64url_decode(self.payload)
    }

    pub fn decode_signature(&self) -> Result<Vec<u8>> {
        base64url_decode(self.signature)
    }
}

/// Split a token into its segments. Anything other than exactly three
/// `.`-separated parts is rejected.
pub fn split(token: &str) -> Result<TokenParts<'_>> {
    let mut parts = token.split('.');

    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(JwtError::InvalidTokenStructure);
    };

    Ok(TokenParts {
        header,
        payload,
        signature,
        signed_data: &token[..header.len() + 1 + payload.len()],
    })
}

/// Produce a token carrying `claims`. Without a key the token is unsigned:
/// its algorithm is `none`, it has no `kid`, and its signature segment is
/// empty.
pub fn encode<C>(claims: &C, key: Option<&Key>, key_id: Option<&str>) -> Result<String>
where
    C: Serialize + ?Sized,
{
    let payload = serde_json::to_vec(claims)?;

    let header = match key {
        Some(key) => {
            if key.is_empty() {
                return Err(JwtError::EmptySignKey);
            }
            JwtHeader::new(key.jwt_algorithm(), key_id)
        }
        None => JwtHeader::new(JwtSignatureAlgorithm::Unsigned, None),
    };

    let mut token = format!("{}.{}", header.encode()?, base64url_encode(payload));

    let signature = match key {
        Some(key) => base64url_encode(key.sign(token.as_bytes())?),
        None => String::new(),
    };

    token.push('.');
    token.push_str(&signature);

    Ok(token)
}

/// Produce a token, taking the signing key (and its identifier) from a
/// [KeyProvider]. Provider functions are called exactly once.
pub fn encode_with<C>(claims: &C, provider: &KeyProvider) -> Result<String>
where
    C: Serialize + ?Sized,
{
    let (key_id, key) = provider.resolve();
    encode(claims, key.as_deref(), key_id.as_deref())
}
