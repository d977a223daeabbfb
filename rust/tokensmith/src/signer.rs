use crate::{
    crypto::{JwtSignatureAlgorithm, KeyMaterial},
    error::{JwtError, Result},
    header::JwtHeader,
    key_material::hmac::HmacKeyMaterial,
    serde::{base64url_decode, base64url_encode},
};
use std::fmt::{self, Debug};

/// A shared secret pre-bound to one HMAC algorithm, along with the encoded
/// header that every token it produces starts with.
#[derive(Clone)]
pub struct Signer {
    key: HmacKeyMaterial,
    header: String,
}

impl Signer {
    fn bind<T: AsRef<[u8]>>(algorithm: JwtSignatureAlgorithm, secret: T) -> Result<Self> {
        Ok(Signer {
            key: HmacKeyMaterial::bind(algorithm, secret),
            header: JwtHeader::new(algorithm, None).encode()?,
        })
    }

    pub fn hs256<T: AsRef<[u8]>>(secret: T) -> Result<Self> {
        Signer::bind(JwtSignatureAlgorithm::HS256, secret)
    }

    pub fn hs384<T: AsRef<[u8]>>(secret: T) -> Result<Self> {
        Signer::bind(JwtSignatureAlgorithm::HS384, secret)
    }

    pub fn hs512<T: AsRef<[u8]>>(secret: T) -> Result<Self> {
        Signer::bind(JwtSignatureAlgorithm::HS512, secret)
    }

    /// A signer for any of the `HS*` algorithms
    pub fn new<T: AsRef<[u8]>>(algorithm: JwtSignatureAlgorithm, secret: T) -> Result<Self> {
        let key = HmacKeyMaterial::with_algorithm(algorithm, secret)?;
        Ok(Signer {
            header: JwtHeader::new(algorithm, None).encode()?,
            key,
        })
    }

    pub fn algorithm(&self) -> JwtSignatureAlgorithm {
        self.key.jwt_algorithm()
    }

    /// Wrap an already serialized payload into a signed token
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut token = format!("{}.{}", self.header, base64url_encode(payload));
        let signature = self.key.sign(token.as_bytes())?;

        token.push('.');
        token.push_str(&base64url_encode(signature));
        Ok(token.into_bytes())
    }

    /// Check a token produced by a signer with the same algorithm and secret,
    /// returning its decoded payload
    pub fn parse(&self, token: &[u8]) -> Result<Vec<u8>> {
        let mut parts = token.splitn(3, |byte| *byte == b'.');

        let (Some(header), Some(payload), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(JwtError::InvalidTokenStructure);
        };

        let decoded_header = JwtHeader::decode(header)?;
        decoded_header.check_type()?;

        let algorithm = self.algorithm().to_string();
        if decoded_header.alg != algorithm {
            return Err(JwtError::AlgorithmMismatch {
                expected: algorithm,
                found: decoded_header.alg,
            });
        }

        let signature = base64url_decode(signature)?;
        self.key
            .verify(&token[..header.len() + 1 + payload.len()], &signature)?;

        base64url_decode(payload)
    }
}

impl Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("alg", &self.algorithm())
            .finish()
    }
}
