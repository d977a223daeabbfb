//! Keys and the algorithms they sign with.
//!
//! A [Key] is a closed set of the key shapes this crate knows how to sign and
//! verify with: an HMAC secret, an RSA key, or an ECDSA key on P-256, P-384
//! or P-521. Asymmetric keys always carry their public part and optionally
//! their private part. Every key resolves to exactly one
//! [JwtSignatureAlgorithm]:
//!
//! | key                       | algorithm                  |
//! |---------------------------|----------------------------|
//! | secret bytes or text      | `HS256` (unless rebound)   |
//! | RSA, any size             | `RS256`                    |
//! | ECDSA P-256 / P-384 / P-521 | `ES256` / `ES384` / `ES512` |
//! | no key                    | `none`                     |

mod key;
mod provider;
mod signature;

pub use key::*;
pub use provider::*;
pub use signature::*;

use crate::{
    error::Result,
    key_material::{
        ecdsa::{EcCurve, EcdsaKeyMaterial},
        hmac::HmacKeyMaterial,
        rsa::RsaKeyMaterial,
    },
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt::{self, Debug, Display};

#[derive(Clone)]
pub enum Key {
    Hmac(HmacKeyMaterial),
    Rsa(RsaKeyMaterial),
    Ecdsa(EcdsaKeyMaterial),
}

impl Key {
    /// A symmetric `HS256` key
    pub fn secret<T: AsRef<[u8]>>(secret: T) -> Self {
        Key::Hmac(HmacKeyMaterial::new(secret))
    }

    /// A symmetric `HS256` key made of the textual form of any value
    pub fn from_display<T: Display + ?Sized>(value: &T) -> Self {
        Key::secret(value.to_string())
    }

    /// True when the key holds private (or symmetric) material and can sign
    pub fn is_private(&self) -> bool {
        match self {
            Key::Hmac(_) => true,
            Key::Rsa(key) => key.1.is_some(),
            Key::Ecdsa(key) => key.is_private(),
        }
    }

    /// True for a symmetric key without any secret bytes
    pub fn is_empty(&self) -> bool {
        match self {
            Key::Hmac(key) => key.secret().is_empty(),
            _ => false,
        }
    }

    /// The key with any private part stripped away. Symmetric keys have no
    /// public part and are returned as they are.
    pub fn to_public(&self) -> Key {
        match self {
            Key::Hmac(key) => Key::Hmac(key.clone()),
            Key::Rsa(key) => Key::Rsa(RsaKeyMaterial(key.0.clone(), None)),
            Key::Ecdsa(key) => Key::Ecdsa(key.to_public()),
        }
    }

    /// The curve of an ECDSA key
    pub fn curve(&self) -> Option<EcCurve> {
        match self {
            Key::Ecdsa(key) => Some(key.curve()),
            _ => None,
        }
    }

    /// Compare only the public components of two keys. Symmetric keys compare
    /// their secrets.
    pub fn public_eq(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Hmac(a), Key::Hmac(b)) => a == b,
            (Key::Rsa(a), Key::Rsa(b)) => a.0 == b.0,
            (Key::Ecdsa(a), Key::Ecdsa(b)) => a.public_eq(b),
            _ => false,
        }
    }
}

impl KeyMaterial for Key {
    fn jwt_algorithm(&self) -> JwtSignatureAlgorithm {
        match self {
            Key::Hmac(key) => key.jwt_algorithm(),
            Key::Rsa(key) => key.jwt_algorithm(),
            Key::Ecdsa(key) => key.jwt_algorithm(),
        }
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        match self {
            Key::Hmac(key) => key.sign(payload),
            Key::Rsa(key) => key.sign(payload),
            Key::Ecdsa(key) => key.sign(payload),
        }
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()> {
        match self {
            Key::Hmac(key) => key.verify(payload, signature),
            Key::Rsa(key) => key.verify(payload, signature),
            Key::Ecdsa(key) => key.verify(payload, signature),
        }
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("alg", &self.jwt_algorithm())
            .field("private", &self.is_private())
            .finish()
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::secret(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::secret(value)
    }
}

impl From<&[u8]> for Key {
    fn from(value: &[u8]) -> Self {
        Key::secret(value)
    }
}

impl From<Vec<u8>> for Key {
    fn from(value: Vec<u8>) -> Self {
        Key::secret(value)
    }
}

impl From<HmacKeyMaterial> for Key {
    fn from(value: HmacKeyMaterial) -> Self {
        Key::Hmac(value)
    }
}

impl From<RsaPrivateKey> for Key {
    fn from(value: RsaPrivateKey) -> Self {
        Key::Rsa(RsaKeyMaterial(RsaPublicKey::from(&value), Some(value)))
    }
}

impl From<RsaPublicKey> for Key {
    fn from(value: RsaPublicKey) -> Self {
        Key::Rsa(RsaKeyMaterial(value, None))
    }
}

impl From<EcdsaKeyMaterial> for Key {
    fn from(value: EcdsaKeyMaterial) -> Self {
        Key::Ecdsa(value)
    }
}

macro_rules! impl_from_ecdsa_key {
    ($($key:ty),*) => {
        $(
            impl From<$key> for Key {
                fn from(value: $key) -> Self {
                    Key::Ecdsa(EcdsaKeyMaterial::from(value))
                }
            }
        )*
    };
}

impl_from_ecdsa_key!(
    p256::ecdsa::SigningKey,
    p256::ecdsa::VerifyingKey,
    p384::ecdsa::SigningKey,
    p384::ecdsa::VerifyingKey,
    p521::ecdsa::SigningKey,
    p521::ecdsa::VerifyingKey
);
