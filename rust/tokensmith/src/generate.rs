//! Fresh key material, with the defaults passed around explicitly rather
//! than read from shared state

use crate::{
    crypto::Key,
    error::Result,
    key_material::ecdsa::{EcCurve, EcdsaKeyMaterial},
    nonce::random_bytes,
};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;

pub const DEFAULT_RSA_BITS: usize = 2048;

/// A random `HS256` secret of `length` bytes
pub fn hmac_secret(length: usize) -> Result<Key> {
    Ok(Key::secret(random_bytes(length)?))
}

/// A new RSA private key of the given modulus size
pub fn rsa_key(bits: usize) -> Result<Key> {
    Ok(RsaPrivateKey::new(&mut OsRng, bits)?.into())
}

/// A new ECDSA private key on the given curve
pub fn ecdsa_key(curve: EcCurve) -> Key {
    EcdsaKeyMaterial::generate(curve).into()
}

/// The parameters asymmetric keys are generated with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyGeneration {
    pub rsa_bits: usize,
    pub curve: EcCurve,
}

impl Default for KeyGeneration {
    fn default() -> Self {
        KeyGeneration {
            rsa_bits: DEFAULT_RSA_BITS,
            curve: EcCurve::P256,
        }
    }
}

impl KeyGeneration {
    pub fn with_rsa_bits(mut self, bits: usize) -> Self {
        self.rsa_bits = bits;
        self
    }

    pub fn with_curve(mut self, curve: EcCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn rsa(&self) -> Result<Key> {
        rsa_key(self.rsa_bits)
    }

    pub fn ecdsa(&self) -> Key {
        ecdsa_key(self.curve)
    }
}
