use super::JwtSignatureAlgorithm;
use crate::error::Result;
use std::sync::Arc;

/// This trait must be implemented by a struct that encapsulates cryptographic
/// key data. The trait represents the minimum required API capability for
/// producing a signed token from a key, and verifying such signatures.
pub trait KeyMaterial: Send + Sync {
    /// The algorithm that will be used to produce the signature returned by the
    /// sign method in this implementation
    fn jwt_algorithm(&self) -> JwtSignatureAlgorithm;

    /// Sign some data with this key
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Verify the alleged signature of some data against this key
    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()>;
}

impl<K> KeyMaterial for Arc<K>
where
    K: KeyMaterial,
{
    fn jwt_algorithm(&self) -> JwtSignatureAlgorithm {
        (**self).jwt_algorithm()
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(payload)
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()> {
        (**self).verify(payload, signature)
    }
}
