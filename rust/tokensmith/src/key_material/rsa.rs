use crate::{
    crypto::{JwtSignatureAlgorithm, KeyMaterial},
    error::{JwtError, Result},
};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// An RSA public key and, when this side signs, its private counterpart.
/// Every RSA key signs with `RS256`, whatever its size.
#[derive(Clone)]
pub struct RsaKeyMaterial(pub RsaPublicKey, pub Option<RsaPrivateKey>);

impl KeyMaterial for RsaKeyMaterial {
    fn jwt_algorithm(&self) -> JwtSignatureAlgorithm {
        JwtSignatureAlgorithm::RS256
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let hashed = Sha256::digest(payload);

        match &self.1 {
            Some(private_key) => {
                let padding = Pkcs1v15Sign::new::<Sha256>();
                Ok(private_key.sign(padding, hashed.as_ref())?)
            }
            None => Err(JwtError::UnsupportedKeyType(
                "RSA public key cannot sign".into(),
            )),
        }
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()> {
        let hashed = Sha256::digest(payload);
        let padding = Pkcs1v15Sign::new::<Sha256>();

        self.0
            .verify(padding, hashed.as_ref(), signature)
            .map_err(|_| JwtError::BadSignature)
    }
}
