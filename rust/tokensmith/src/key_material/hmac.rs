use crate::{
    crypto::{HashFunction, JwtSignatureAlgorithm, KeyMaterial},
    error::{JwtError, Result},
};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

/// A shared secret, bound to one of the `HS*` algorithms
#[derive(Clone)]
pub struct HmacKeyMaterial {
    algorithm: JwtSignatureAlgorithm,
    secret: Vec<u8>,
}

impl HmacKeyMaterial {
    /// A secret that signs with `HS256`
    pub fn new<T: AsRef<[u8]>>(secret: T) -> Self {
        HmacKeyMaterial::bind(JwtSignatureAlgorithm::HS256, secret)
    }

    /// A secret bound to a specific HMAC algorithm
    pub fn with_algorithm<T: AsRef<[u8]>>(
        algorithm: JwtSignatureAlgorithm,
        secret: T,
    ) -> Result<Self> {
        if !algorithm.is_hmac() {
            return Err(JwtError::HashUnavailable(algorithm.to_string()));
        }
        Ok(HmacKeyMaterial::bind(algorithm, secret))
    }

    /// Callers must pass one of the `HS*` algorithms
    pub(crate) fn bind<T: AsRef<[u8]>>(algorithm: JwtSignatureAlgorithm, secret: T) -> Self {
        HmacKeyMaterial {
            algorithm,
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    fn mac(&self, payload: &[u8]) -> Result<Vec<u8>> {
        match self.algorithm.hash() {
            Some(HashFunction::Sha256) => mac::<Hmac<Sha256>>(&self.secret, payload),
            Some(HashFunction::Sha384) => mac::<Hmac<Sha384>>(&self.secret, payload),
            Some(HashFunction::Sha512) => mac::<Hmac<Sha512>>(&self.secret, payload),
            None => Err(JwtError::HashUnavailable(self.algorithm.to_string())),
        }
    }
}

fn mac<M: Mac + hmac::digest::KeyInit>(secret: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|error| JwtError::InvalidKey(error.to_string()))?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

impl PartialEq for HmacKeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && bool::from(self.secret.ct_eq(&other.secret))
    }
}

impl KeyMaterial for HmacKeyMaterial {
    fn jwt_algorithm(&self) -> JwtSignatureAlgorithm {
        self.algorithm
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.mac(payload)
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()> {
        let expected = self.mac(payload)?;
        if bool::from(expected.ct_eq(signature)) {
            Ok(())
        } else {
            Err(JwtError::BadSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HmacKeyMaterial;
    use crate::{
        crypto::{JwtSignatureAlgorithm, KeyMaterial},
        error::JwtError,
    };

    #[test]
    fn it_produces_the_known_hs256_mac() {
        let key = HmacKeyMaterial::new("TOPSECRET");
        let mac = key.sign(b"test").unwrap();

        let hex: String = mac.iter().map(|byte| format!("{byte:02x}")).collect();
        assert_eq!(
            hex,
            "a3174174280008f8fcf2aa9aef674e26c8d66e2746ada2b8428279c090594fd9"
        );
    }

    #[test]
    fn it_sizes_macs_by_algorithm() {
        for (algorithm, size) in [
            (JwtSignatureAlgorithm::HS256, 32),
            (JwtSignatureAlgorithm::HS384, 48),
            (JwtSignatureAlgorithm::HS512, 64),
        ] {
            let key = HmacKeyMaterial::with_algorithm(algorithm, "secret").unwrap();
            let mac = key.sign(b"payload").unwrap();

            assert_eq!(mac.len(), size);
            assert_eq!(key.jwt_algorithm(), algorithm);
            key.verify(b"payload", &mac).unwrap();
        }
    }

    #[test]
    fn it_rejects_a_wrong_mac() {
        let key = HmacKeyMaterial::new("secret");
        let mut mac = key.sign(b"payload").unwrap();
        mac[0] ^= 1;

        assert!(matches!(
            key.verify(b"payload", &mac),
            Err(JwtError::BadSignature)
        ));
        assert!(matches!(
            key.verify(b"payload", &mac[..8]),
            Err(JwtError::BadSignature)
        ));
    }

    #[test]
    fn it_refuses_to_bind_a_non_hmac_algorithm() {
        assert!(matches!(
            HmacKeyMaterial::with_algorithm(JwtSignatureAlgorithm::RS256, "secret"),
            Err(JwtError::HashUnavailable(name)) if name == "RS256"
        ));
    }
}
